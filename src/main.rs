use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use sqlfluff_lsp::config::{DEFAULT_HOST, DEFAULT_PORT, LinterOptions};
use sqlfluff_lsp::linter::sqlfluff::{DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT};
use sqlfluff_lsp::log;
use sqlfluff_lsp::lsp::server::{run_server, run_tcp_server};

#[derive(Debug, Parser)]
#[command(name = "sqlfluff-lsp", version, about = "Language server for the sqlfluff SQL linter")]
struct Cli {
    /// Use TCP server instead of stdio
    #[arg(long)]
    tcp: bool,

    /// Bind to this address
    #[arg(long, default_value = DEFAULT_HOST)]
    host: IpAddr,

    /// Bind to this port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Redirect logs to the given file instead of writing to stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase verbosity of log output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the sqlfluff executable
    #[arg(long, default_value = DEFAULT_EXECUTABLE)]
    sqlfluff_path: PathBuf,

    /// Seconds a single lint or fix run may take
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = log::init(cli.log_file.as_deref(), cli.verbose)?;

    let options = LinterOptions {
        executable: cli.sqlfluff_path,
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    if cli.tcp {
        run_tcp_server((cli.host, cli.port).into(), options).await
    } else {
        run_server(options).await
    }
}
