use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tower_lsp::{LspService, Server};
use tracing::info;

use crate::config::LinterOptions;
use crate::lsp::backend::Backend;

/// Serves a single LSP session over the given streams until the client exits
async fn serve<I, O>(input: I, output: O, options: &LinterOptions)
where
    I: AsyncRead + Unpin,
    O: AsyncWrite,
{
    let (service, socket) = LspService::new(|client| Backend::new(client, options));
    Server::new(input, output, socket).serve(service).await;
}

pub async fn run_server(options: LinterOptions) -> anyhow::Result<()> {
    info!("Starting sqlfluff-lsp server on stdio");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    serve(stdin, stdout, &options).await;

    info!("sqlfluff-lsp server stopped");
    Ok(())
}

/// Accepts one TCP connection and serves it
pub async fn run_tcp_server(addr: SocketAddr, options: LinterOptions) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("sqlfluff-lsp server listening on {}", listener.local_addr()?);

    let (stream, peer) = listener.accept().await?;
    info!("Accepted connection from {}", peer);

    let (read, write) = tokio::io::split(stream);
    serve(read, write, &options).await;

    info!("sqlfluff-lsp server stopped");
    Ok(())
}
