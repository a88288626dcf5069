//! sqlfluff command line implementation of the linter

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use semver::Version;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::linter::error::LinterError;
use crate::linter::traits::Linter;
use crate::linter::types::{FixResult, LintResult, LinterConfig};

/// Default executable name, resolved through PATH
pub const DEFAULT_EXECUTABLE: &str = "sqlfluff";

/// Default upper bound for a single linter invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Oldest sqlfluff release whose JSON output and stdin handling we rely on
const MINIMUM_VERSION: Version = Version::new(1, 0, 0);

/// Project configuration files sqlfluff reads from a directory
const CONFIG_FILE_NAMES: [&str; 5] = [
    "setup.cfg",
    "tox.ini",
    "pep8.ini",
    ".sqlfluff",
    "pyproject.toml",
];

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"version\s+(\d+\.\d+\.\d+\S*)").expect("version pattern is valid")
});

/// Linter implementation driving the `sqlfluff` executable
pub struct SqlfluffCli {
    executable: PathBuf,
    timeout: Duration,
}

impl SqlfluffCli {
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    /// Runs sqlfluff with `args` in `cwd`, feeding `stdin` to the process
    async fn run(&self, args: &[&str], cwd: &Path, stdin: &str) -> Result<Output, LinterError> {
        debug!("Running {:?} {:?} in {:?}", self.executable, args, cwd);

        let mut child = Command::new(&self.executable)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| LinterError::Failed {
                status: "spawn".to_string(),
                stderr: "stdin was not captured".to_string(),
            })?;
        let input = stdin.to_string();

        let write = async move {
            // sqlfluff exits on config errors without reading its input;
            // the exit status and stderr then describe the failure
            if let Err(e) = child_stdin.write_all(input.as_bytes()).await
                && e.kind() != ErrorKind::BrokenPipe
            {
                return Err(e);
            }
            // Closing stdin signals end of input
            drop(child_stdin);
            Ok::<(), std::io::Error>(())
        };

        let run = futures::future::try_join(write, child.wait_with_output());

        match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => Ok(result?.1),
            Err(_) => {
                warn!("sqlfluff timed out after {:?}", self.timeout);
                Err(LinterError::Timeout(self.timeout))
            }
        }
    }

    async fn version(&self, cwd: &Path) -> Result<Version, LinterError> {
        let output = self.run(&["--version"], cwd, "").await?;
        if !output.status.success() {
            return Err(failure(&output));
        }
        parse_version(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for SqlfluffCli {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Linter for SqlfluffCli {
    async fn resolve_config(&self, root: &Path) -> Result<LinterConfig, LinterError> {
        if !root.is_dir() {
            return Err(LinterError::ConfigResolution(format!(
                "project root {} is not a directory",
                root.display()
            )));
        }

        let version = self
            .version(root)
            .await
            .map_err(|e| LinterError::ConfigResolution(e.to_string()))?;

        if version < MINIMUM_VERSION {
            return Err(LinterError::ConfigResolution(format!(
                "sqlfluff {} is too old, {} or newer is required",
                version, MINIMUM_VERSION
            )));
        }

        let config_files = discover_config_files(root);
        info!(
            "Resolved sqlfluff {} config at {:?} ({} config files)",
            version,
            root,
            config_files.len()
        );

        Ok(LinterConfig {
            root: root.to_path_buf(),
            config_files,
            version,
        })
    }

    async fn lint(&self, source: &str, config: &LinterConfig) -> Result<LintResult, LinterError> {
        let output = self
            .run(&["lint", "--format", "json", "--nofail", "-"], &config.root, source)
            .await?;

        if !output.status.success() {
            return Err(failure(&output));
        }

        LintResult::from_json(&String::from_utf8_lossy(&output.stdout))
    }

    async fn fix(&self, source: &str, config: &LinterConfig) -> Result<FixResult, LinterError> {
        let output = self.run(&["fix", "-"], &config.root, source).await?;

        // Exit code 1 means the output is fixed but unfixable violations remain
        let success = match output.status.code() {
            Some(0) => true,
            Some(1) => false,
            _ => return Err(failure(&output)),
        };

        let fixed = String::from_utf8(output.stdout)
            .map_err(|e| LinterError::InvalidOutput(e.to_string()))?;

        Ok(FixResult::new(fixed, success))
    }
}

fn failure(output: &Output) -> LinterError {
    LinterError::Failed {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Extracts the version from `sqlfluff --version` output
/// (e.g. "sqlfluff, version 3.0.7")
fn parse_version(output: &str) -> Result<Version, LinterError> {
    let captures = VERSION_PATTERN.captures(output).ok_or_else(|| {
        LinterError::InvalidOutput(format!("unrecognized version output: {}", output.trim()))
    })?;

    Version::parse(&captures[1]).map_err(|e| LinterError::InvalidOutput(e.to_string()))
}

fn discover_config_files(root: &Path) -> Vec<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .filter(|path| path.is_file())
        .collect()
}
