use std::path::PathBuf;
use std::time::Duration;

use tower_lsp::lsp_types::InitializeParams;

use crate::linter::sqlfluff::{DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT};

/// Client configuration section requested via `workspace/configuration`
pub const CONFIGURATION_SECTION: &str = "sqlfluff-ls";

/// Source tag attached to every published diagnostic
pub const SOURCE_TAG: &str = "sqlfluff-ls";

/// Name reported in the initialize result
pub const SERVER_NAME: &str = "sqlfluff-lsp";

/// Default bind address for the TCP transport
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for the TCP transport
pub const DEFAULT_PORT: u16 = 2087;

/// Options controlling how the linter executable is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterOptions {
    pub executable: PathBuf,
    pub timeout: Duration,
}

impl Default for LinterOptions {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Returns the project root the linter configuration is resolved from.
/// Uses the first workspace folder if the client sent any,
/// otherwise the root URI, or the current directory if neither is a file path.
pub fn project_root(params: &InitializeParams) -> PathBuf {
    project_root_with_cwd(params, std::env::current_dir().ok())
}

fn project_root_with_cwd(params: &InitializeParams, cwd: Option<PathBuf>) -> PathBuf {
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();

    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(root_uri)
        .and_then(|uri| uri.to_file_path().ok())
        .or(cwd)
        .unwrap_or_else(|| PathBuf::from("."))
}
