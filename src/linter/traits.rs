//! Linter trait for detecting and fixing SQL rule violations

use std::path::Path;

use async_trait::async_trait;

use crate::linter::error::LinterError;
use crate::linter::types::{FixResult, LintResult, LinterConfig};

/// Trait for the SQL linter the server delegates to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Linter: Send + Sync {
    /// Resolves the linter configuration for a project
    ///
    /// # Arguments
    /// * `root` - The project root directory
    ///
    /// # Returns
    /// * `Err(LinterError::ConfigResolution)` - If no usable configuration can be built
    async fn resolve_config(&self, root: &Path) -> Result<LinterConfig, LinterError>;

    /// Lints `source`, returning one record per linted file
    async fn lint(&self, source: &str, config: &LinterConfig) -> Result<LintResult, LinterError>;

    /// Applies automatic fixes to `source`
    async fn fix(&self, source: &str, config: &LinterConfig) -> Result<FixResult, LinterError>;
}
