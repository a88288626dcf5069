//! Common types for the linter boundary

use std::path::PathBuf;

use semver::Version;
use serde::Deserialize;

use crate::linter::error::LinterError;

/// Severity reported by the linter for a single violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// A single rule violation reported by the linter
///
/// Positions are 1-based, following the linter's convention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Violation {
    pub description: String,
    #[serde(alias = "start_line_no")]
    pub line_no: u32,
    #[serde(alias = "start_line_pos")]
    pub line_pos: u32,
    pub code: String,
    /// Rule name (e.g. "layout.spacing"), only reported by newer linters
    #[serde(default)]
    pub name: Option<String>,
    /// Set when the linter was configured to downgrade the rule to a warning
    #[serde(default)]
    pub warning: bool,
}

impl Violation {
    pub fn new(code: &str, description: &str, line_no: u32, line_pos: u32) -> Self {
        Self {
            description: description.to_string(),
            line_no,
            line_pos,
            code: code.to_string(),
            name: None,
            warning: false,
        }
    }

    pub fn severity(&self) -> Severity {
        if self.warning {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    fn validate(&self) -> Result<(), LinterError> {
        if self.line_no == 0 || self.line_pos == 0 {
            return Err(LinterError::InvalidOutput(format!(
                "violation {} has a zero position ({}:{})",
                self.code, self.line_no, self.line_pos
            )));
        }
        Ok(())
    }
}

/// Violations reported for one linted file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRecord {
    pub filepath: String,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// Result of a lint invocation, one record per linted file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LintResult {
    pub files: Vec<FileRecord>,
}

impl LintResult {
    pub fn new(files: Vec<FileRecord>) -> Self {
        Self { files }
    }

    /// Builds a single-file result, as produced when linting stdin
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self::new(vec![FileRecord {
            filepath: "stdin".to_string(),
            violations,
        }])
    }

    /// Parses the JSON records emitted by `sqlfluff lint --format json`
    pub fn from_json(output: &str) -> Result<Self, LinterError> {
        let files: Vec<FileRecord> = serde_json::from_str(output.trim())
            .map_err(|e| LinterError::InvalidOutput(e.to_string()))?;

        for violation in files.iter().flat_map(|f| &f.violations) {
            violation.validate()?;
        }

        Ok(Self::new(files))
    }

    /// Violations of the first file record, empty if nothing was linted
    pub fn first_violations(&self) -> &[Violation] {
        self.files
            .first()
            .map(|f| f.violations.as_slice())
            .unwrap_or_default()
    }
}

/// Result of a fix invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixResult {
    fixed: String,
    success: bool,
}

impl FixResult {
    pub fn new(fixed: impl Into<String>, success: bool) -> Self {
        Self {
            fixed: fixed.into(),
            success,
        }
    }

    /// Returns the fixed text and whether every violation could be fixed
    pub fn fix_string(&self) -> (&str, bool) {
        (&self.fixed, self.success)
    }
}

/// Linter configuration resolved from the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterConfig {
    /// Directory the linter runs in; project config files are picked up from here
    pub root: PathBuf,
    /// Project configuration files found in `root`
    pub config_files: Vec<PathBuf>,
    /// Version reported by the linter executable
    pub version: Version,
}
