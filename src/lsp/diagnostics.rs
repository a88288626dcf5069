//! Diagnostics generation from linter violations

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};
use tracing::{debug, warn};

use crate::config::SOURCE_TAG;
use crate::linter::{Linter, LinterConfig, Severity, Violation};
use crate::lsp::position::to_lsp_position;

fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    }
}

/// Converts a violation into a diagnostic highlighting the single reported character
pub fn to_diagnostic(violation: &Violation) -> Diagnostic {
    let start = to_lsp_position(violation.line_no, violation.line_pos);
    let end = Position::new(start.line, start.character + 1);

    Diagnostic {
        range: Range::new(start, end),
        severity: Some(to_lsp_severity(violation.severity())),
        code: Some(NumberOrString::String(violation.code.clone())),
        source: Some(SOURCE_TAG.to_string()),
        message: violation.description.clone(),
        ..Default::default()
    }
}

/// Lints `content` and converts the violations of the first file into diagnostics
///
/// Empty content and linter failures both produce an empty list, so a publish
/// always clears stale diagnostics.
pub async fn generate_diagnostics(
    linter: &dyn Linter,
    config: &LinterConfig,
    content: &str,
) -> Vec<Diagnostic> {
    if content.is_empty() {
        return Vec::new();
    }

    let result = match linter.lint(content, config).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Lint failed, publishing no diagnostics: {}", e);
            return Vec::new();
        }
    };

    let diagnostics: Vec<Diagnostic> = result
        .first_violations()
        .iter()
        .map(to_diagnostic)
        .collect();

    debug!("Generated {} diagnostics", diagnostics.len());
    diagnostics
}
