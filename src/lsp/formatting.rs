//! Whole-document formatting through the linter's fix mode

use tower_lsp::lsp_types::{Position, Range, TextEdit};
use tracing::{info, warn};

use crate::linter::{Linter, LinterConfig, LinterError};
use crate::lsp::documents::Document;
use crate::lsp::position::document_end_position;

/// Outcome of a formatting run, kept separate from the edits so callers can report it
#[derive(Debug)]
pub enum FormatOutcome {
    /// The linter produced fixed text
    Formatted(Vec<TextEdit>),
    /// The linter succeeded but produced no text
    Empty,
    /// The linter failed; no edit is returned to the client
    Failed(LinterError),
}

impl FormatOutcome {
    pub fn into_edits(self) -> Option<Vec<TextEdit>> {
        match self {
            FormatOutcome::Formatted(edits) => Some(edits),
            FormatOutcome::Empty | FormatOutcome::Failed(_) => None,
        }
    }
}

/// Builds the single edit replacing the whole document with `new_text`
pub fn whole_document_edit(document: &Document, new_text: String) -> TextEdit {
    let end = document_end_position(&document.lines());
    TextEdit::new(Range::new(Position::new(0, 0), end), new_text)
}

/// Runs the linter in fix mode and converts its output into at most one edit
///
/// The edit is returned even when the fixed text equals the original.
pub async fn format_document(
    linter: &dyn Linter,
    config: &LinterConfig,
    document: &Document,
) -> FormatOutcome {
    let result = match linter.fix(&document.text, config).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Formatting failed: {}", e);
            return FormatOutcome::Failed(e);
        }
    };

    let (fixed, success) = result.fix_string();
    if !success {
        info!("Formatting left unfixable violations");
    }

    if fixed.is_empty() {
        return FormatOutcome::Empty;
    }

    FormatOutcome::Formatted(vec![whole_document_edit(document, fixed.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::FixResult;
    use crate::linter::traits::MockLinter;
    use semver::Version;
    use std::path::PathBuf;

    fn linter_config() -> LinterConfig {
        LinterConfig {
            root: PathBuf::from("/project"),
            config_files: Vec::new(),
            version: Version::new(3, 0, 7),
        }
    }

    fn linter_fixing_to(fixed: &'static str, success: bool) -> MockLinter {
        let mut linter = MockLinter::new();
        linter
            .expect_fix()
            .times(1)
            .returning(move |_, _| Ok(FixResult::new(fixed, success)));
        linter
    }

    #[tokio::test]
    async fn format_document_replaces_whole_document() {
        let linter = linter_fixing_to("SELECT *\nFROM foo\n", true);
        let document = Document::new("select *\nfrom   foo", None);

        let edits = format_document(&linter, &linter_config(), &document)
            .await
            .into_edits()
            .unwrap();

        assert_eq!(
            edits,
            vec![TextEdit::new(
                Range::new(Position::new(0, 0), Position::new(1, 10)),
                "SELECT *\nFROM foo\n".to_string(),
            )]
        );
    }

    #[tokio::test]
    async fn format_document_returns_edit_for_unchanged_text() {
        let linter = linter_fixing_to("SELECT 1\n", true);
        let document = Document::new("SELECT 1\n", None);

        let edits = format_document(&linter, &linter_config(), &document)
            .await
            .into_edits()
            .unwrap();

        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "SELECT 1\n");
        assert_eq!(
            edits[0].range,
            Range::new(Position::new(0, 0), Position::new(1, 0))
        );
    }

    #[tokio::test]
    async fn format_document_keeps_output_of_partial_fix() {
        let linter = linter_fixing_to("SELECT a + b\n", false);
        let document = Document::new("select a+b\n", None);

        let outcome = format_document(&linter, &linter_config(), &document).await;

        assert!(matches!(outcome, FormatOutcome::Formatted(ref edits) if edits.len() == 1));
    }

    #[tokio::test]
    async fn format_document_returns_no_edit_for_empty_output() {
        let linter = linter_fixing_to("", true);
        let document = Document::new("", None);

        let outcome = format_document(&linter, &linter_config(), &document).await;

        assert!(matches!(outcome, FormatOutcome::Empty));
        assert!(outcome.into_edits().is_none());
    }

    #[tokio::test]
    async fn format_document_returns_no_edit_when_linter_fails() {
        let mut linter = MockLinter::new();
        linter.expect_fix().returning(|_, _| {
            Err(LinterError::Failed {
                status: "exit status: 2".to_string(),
                stderr: "No dialect was specified.".to_string(),
            })
        });
        let document = Document::new("select 1\n", None);

        let outcome = format_document(&linter, &linter_config(), &document).await;

        assert!(matches!(outcome, FormatOutcome::Failed(LinterError::Failed { .. })));
        assert!(outcome.into_edits().is_none());
    }
}
