//! Inline `noqa` suppression code actions

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, CodeActionParams, Range, TextEdit, Url,
    WorkspaceEdit,
};

/// Suffixes appended to the selected line, paired with the action title
const NOQA_SUFFIXES: [(&str, &str); 3] = [
    (" -- noqa", "Ignoring Errors for current line (-- noqa)"),
    (
        " -- noqa: disable=all",
        "Ignoring Errors for current line (-- noqa: disable=all)",
    ),
    (
        " -- noqa: enable=all",
        "Ignoring Errors for current line (-- noqa: enable=all)",
    ),
];

/// Actions are offered for a single-line selection starting at column 0
/// with at least one diagnostic in context
pub fn is_applicable(params: &CodeActionParams) -> bool {
    let range = params.range;
    range.start.line == range.end.line
        && range.start.character == 0
        && !params.context.diagnostics.is_empty()
}

fn noqa_action(uri: &Url, range: Range, new_text: String, title: &str) -> CodeActionOrCommand {
    let changes = HashMap::from([(uri.clone(), vec![TextEdit::new(range, new_text)])]);

    CodeActionOrCommand::CodeAction(CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::REFACTOR_INLINE),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Builds the three suppression actions for `line`, each replacing the requested range
pub fn noqa_actions(uri: &Url, range: Range, line: &str) -> Vec<CodeActionOrCommand> {
    let content = line.trim_end();

    NOQA_SUFFIXES
        .iter()
        .map(|(suffix, title)| noqa_action(uri, range, format!("{}{}", content, suffix), title))
        .collect()
}
