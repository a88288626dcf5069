//! Conversion between linter positions (1-based line/column) and LSP positions (0-based)

use tower_lsp::lsp_types::Position;

/// Converts a 1-based linter position into a 0-based LSP position
pub fn to_lsp_position(line_no: u32, line_pos: u32) -> Position {
    Position::new(line_no.saturating_sub(1), line_pos.saturating_sub(1))
}

/// Returns the position just past the last character of the document
///
/// `lines` must hold at least one line; an empty document is a single empty line.
/// The character offset is counted in UTF-16 code units.
pub fn document_end_position<S: AsRef<str>>(lines: &[S]) -> Position {
    let last_line = lines.last().map(|l| l.as_ref()).unwrap_or_default();
    let line = lines.len().saturating_sub(1) as u32;
    let character = last_line.encode_utf16().count() as u32;
    Position::new(line, character)
}
