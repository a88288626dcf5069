// LSP protocol layer
// - server.rs: stdio and TCP transports
// - backend.rs: LanguageServer trait implementation
// - session.rs: Session lifecycle and shared state
// - documents.rs: Open document store
// - position.rs: Linter/LSP position conversion
// - diagnostics.rs: Diagnostics generation
// - formatting.rs: Whole-document formatting
// - code_action.rs: noqa suppression actions

pub mod backend;
pub mod code_action;
pub mod diagnostics;
pub mod documents;
pub mod formatting;
pub mod position;
pub mod server;
pub mod session;
