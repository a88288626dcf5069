//! Linter layer
//! - traits.rs: Linter trait definition
//! - types.rs: Violation records, fix results and resolved configuration
//! - error.rs: Linter errors
//! - sqlfluff.rs: sqlfluff command line implementation

pub mod error;
pub mod sqlfluff;
pub mod traits;
pub mod types;

pub use error::LinterError;
pub use sqlfluff::SqlfluffCli;
pub use traits::Linter;
pub use types::{FileRecord, FixResult, LintResult, LinterConfig, Severity, Violation};
