//! Level Columns
//!
//! Per-level data column, its form, and the serialized handle the UI
//! holds on to.

mod error;
mod form;
mod level;
mod shared;

#[cfg(test)]
mod tests;

pub use error::{ColumnError, ColumnResult, MutationKind};
pub use form::{ColumnForm, OptionInput};
pub use level::{DeleteProgress, LevelColumn, PendingDeletion};
pub use shared::{ColumnView, SharedColumn};
