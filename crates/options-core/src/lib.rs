//! Options Core
//!
//! Hierarchical reference-data editor, independent of any UI:
//! - domain: records, taxonomy tags and input rules
//! - repository: the options backend (HTTP and in-memory)
//! - hierarchy: selection chain across dependent levels
//! - column: per-level loading, inline editing and gated deletion
//! - escalation: multi-step confirmation state machine
//! - config: API connection settings

pub mod column;
pub mod config;
pub mod domain;
pub mod escalation;
pub mod hierarchy;
pub mod repository;

pub use column::{
    ColumnError, ColumnForm, ColumnResult, ColumnView, DeleteProgress, LevelColumn, MutationKind,
    OptionInput, PendingDeletion, SharedColumn,
};
pub use config::{ApiConfig, ConfigError};
pub use domain::{OptionId, OptionItem, OptionMetadata, OptionPayload, OptionType, TypeDescriptor, ValidationError};
pub use escalation::{
    Confirmation, EscalationError, EscalationMachine, EscalationState, Severity, Warning,
    DESTRUCTIVE_STEPS,
};
pub use hierarchy::{
    Hierarchy, HierarchyController, HierarchyError, HierarchyKind, LevelScope, LevelSource,
    LevelSpec, Selection,
};
pub use repository::{
    HttpOptionsRepository, InMemoryOptionsRepository, OptionsRepository, RepositoryError,
    RepositoryResult, SharedRepository,
};
