//! UI Components
//!
//! Reusable Leptos components.

mod delete_confirm_button;
mod hierarchy_tabs;
mod level_column;
mod notifications;
mod option_form;

pub use delete_confirm_button::DeleteConfirmButton;
pub use hierarchy_tabs::HierarchyTabs;
pub use level_column::LevelColumn;
pub use notifications::Notifications;
pub use option_form::OptionForm;
