//! Inline Add/Edit Form
//!
//! What the user typed into a column's form, before validation.

use crate::domain::{OptionId, OptionItem};

/// Raw input for creating or updating one item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionInput {
    pub label: String,
    /// Explicit code; `None` or blank derives it from the label
    pub value: Option<String>,
    /// Only used for cities
    pub whatsapp_link: Option<String>,
    pub sort_order: Option<i32>,
}

impl OptionInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_whatsapp_link(mut self, link: impl Into<String>) -> Self {
        self.whatsapp_link = Some(link.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }
}

/// State of a column's inline form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnForm {
    /// Item being edited; `None` adds a new one
    pub editing: Option<OptionId>,
    pub label: String,
    pub value: String,
    pub whatsapp_link: String,
}

impl ColumnForm {
    /// Form prefilled from an existing item. The code is left blank so it
    /// follows the edited label unless one is typed.
    pub fn for_edit(item: &OptionItem) -> Self {
        Self {
            editing: Some(item.id.clone()),
            label: item.label.clone(),
            value: String::new(),
            whatsapp_link: item.whatsapp_link().unwrap_or_default().to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn input(&self) -> OptionInput {
        OptionInput {
            label: self.label.clone(),
            value: Some(self.value.clone()).filter(|v| !v.trim().is_empty()),
            whatsapp_link: Some(self.whatsapp_link.clone()),
            sort_order: None,
        }
    }
}
