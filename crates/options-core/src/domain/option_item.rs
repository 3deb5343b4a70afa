//! Option Item Entity
//!
//! A single reference-data record and the payload used to create or
//! update one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::code::{normalize_label, resolve_value};
use super::error::ValidationError;
use super::option_type::OptionType;

/// Metadata key holding a city's WhatsApp group link
pub const WHATSAPP_LINK_KEY: &str = "whatsappLink";

/// Opaque record identifier.
///
/// Backends hand out either strings or integers; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OptionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for OptionId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => OptionId(text),
            RawId::Number(number) => OptionId(number.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for OptionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(OptionId::from)
    }
}

/// Parent reference as sent by the backend: a bare id or a populated record
#[derive(Deserialize)]
#[serde(untagged)]
enum RawParent {
    Id(RawId),
    Populated {
        #[serde(alias = "_id")]
        id: RawId,
    },
}

fn deserialize_parent<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<OptionId>, D::Error> {
    let raw = Option::<RawParent>::deserialize(deserializer)?;
    Ok(raw.map(|parent| match parent {
        RawParent::Id(id) | RawParent::Populated { id } => OptionId::from(id),
    }))
}

/// Open key/value metadata attached to an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionMetadata(Map<String, Value>);

impl OptionMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn whatsapp_link(&self) -> Option<&str> {
        self.0.get(WHATSAPP_LINK_KEY).and_then(Value::as_str)
    }

    pub fn with_whatsapp_link(mut self, link: Option<String>) -> Self {
        match link {
            Some(link) => self.insert(WHATSAPP_LINK_KEY, Value::String(link)),
            None => {
                self.remove(WHATSAPP_LINK_KEY);
            }
        }
        self
    }
}

impl<'de> Deserialize<'de> for OptionMetadata {
    // `null` and a missing field both mean "no metadata"
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(Self(map.unwrap_or_default()))
    }
}

/// Reference-data record (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    #[serde(alias = "_id")]
    pub id: OptionId,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, deserialize_with = "deserialize_parent")]
    pub parent: Option<OptionId>,
    #[serde(default, skip_serializing_if = "OptionMetadata::is_empty")]
    pub metadata: OptionMetadata,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OptionItem {
    /// Build a record from a payload, as a backend would after an insert
    pub fn from_payload(id: OptionId, payload: OptionPayload) -> Self {
        Self {
            id,
            option_type: payload.option_type,
            label: payload.label,
            value: payload.value,
            parent: payload.parent,
            metadata: payload.metadata.unwrap_or_default(),
            sort_order: payload.sort_order.unwrap_or(0),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn whatsapp_link(&self) -> Option<&str> {
        self.metadata.whatsapp_link()
    }
}

/// Body of `POST /options` and `PUT /options/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<OptionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OptionMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl OptionPayload {
    /// Payload with a trimmed label and a value derived from it
    pub fn new(option_type: OptionType, label: &str) -> Result<Self, ValidationError> {
        let label = normalize_label(label)?;
        let value = resolve_value(&label, None);
        Ok(Self {
            option_type,
            label,
            value,
            parent: None,
            metadata: None,
            sort_order: None,
        })
    }

    /// Override the derived value. Blank input keeps the derived one.
    pub fn with_value(mut self, value: Option<&str>) -> Self {
        self.value = resolve_value(&self.label, value);
        self
    }

    pub fn with_parent(mut self, parent: Option<OptionId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_metadata(mut self, metadata: OptionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Payload that writes an existing record back unchanged
    pub fn from_item(item: &OptionItem) -> Self {
        Self {
            option_type: item.option_type.clone(),
            label: item.label.clone(),
            value: item.value.clone(),
            parent: item.parent.clone(),
            metadata: if item.metadata.is_empty() {
                None
            } else {
                Some(item.metadata.clone())
            },
            sort_order: Some(item.sort_order),
        }
    }
}
