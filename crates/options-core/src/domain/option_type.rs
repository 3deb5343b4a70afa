//! Option Type
//!
//! Tagged taxonomy kinds. The wire format is a plain string tag
//! (`BOARD`, `CITY`, `AREA_BHOPAL`, ...); in Rust the tag is an enum so
//! per-city area kinds are built through [`OptionType::scope_key`]
//! instead of string concatenation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::code::to_code;
use super::error::ValidationError;

const AREA_PREFIX: &str = "AREA_";

/// Kind of reference-data record, doubling as the API discriminator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OptionType {
    Board,
    Grade,
    Subject,
    Chapter,
    City,
    /// Areas belonging to one city, tagged `AREA_<CITY_CODE>`
    Area { city_code: String },
    /// Any other tag reported by the backend
    Custom(String),
}

impl OptionType {
    /// Area kind for a city code. The code is normalized with the same
    /// upper-snake rule used for option values.
    pub fn scope_key(city_code: &str) -> Self {
        OptionType::Area {
            city_code: to_code(city_code),
        }
    }

    /// Wire tag
    pub fn tag(&self) -> String {
        match self {
            OptionType::Board => "BOARD".to_string(),
            OptionType::Grade => "GRADE".to_string(),
            OptionType::Subject => "SUBJECT".to_string(),
            OptionType::Chapter => "CHAPTER".to_string(),
            OptionType::City => "CITY".to_string(),
            OptionType::Area { city_code } => format!("{}{}", AREA_PREFIX, city_code),
            OptionType::Custom(tag) => tag.clone(),
        }
    }

    /// Human readable name used in column headers and warnings
    pub fn display_name(&self) -> String {
        match self {
            OptionType::Board => "Board".to_string(),
            OptionType::Grade => "Grade".to_string(),
            OptionType::Subject => "Subject".to_string(),
            OptionType::Chapter => "Chapter".to_string(),
            OptionType::City => "City".to_string(),
            OptionType::Area { city_code } => format!("Area ({})", city_code),
            OptionType::Custom(tag) => tag.clone(),
        }
    }

    pub fn is_city(&self) -> bool {
        matches!(self, OptionType::City)
    }

    /// True for kinds that one of the built-in hierarchies manages.
    /// Everything else is edited as a flat list.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, OptionType::Custom(_))
    }
}

impl FromStr for OptionType {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tag = raw.trim();
        if tag.is_empty() {
            return Err(ValidationError::EmptyTypeTag);
        }
        let parsed = match tag {
            "BOARD" => OptionType::Board,
            "GRADE" => OptionType::Grade,
            "SUBJECT" => OptionType::Subject,
            "CHAPTER" => OptionType::Chapter,
            "CITY" => OptionType::City,
            _ => match tag.strip_prefix(AREA_PREFIX) {
                Some(code) if !code.is_empty() => OptionType::Area {
                    city_code: code.to_string(),
                },
                _ => OptionType::Custom(tag.to_string()),
            },
        };
        Ok(parsed)
    }
}

impl TryFrom<String> for OptionType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OptionType> for String {
    fn from(value: OptionType) -> Self {
        value.tag()
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Entry of `GET /options/types`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub value: String,
    pub label: String,
}

impl TypeDescriptor {
    pub fn option_type(&self) -> Result<OptionType, ValidationError> {
        self.value.parse()
    }
}

impl From<&OptionType> for TypeDescriptor {
    fn from(option_type: &OptionType) -> Self {
        Self {
            value: option_type.tag(),
            label: option_type.display_name(),
        }
    }
}
