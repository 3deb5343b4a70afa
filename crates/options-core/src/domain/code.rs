//! Value Codes
//!
//! Derivation of option codes from labels and validation of the few
//! metadata fields that have a fixed shape.

use std::sync::OnceLock;

use regex::Regex;

use super::error::ValidationError;

/// Upper-snake code for a label: trimmed, uppercased, every whitespace run
/// collapsed into one underscore.
pub fn to_code(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Trim a label and reject it when nothing is left
pub fn normalize_label(label: &str) -> Result<String, ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    Ok(trimmed.to_string())
}

/// Explicit value when one was typed, otherwise the code of the label
pub fn resolve_value(label: &str, explicit: Option<&str>) -> String {
    match explicit.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => to_code(label),
    }
}

fn whatsapp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://(chat\.whatsapp\.com/[A-Za-z0-9]+|wa\.me/\+?[0-9]+)(/?|\?.*)$")
            .expect("whatsapp link pattern is valid")
    })
}

/// Trim a WhatsApp group/contact link. Empty input means "no link".
pub fn normalize_whatsapp_link(raw: &str) -> Result<Option<String>, ValidationError> {
    let link = raw.trim();
    if link.is_empty() {
        return Ok(None);
    }
    if !whatsapp_pattern().is_match(link) {
        return Err(ValidationError::InvalidWhatsappLink(link.to_string()));
    }
    Ok(Some(link.to_string()))
}
