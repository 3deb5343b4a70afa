//! Domain Layer
//!
//! Reference-data records, their taxonomy tags and input rules.
//! No I/O lives here.

mod code;
mod error;
mod option_item;
mod option_type;

pub use code::{normalize_label, normalize_whatsapp_link, resolve_value, to_code};
pub use error::ValidationError;
pub use option_item::{OptionId, OptionItem, OptionMetadata, OptionPayload, WHATSAPP_LINK_KEY};
pub use option_type::{OptionType, TypeDescriptor};
