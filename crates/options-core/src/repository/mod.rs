//! Repository Layer
//!
//! Data access abstractions and implementations.

mod error;
mod http;
mod memory;
mod traits;


pub use error::{RepositoryError, RepositoryResult};
pub use http::HttpOptionsRepository;
pub use memory::{InMemoryOptionsRepository, Operation, RepositoryCall};
pub use traits::{MaybeSendSync, OptionsRepository, SharedRepository};
