//! Repository Layer - Core Traits
//!
//! The options backend as seen by the editor. Implementations talk HTTP
//! or keep records in memory.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::domain::{OptionId, OptionItem, OptionPayload, OptionType, TypeDescriptor};

/// `Send + Sync` on native targets, nothing in the browser where the HTTP
/// client is single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// Reference-data backend.
///
/// Every call is async, may fail, and is issued at most once; callers
/// never retry on their own.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait OptionsRepository: MaybeSendSync {
    /// All taxonomy kinds the backend knows about
    async fn list_types(&self) -> RepositoryResult<Vec<TypeDescriptor>>;

    /// Items of one kind, optionally restricted to children of `parent`
    async fn list_options(
        &self,
        option_type: &OptionType,
        parent: Option<&OptionId>,
    ) -> RepositoryResult<Vec<OptionItem>>;

    /// Create (`id == None`) or update an item
    async fn upsert_option(
        &self,
        id: Option<&OptionId>,
        payload: &OptionPayload,
    ) -> RepositoryResult<OptionItem>;

    /// Remove one item. Children are left untouched.
    async fn delete_option(&self, id: &OptionId) -> RepositoryResult<()>;
}

/// Repository handle shared by every column of the editor
pub type SharedRepository = Arc<dyn OptionsRepository>;
