//! Storage adapters: one module per data-modeling strategy.

pub mod embedded;
pub mod referenced;
pub mod relational;

pub use embedded::EmbeddedStore;
pub use referenced::ReferencedStore;
pub use relational::RelationalStore;

use crate::{StoreError, StoreResult};

/// Big-endian document keys keep the sled trees ordered by id.
pub(crate) fn doc_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

/// Composite (author, book) key for the author→book index trees; prefix
/// scanning on the author half yields that author's books.
pub(crate) fn index_key(author_id: u64, book_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&author_id.to_be_bytes());
    key[8..].copy_from_slice(&book_id.to_be_bytes());
    key
}

/// Book id half of an author→book index key.
pub(crate) fn index_key_book_id(key: &[u8]) -> StoreResult<u64> {
    let raw: [u8; 8] = key
        .get(8..16)
        .and_then(|half| half.try_into().ok())
        .ok_or(StoreError::InvalidIndexKey)?;
    Ok(u64::from_be_bytes(raw))
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}
