//! Shared types, error handling and the storage-strategy contract for
//! catalog-bench.

pub mod adapters;
pub mod generator;
pub mod harness;
pub mod indexing;
pub mod measure;
pub mod report;
pub mod runner;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────────
// Error type
// ────────────────────────────────────────────────────────────────────────────────

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("author {0} not found")]
    AuthorNotFound(u64),
    #[error("invalid index key length")]
    InvalidIndexKey,
    #[error("config error: {0}")]
    Config(String),
}

// ────────────────────────────────────────────────────────────────────────────────
// Backends
// ────────────────────────────────────────────────────────────────────────────────

/// The three storage strategies under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    Embedded,
    Referenced,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Relational,
        BackendKind::Embedded,
        BackendKind::Referenced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Relational => "Relational",
            BackendKind::Embedded => "Embedded",
            BackendKind::Referenced => "Referenced",
        }
    }

    /// Column position of this backend in result-matrix rows and report tables.
    pub fn column(self) -> usize {
        match self {
            BackendKind::Relational => 0,
            BackendKind::Embedded => 1,
            BackendKind::Referenced => 2,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Synthetic entities
// ────────────────────────────────────────────────────────────────────────────────

/// A synthetic author. Immutable once generated within a run; the workload
/// only ever rewrites `pen_name` through the stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub pen_name: String,
    pub email: String,
}

/// A synthetic book. `author_ids` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    /// Release instant as epoch seconds.
    pub release_date: i64,
    pub available_online: bool,
    pub word_count: u32,
    pub genres: Vec<String>,
    pub formats: Vec<String>,
    pub description: String,
    pub author_ids: Vec<u64>,
}

// ────────────────────────────────────────────────────────────────────────────────
// BookStore trait — every adapter implements this
// ────────────────────────────────────────────────────────────────────────────────

/// Unified storage contract. The interface is uniform so the workload runner
/// can drive all three backends identically, but implementations deliberately
/// share no access-path code: each exercises the idiomatic pattern for its
/// data model (SQL join vs. self-contained denormalized read vs. two-step
/// reference resolution).
pub trait BookStore: Send {
    fn name(&self) -> &'static str;
    fn kind(&self) -> BackendKind;

    /// Bulk-write authors then books in the backend's native representation.
    fn insert_all(&mut self, authors: &[Author], books: &[Book]) -> StoreResult<()>;

    /// Point lookup by author key.
    fn find_author(&mut self, id: u64) -> StoreResult<Option<Author>>;

    /// Point lookup plus traversal to every book referencing the author.
    fn find_author_with_books(&mut self, id: u64) -> StoreResult<Option<(Author, Vec<Book>)>>;

    /// Read-mutate-write of one author's pen name. A missing id is an error.
    fn rename_author(&mut self, id: u64, pen_name: &str) -> StoreResult<()>;

    /// Full cleanup: the backend holds no books and no authors afterwards.
    fn delete_all(&mut self) -> StoreResult<()>;

    /// Build the backend's secondary indexes. Idempotent.
    fn create_indexes(&mut self) -> StoreResult<()>;

    /// Remove the backend's secondary indexes. Idempotent.
    fn drop_indexes(&mut self) -> StoreResult<()>;
}
