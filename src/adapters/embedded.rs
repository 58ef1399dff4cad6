//! Denormalized single-collection backend (sled).
//!
//! One document per book, each carrying full nested copies of its authors;
//! there is no separate author record set. Point reads resolve an author from
//! any book document that embeds it: a prefix scan of the author→book index
//! tree when indexed, a full collection scan otherwise. Renames rewrite every
//! referencing book document.

use super::{decode, doc_key, encode, index_key, index_key_book_id};
use crate::{Author, BackendKind, Book, BookStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use sled::Tree;
use std::collections::HashMap;
use std::path::Path;

const BOOKS_TREE: &str = "books";
const INDEX_TREE: &str = "books_by_author";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDoc {
    id: u64,
    title: String,
    release_date: i64,
    available_online: bool,
    word_count: u32,
    genres: Vec<String>,
    formats: Vec<String>,
    description: String,
    authors: Vec<Author>,
}

impl BookDoc {
    fn from_book(book: &Book, authors_by_id: &HashMap<u64, &Author>) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            release_date: book.release_date,
            available_online: book.available_online,
            word_count: book.word_count,
            genres: book.genres.clone(),
            formats: book.formats.clone(),
            description: book.description.clone(),
            authors: book
                .author_ids
                .iter()
                .filter_map(|id| authors_by_id.get(id).map(|a| (*a).clone()))
                .collect(),
        }
    }

    fn to_book(&self) -> Book {
        Book {
            id: self.id,
            title: self.title.clone(),
            release_date: self.release_date,
            available_online: self.available_online,
            word_count: self.word_count,
            genres: self.genres.clone(),
            formats: self.formats.clone(),
            description: self.description.clone(),
            author_ids: self.authors.iter().map(|a| a.id).collect(),
        }
    }
}

pub struct EmbeddedStore {
    db: sled::Db,
    books: Tree,
    by_author: Tree,
    indexed: bool,
}

impl EmbeddedStore {
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let db = sled::open(dir.join("embedded.sled"))?;
        let books = db.open_tree(BOOKS_TREE)?;
        let by_author = db.open_tree(INDEX_TREE)?;
        Ok(Self { db, books, by_author, indexed: false })
    }

    /// First book document embedding the author, stopping at the first hit.
    fn first_doc_for_author(&self, id: u64) -> StoreResult<Option<BookDoc>> {
        if self.indexed {
            if let Some(entry) = self.by_author.scan_prefix(id.to_be_bytes()).next() {
                let (key, _) = entry?;
                let book_id = index_key_book_id(key.as_ref())?;
                if let Some(bytes) = self.books.get(doc_key(book_id))? {
                    return Ok(Some(decode(&bytes)?));
                }
            }
            Ok(None)
        } else {
            for entry in self.books.iter() {
                let (_, bytes) = entry?;
                let doc: BookDoc = decode(&bytes)?;
                if doc.authors.iter().any(|a| a.id == id) {
                    return Ok(Some(doc));
                }
            }
            Ok(None)
        }
    }

    /// Every book document embedding the author.
    fn docs_for_author(&self, id: u64) -> StoreResult<Vec<BookDoc>> {
        let mut docs = Vec::new();
        if self.indexed {
            for entry in self.by_author.scan_prefix(id.to_be_bytes()) {
                let (key, _) = entry?;
                let book_id = index_key_book_id(key.as_ref())?;
                if let Some(bytes) = self.books.get(doc_key(book_id))? {
                    docs.push(decode(&bytes)?);
                }
            }
        } else {
            for entry in self.books.iter() {
                let (_, bytes) = entry?;
                let doc: BookDoc = decode(&bytes)?;
                if doc.authors.iter().any(|a| a.id == id) {
                    docs.push(doc);
                }
            }
        }
        Ok(docs)
    }

    fn rebuild_index(&self) -> StoreResult<()> {
        self.by_author.clear()?;
        let mut batch = sled::Batch::default();
        for entry in self.books.iter() {
            let (_, bytes) = entry?;
            let doc: BookDoc = decode(&bytes)?;
            for author in &doc.authors {
                batch.insert(index_key(author.id, doc.id).to_vec(), Vec::<u8>::new());
            }
        }
        self.by_author.apply_batch(batch)?;
        Ok(())
    }
}

impl BookStore for EmbeddedStore {
    fn name(&self) -> &'static str {
        "Embedded"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    fn insert_all(&mut self, authors: &[Author], books: &[Book]) -> StoreResult<()> {
        let authors_by_id: HashMap<u64, &Author> = authors.iter().map(|a| (a.id, a)).collect();
        let mut docs = sled::Batch::default();
        let mut index = sled::Batch::default();
        for book in books {
            let doc = BookDoc::from_book(book, &authors_by_id);
            if self.indexed {
                for author in &doc.authors {
                    index.insert(index_key(author.id, doc.id).to_vec(), Vec::<u8>::new());
                }
            }
            docs.insert(doc_key(doc.id).to_vec(), encode(&doc)?);
        }
        self.books.apply_batch(docs)?;
        if self.indexed {
            self.by_author.apply_batch(index)?;
        }
        // include the disk flush in the bulk-write cost, matching the
        // relational commit
        self.db.flush()?;
        Ok(())
    }

    fn find_author(&mut self, id: u64) -> StoreResult<Option<Author>> {
        let doc = self.first_doc_for_author(id)?;
        Ok(doc.and_then(|d| d.authors.into_iter().find(|a| a.id == id)))
    }

    fn find_author_with_books(&mut self, id: u64) -> StoreResult<Option<(Author, Vec<Book>)>> {
        let docs = self.docs_for_author(id)?;
        let author = match docs
            .iter()
            .flat_map(|d| d.authors.iter())
            .find(|a| a.id == id)
        {
            Some(author) => author.clone(),
            None => return Ok(None),
        };
        let books = docs.iter().map(BookDoc::to_book).collect();
        Ok(Some((author, books)))
    }

    fn rename_author(&mut self, id: u64, pen_name: &str) -> StoreResult<()> {
        let docs = self.docs_for_author(id)?;
        if docs.is_empty() {
            return Err(StoreError::AuthorNotFound(id));
        }
        for mut doc in docs {
            for author in doc.authors.iter_mut().filter(|a| a.id == id) {
                author.pen_name = pen_name.to_string();
            }
            self.books.insert(doc_key(doc.id), encode(&doc)?)?;
        }
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<()> {
        self.books.clear()?;
        self.by_author.clear()?;
        self.db.flush()?;
        Ok(())
    }

    fn create_indexes(&mut self) -> StoreResult<()> {
        if self.indexed {
            return Ok(());
        }
        self.rebuild_index()?;
        self.indexed = true;
        Ok(())
    }

    fn drop_indexes(&mut self) -> StoreResult<()> {
        self.by_author.clear()?;
        self.indexed = false;
        Ok(())
    }
}
