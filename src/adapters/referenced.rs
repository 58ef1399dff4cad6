//! Document-per-entity backend with foreign-key-style references (sled).
//!
//! Authors and books are separate document sets; book documents hold a list
//! of opaque author ids. Traversal is the model's two-step pattern: fetch the
//! author document, then the books referencing it (index prefix scan when
//! indexed, full collection scan otherwise). Renames touch exactly one author
//! document, same as the single-update cost.

use super::{decode, doc_key, encode, index_key, index_key_book_id};
use crate::{Author, BackendKind, Book, BookStore, StoreError, StoreResult};
use sled::Tree;
use std::path::Path;

const AUTHORS_TREE: &str = "authors";
const BOOKS_TREE: &str = "books";
const INDEX_TREE: &str = "books_by_author";

pub struct ReferencedStore {
    db: sled::Db,
    authors: Tree,
    books: Tree,
    by_author: Tree,
    indexed: bool,
}

impl ReferencedStore {
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let db = sled::open(dir.join("referenced.sled"))?;
        let authors = db.open_tree(AUTHORS_TREE)?;
        let books = db.open_tree(BOOKS_TREE)?;
        let by_author = db.open_tree(INDEX_TREE)?;
        Ok(Self { db, authors, books, by_author, indexed: false })
    }

    fn books_for_author(&self, id: u64) -> StoreResult<Vec<Book>> {
        let mut found = Vec::new();
        if self.indexed {
            for entry in self.by_author.scan_prefix(id.to_be_bytes()) {
                let (key, _) = entry?;
                let book_id = index_key_book_id(key.as_ref())?;
                if let Some(bytes) = self.books.get(doc_key(book_id))? {
                    found.push(decode(&bytes)?);
                }
            }
        } else {
            for entry in self.books.iter() {
                let (_, bytes) = entry?;
                let book: Book = decode(&bytes)?;
                if book.author_ids.contains(&id) {
                    found.push(book);
                }
            }
        }
        Ok(found)
    }

    fn rebuild_index(&self) -> StoreResult<()> {
        self.by_author.clear()?;
        let mut batch = sled::Batch::default();
        for entry in self.books.iter() {
            let (_, bytes) = entry?;
            let book: Book = decode(&bytes)?;
            for &author_id in &book.author_ids {
                batch.insert(index_key(author_id, book.id).to_vec(), Vec::<u8>::new());
            }
        }
        self.by_author.apply_batch(batch)?;
        Ok(())
    }
}

impl BookStore for ReferencedStore {
    fn name(&self) -> &'static str {
        "Referenced"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Referenced
    }

    fn insert_all(&mut self, authors: &[Author], books: &[Book]) -> StoreResult<()> {
        let mut author_batch = sled::Batch::default();
        for author in authors {
            author_batch.insert(doc_key(author.id).to_vec(), encode(author)?);
        }
        self.authors.apply_batch(author_batch)?;

        let mut book_batch = sled::Batch::default();
        let mut index = sled::Batch::default();
        for book in books {
            if self.indexed {
                for &author_id in &book.author_ids {
                    index.insert(index_key(author_id, book.id).to_vec(), Vec::<u8>::new());
                }
            }
            book_batch.insert(doc_key(book.id).to_vec(), encode(book)?);
        }
        self.books.apply_batch(book_batch)?;
        if self.indexed {
            self.by_author.apply_batch(index)?;
        }
        self.db.flush()?;
        Ok(())
    }

    fn find_author(&mut self, id: u64) -> StoreResult<Option<Author>> {
        match self.authors.get(doc_key(id))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn find_author_with_books(&mut self, id: u64) -> StoreResult<Option<(Author, Vec<Book>)>> {
        let author = match self.find_author(id)? {
            Some(author) => author,
            None => return Ok(None),
        };
        let books = self.books_for_author(id)?;
        Ok(Some((author, books)))
    }

    fn rename_author(&mut self, id: u64, pen_name: &str) -> StoreResult<()> {
        let mut author: Author = match self.authors.get(doc_key(id))? {
            Some(bytes) => decode(&bytes)?,
            None => return Err(StoreError::AuthorNotFound(id)),
        };
        author.pen_name = pen_name.to_string();
        self.authors.insert(doc_key(id), encode(&author)?)?;
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<()> {
        self.books.clear()?;
        self.authors.clear()?;
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
