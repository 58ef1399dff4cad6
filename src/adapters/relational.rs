//! Normalized relational backend (SQLite via rusqlite).
//!
//! Authors and books live in separate tables joined through `book_authors`.
//! Configuration: WAL mode, NORMAL synchronous. Traversal reads go through a
//! SQL join; both rename flavors are a single-row UPDATE, the join table
//! making the shared field ripple automatically.

use crate::{Author, BackendKind, Book, BookStore, StoreError, StoreResult};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct RelationalStore {
    conn: Connection,
}

impl RelationalStore {
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let conn = Connection::open(dir.join("catalog.sqlite3"))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS authors (
                id         INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name  TEXT NOT NULL,
                pen_name   TEXT NOT NULL,
                email      TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS books (
                id               INTEGER PRIMARY KEY,
                title            TEXT    NOT NULL,
                release_date     INTEGER NOT NULL,
                available_online INTEGER NOT NULL,
                word_count       INTEGER NOT NULL,
                genres           TEXT    NOT NULL,
                formats          TEXT    NOT NULL,
                description      TEXT    NOT NULL
            );
            CREATE TABLE IF NOT EXISTS book_authors (
                book_id   INTEGER NOT NULL REFERENCES books(id),
                author_id INTEGER NOT NULL REFERENCES authors(id),
                PRIMARY KEY (book_id, author_id)
            ) WITHOUT ROWID;",
        )?;
        Ok(Self { conn })
    }
}

impl BookStore for RelationalStore {
    fn name(&self) -> &'static str {
        "Relational"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    fn insert_all(&mut self, authors: &[Author], books: &[Book]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut author_stmt = tx.prepare_cached(
                "INSERT INTO authors (id, first_name, last_name, pen_name, email)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for a in authors {
                author_stmt.execute(params![
                    a.id as i64,
                    a.first_name,
                    a.last_name,
                    a.pen_name,
                    a.email
                ])?;
            }

            let mut book_stmt = tx.prepare_cached(
                "INSERT INTO books (id, title, release_date, available_online,
                                    word_count, genres, formats, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut join_stmt = tx.prepare_cached(
                "INSERT INTO book_authors (book_id, author_id) VALUES (?1, ?2)",
            )?;
            for b in books {
                book_stmt.execute(params![
                    b.id as i64,
                    b.title,
                    b.release_date,
                    b.available_online,
                    b.word_count,
                    serde_json::to_string(&b.genres)?,
                    serde_json::to_string(&b.formats)?,
                    b.description
                ])?;
                for &author_id in &b.author_ids {
                    join_stmt.execute(params![b.id as i64, author_id as i64])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn find_author(&mut self, id: u64) -> StoreResult<Option<Author>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, first_name, last_name, pen_name, email
             FROM authors WHERE id = ?1",
        )?;
        match stmt.query_row(params![id as i64], row_to_author) {
            Ok(author) => Ok(Some(author)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_author_with_books(&mut self, id: u64) -> StoreResult<Option<(Author, Vec<Book>)>> {
        let author = match self.find_author(id)? {
            Some(author) => author,
            None => return Ok(None),
        };
        let mut stmt = self.conn.prepare_cached(
            "SELECT b.id, b.title, b.release_date, b.available_online,
                    b.word_count, b.genres, b.formats, b.description,
                    (SELECT group_concat(ba2.author_id)
                     FROM book_authors ba2 WHERE ba2.book_id = b.id)
             FROM books b
             JOIN book_authors ba ON ba.book_id = b.id
             WHERE ba.author_id = ?1
             ORDER BY b.id",
        )?;
        let rows = stmt.query_map(params![id as i64], row_to_book)?;
        let mut books = Vec::new();
        for row in rows {
            books.push(row?);
        }
        Ok(Some((author, books)))
    }

    fn rename_author(&mut self, id: u64, pen_name: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE authors SET pen_name = ?1 WHERE id = ?2",
            params![pen_name, id as i64],
        )?;
        if changed == 0 {
            return Err(StoreError::AuthorNotFound(id));
        }
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(
            "BEGIN;
             DELETE FROM book_authors;
             DELETE FROM books;
             DELETE FROM authors;
             COMMIT;",
        )?;
        Ok(())
    }

    // Index DDL runs in its own short transaction, never inside a workload
    // transaction.

    fn create_indexes(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(
            "BEGIN IMMEDIATE;
             CREATE INDEX IF NOT EXISTS idx_book_authors_author
                 ON book_authors(author_id);
             COMMIT;",
        )?;
        Ok(())
    }

    fn drop_indexes(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(
            "BEGIN IMMEDIATE;
             DROP INDEX IF EXISTS idx_book_authors_author;
             COMMIT;",
        )?;
        Ok(())
    }
}

fn row_to_author(row: &rusqlite::Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get::<_, i64>(0)? as u64,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        pen_name: row.get(3)?,
        email: row.get(4)?,
    })
}

fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
    let genres: String = row.get(5)?;
    let formats: String = row.get(6)?;
    let refs: Option<String> = row.get(8)?;
    Ok(Book {
        id: row.get::<_, i64>(0)? as u64,
        title: row.get(1)?,
        release_date: row.get(2)?,
        available_online: row.get(3)?,
        word_count: row.get(4)?,
        genres: decode_list(5, &genres)?,
        formats: decode_list(6, &formats)?,
        description: row.get(7)?,
        author_ids: refs
            .unwrap_or_default()
            .split(',')
            .filter_map(|t| t.parse().ok())
            .collect(),
    })
}

fn decode_list(col: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}
