//! Shared fixtures: the three backends built in a scratch directory, plus a
//! seeded dataset.

use catalog_bench::adapters::{EmbeddedStore, ReferencedStore, RelationalStore};
use catalog_bench::generator::{author_count, DataGen, DEFAULT_SEED};
use catalog_bench::{Author, Book, BookStore};
use tempfile::TempDir;

pub fn all_backends(tmp: &TempDir) -> Vec<Box<dyn BookStore>> {
    vec![
        Box::new(RelationalStore::open(tmp.path()).expect("open relational store")),
        Box::new(EmbeddedStore::open(tmp.path()).expect("open embedded store")),
        Box::new(ReferencedStore::open(tmp.path()).expect("open referenced store")),
    ]
}

pub fn dataset(scale: usize) -> (Vec<Author>, Vec<Book>) {
    let mut gen = DataGen::new(DEFAULT_SEED);
    let authors = gen.gen_authors(author_count(scale));
    let books = gen.gen_books(scale, &authors);
    (authors, books)
}
