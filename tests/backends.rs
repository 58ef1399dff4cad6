//! Cross-backend behavioral contract tests: the three adapters must agree on
//! CRUD semantics even though their access paths differ.

mod common;

use common::{all_backends, dataset};
use tempfile::TempDir;

const SCALE: usize = 100;

#[test]
fn insert_then_point_read_finds_every_author() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);

    for store in backends.iter_mut() {
        store.insert_all(&authors, &books).unwrap();
        for author in &authors {
            let found = store
                .find_author(author.id)
                .unwrap()
                .unwrap_or_else(|| panic!("{}: author {} missing", store.name(), author.id));
            assert_eq!(found.id, author.id, "{}", store.name());
            assert_eq!(found.pen_name, author.pen_name, "{}", store.name());
            assert_eq!(found.email, author.email, "{}", store.name());
        }
    }
}

#[test]
fn traversal_read_reflects_the_popularity_skew() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);
    let popular = authors[0].id;
    let rare = authors[authors.len() - 1].id;

    for store in backends.iter_mut() {
        store.insert_all(&authors, &books).unwrap();

        let (author, popular_books) = store.find_author_with_books(popular).unwrap().unwrap();
        assert_eq!(author.id, popular, "{}", store.name());
        assert_eq!(popular_books.len(), SCALE / 2, "{}", store.name());
        for book in &popular_books {
            assert!(book.author_ids.contains(&popular), "{}", store.name());
        }

        let (_, rare_books) = store.find_author_with_books(rare).unwrap().unwrap();
        assert_eq!(rare_books.len(), 1, "{}", store.name());
    }
}

#[test]
fn rename_author_is_visible_to_point_reads() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);
    let popular = authors[0].id;
    let rare = authors[authors.len() - 1].id;

    for store in backends.iter_mut() {
        store.insert_all(&authors, &books).unwrap();

        store.rename_author(rare, "A New Alias").unwrap();
        let renamed = store.find_author(rare).unwrap().unwrap();
        assert_eq!(renamed.pen_name, "A New Alias", "{}", store.name());

        store.rename_author(popular, "Another Alias").unwrap();
        let renamed = store.find_author(popular).unwrap().unwrap();
        assert_eq!(renamed.pen_name, "Another Alias", "{}", store.name());
    }
}

#[test]
fn rename_of_a_missing_author_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);

    for store in backends.iter_mut() {
        store.insert_all(&authors, &books).unwrap();
        assert!(
            store.rename_author(9_999_999, "Nobody").is_err(),
            "{}",
            store.name()
        );
    }
}

#[test]
fn delete_all_leaves_nothing_behind() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);
    let popular = authors[0].id;
    let rare = authors[authors.len() - 1].id;

    for store in backends.iter_mut() {
        store.insert_all(&authors, &books).unwrap();
        store.delete_all().unwrap();
        assert!(store.find_author(popular).unwrap().is_none(), "{}", store.name());
        assert!(
            store.find_author_with_books(rare).unwrap().is_none(),
            "{}",
            store.name()
        );
    }
}

#[test]
fn index_lifecycle_is_idempotent_and_preserves_results() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);
    let popular = authors[0].id;

    for store in backends.iter_mut() {
        store.insert_all(&authors, &books).unwrap();
        let baseline = store.find_author_with_books(popular).unwrap().unwrap().1.len();

        store.create_indexes().unwrap();
        store.create_indexes().unwrap();
        let indexed = store.find_author_with_books(popular).unwrap().unwrap().1.len();
        assert_eq!(indexed, baseline, "{}", store.name());

        store.drop_indexes().unwrap();
        store.drop_indexes().unwrap();
        let dropped = store.find_author_with_books(popular).unwrap().unwrap().1.len();
        assert_eq!(dropped, baseline, "{}", store.name());
    }
}

#[test]
fn indexes_created_before_insert_are_maintained() {
    let tmp = TempDir::new().unwrap();
    let mut backends = all_backends(&tmp);
    let (authors, books) = dataset(SCALE);
    let popular = authors[0].id;

    for store in backends.iter_mut() {
        store.create_indexes().unwrap();
        store.insert_all(&authors, &books).unwrap();
        let found = store.find_author_with_books(popular).unwrap().unwrap().1.len();
        assert_eq!(found, SCALE / 2, "{}", store.name());
    }
}
