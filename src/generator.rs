//! Deterministic synthetic dataset generation with a controlled popularity
//! skew.
//!
//! Author field content is a pure function of the author index; book field
//! content and author fan-out consume seeded ChaCha8 draws. Callers may rely
//! on the skew invariants (first author popular, last author rare) but not on
//! the exact book-to-author assignment.

use crate::{Author, Book};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_SEED: u64 = 42;

const FIRST_NAMES: &[&str] = &[
    "Iris", "Marcus", "Helena", "Tobias", "Greta", "Felix", "Nadia", "Oscar",
    "Petra", "Silas", "Vera", "Anton", "Clara", "Ruben", "Edith", "Hugo",
];

const LAST_NAMES: &[&str] = &[
    "Ashford", "Brandt", "Calloway", "Dietrich", "Ellison", "Falk", "Graves",
    "Holloway", "Iverson", "Jansen", "Koval", "Lindqvist", "Moreau", "Norwood",
    "Ostrander", "Pryce",
];

const GENRES: &[&str] = &[
    "fantasy", "mystery", "science-fiction", "romance", "history", "horror",
    "poetry", "biography",
];

const FORMATS: &[&str] = &["hardcover", "paperback", "ebook", "audiobook"];

const TITLE_HEADS: &[&str] = &[
    "Shadow", "Harbor", "Winter", "Glass", "Ember", "Silent", "Crimson", "Hollow",
];

const TITLE_TAILS: &[&str] = &[
    "Archive", "Crossing", "Letters", "Garden", "Meridian", "Accord", "Vigil", "Atlas",
];

/// Number of authors generated for a given book scale.
pub fn author_count(scale: usize) -> usize {
    (scale / 10).max(10)
}

pub struct DataGen {
    rng: ChaCha8Rng,
}

impl DataGen {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Generate `count` authors with ids `1..=count`. Cannot fail.
    pub fn gen_authors(&mut self, count: usize) -> Vec<Author> {
        (0..count).map(|i| author(i as u64)).collect()
    }

    /// Generate `scale` books over `authors` with the popularity skew:
    /// every even-indexed book references exactly the first author (the
    /// "popular" one), book 1 references exactly the last author (the "rare"
    /// one), and every other odd-indexed book references 1–3 authors drawn
    /// from a shuffled cycling cursor over the remaining pool. The cursor
    /// guarantees each pool author appears in at least one book once the
    /// odd-book count reaches the pool size.
    pub fn gen_books(&mut self, scale: usize, authors: &[Author]) -> Vec<Book> {
        assert!(!authors.is_empty(), "generator requires at least one author");
        let popular = authors[0].id;
        let rare = authors[authors.len() - 1].id;
        let mut pool: Vec<u64> = if authors.len() > 2 {
            authors[1..authors.len() - 1].iter().map(|a| a.id).collect()
        } else {
            vec![popular]
        };
        pool.shuffle(&mut self.rng);
        let mut cursor = 0usize;

        (0..scale)
            .map(|i| {
                let author_ids = if i % 2 == 0 {
                    vec![popular]
                } else if i == 1 {
                    vec![rare]
                } else {
                    let want = self.rng.gen_range(1..=3usize).min(pool.len());
                    let mut ids: Vec<u64> = Vec::with_capacity(want);
                    for _ in 0..want {
                        if cursor == pool.len() {
                            pool.shuffle(&mut self.rng);
                            cursor = 0;
                        }
                        let id = pool[cursor];
                        cursor += 1;
                        if !ids.contains(&id) {
                            ids.push(id);
                        }
                    }
                    ids
                };
                self.book(i as u64 + 1, author_ids)
            })
            .collect()
    }

    fn book(&mut self, id: u64, author_ids: Vec<u64>) -> Book {
        let ts_base = 1_500_000_000i64;
        let genre_count = self.rng.gen_range(1..=2usize);
        let format_count = self.rng.gen_range(1..=2usize);
        Book {
            id,
            title: format!(
                "{} {} {}",
                TITLE_HEADS[(id as usize) % TITLE_HEADS.len()],
                TITLE_TAILS[(id as usize / TITLE_HEADS.len()) % TITLE_TAILS.len()],
                id,
            ),
            release_date: ts_base + self.rng.gen_range(0..86_400 * 365 * 10),
            available_online: id % 3 != 0,
            word_count: self.rng.gen_range(20_000..200_000),
            genres: (0..genre_count)
                .map(|g| GENRES[(id as usize + g) % GENRES.len()].to_string())
                .collect(),
            formats: (0..format_count)
                .map(|f| FORMATS[(id as usize + f) % FORMATS.len()].to_string())
                .collect(),
            description: format!("Catalog entry {:06}", id),
            author_ids,
        }
    }
}

fn author(i: u64) -> Author {
    let first = FIRST_NAMES[(i as usize) % FIRST_NAMES.len()];
    let last = LAST_NAMES[(i as usize / FIRST_NAMES.len() + i as usize) % LAST_NAMES.len()];
    Author {
        id: i + 1,
        first_name: first.to_string(),
        last_name: last.to_string(),
        pen_name: format!(
            "{} {}",
            FIRST_NAMES[(i as usize + 7) % FIRST_NAMES.len()],
            LAST_NAMES[(i as usize + 3) % LAST_NAMES.len()],
        ),
        email: format!(
            "{}.{}.{}@inkwell.example",
            first.to_lowercase(),
            last.to_lowercase(),
            i + 1,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(scale: usize) -> (Vec<Author>, Vec<Book>) {
        let mut gen = DataGen::new(DEFAULT_SEED);
        let authors = gen.gen_authors(author_count(scale));
        let books = gen.gen_books(scale, &authors);
        (authors, books)
    }

    #[test]
    fn author_count_floors_at_ten() {
        assert_eq!(author_count(10), 10);
        assert_eq!(author_count(100), 10);
        assert_eq!(author_count(1_000), 100);
        assert_eq!(author_count(100_000), 10_000);
    }

    #[test]
    fn counts_match_scale() {
        for scale in [100, 1_000, 5_000] {
            let (authors, books) = dataset(scale);
            assert_eq!(authors.len(), author_count(scale));
            assert_eq!(books.len(), scale);
        }
    }

    #[test]
    fn every_even_book_references_only_the_popular_author() {
        let (authors, books) = dataset(1_000);
        let popular = authors[0].id;
        for (i, book) in books.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(book.author_ids, vec![popular], "book index {}", i);
            }
        }
    }

    #[test]
    fn rare_author_is_referenced_exactly_once() {
        let (authors, books) = dataset(1_000);
        let rare = authors[authors.len() - 1].id;
        let refs = books
            .iter()
            .filter(|b| b.author_ids.contains(&rare))
            .count();
        assert_eq!(refs, 1);
    }

    #[test]
    fn every_book_has_one_to_three_authors() {
        let (_, books) = dataset(1_000);
        for book in &books {
            assert!(!book.author_ids.is_empty());
            assert!(book.author_ids.len() <= 3);
        }
    }

    #[test]
    fn every_author_appears_in_some_book() {
        let (authors, books) = dataset(100);
        for author in &authors {
            assert!(
                books.iter().any(|b| b.author_ids.contains(&author.id)),
                "author {} never referenced",
                author.id
            );
        }
    }

    #[test]
    fn same_seed_reproduces_the_dataset() {
        let (a1, b1) = dataset(500);
        let (a2, b2) = dataset(500);
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }
}
