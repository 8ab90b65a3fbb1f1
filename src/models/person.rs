//! Person model and its transfer representation

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::book::BookDto;

/// Person row as persisted in the `person` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Person {
    pub id: i64,
    pub full_name: String,
    pub title: String,
    pub age: i32,
}

/// Person fields before the store has assigned an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub full_name: String,
    pub title: String,
    pub age: i32,
}

/// Transfer representation of a user.
///
/// `id` is `None` until the user has been created. `books` is filled from
/// storage on read paths; on write paths it is only used to re-check owner
/// references, never to decide ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Option<i64>,
    pub full_name: String,
    pub title: String,
    pub age: i32,
    pub books: BTreeSet<BookDto>,
}

impl UserDto {
    pub fn book_ids(&self) -> Vec<i64> {
        self.books.iter().filter_map(|book| book.id).collect()
    }
}
