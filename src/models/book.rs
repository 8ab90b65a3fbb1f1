//! Book model and its transfer representation

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Book row as persisted in the `book` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub page_count: i64,
    /// Owning person, always required
    pub person_id: i64,
}

/// Book fields before the store has assigned an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub page_count: i64,
    pub person_id: i64,
}

/// Transfer representation of a book.
///
/// Field order matters: sets of books order by id first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub title: String,
    pub author: String,
    pub page_count: i64,
}
