//! Wire-facing request and response shapes of the user API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppResult;

/// User part of a user-with-books request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    /// Required on update, ignored on create
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "Full name must not be empty"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(range(min = 0, message = "Age must not be negative"))]
    pub age: i32,
}

/// Book part of a user-with-books request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    /// Existing book to update in place; absent creates a new book
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(range(min = 0, message = "Page count must not be negative"))]
    pub page_count: i64,
}

/// Create or update a user together with their books
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBookRequest {
    pub user: UserRequest,
    /// Null entries are skipped
    #[serde(default)]
    pub books: Vec<Option<BookRequest>>,
}

impl UserBookRequest {
    /// Validate the user and every non-null book
    pub fn validate_all(&self) -> AppResult<()> {
        self.user.validate()?;
        for book in self.books.iter().flatten() {
            book.validate()?;
        }
        Ok(())
    }
}

/// A user id with the ids of the books they own
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBookResponse {
    pub user_id: i64,
    pub book_ids: Vec<i64>,
}
