//! User-with-books workflows
//!
//! The only place where users and books are written as one logical
//! operation. Each workflow stops at the first failure; steps that already
//! succeeded stay committed.

use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookDto,
        person::UserDto,
        request::{UserBookRequest, UserBookResponse},
    },
    services::{books::BooksService, users::UsersService},
};

#[derive(Clone)]
pub struct UserDataFacade {
    users: UsersService,
    books: BooksService,
}

impl UserDataFacade {
    pub fn new(users: UsersService, books: BooksService) -> Self {
        Self { users, books }
    }

    /// Create a user, then their books, then patch the user with the books
    pub async fn create_user_with_books(&self, request: UserBookRequest) -> AppResult<UserBookResponse> {
        tracing::info!("Got user book create request: {:?}", request);
        let user = UserDto::from(request.user);
        tracing::info!("Mapped user request: {:?}", user);

        let created_user = self.users.create_user(user).await?;
        tracing::info!("Created user: {:?}", created_user);
        let user_id = generated_id(created_user.id, "user")?;

        let mut book_ids = Vec::with_capacity(request.books.len());
        for book_request in request.books.into_iter().flatten() {
            let mut book = BookDto::from(book_request);
            book.user_id = Some(user_id);
            tracing::info!("Mapped book: {:?}", book);
            let created_book = self.books.create_book(book).await?;
            tracing::info!("Created book: {:?}", created_book);
            book_ids.push(generated_id(created_book.id, "book")?);
        }
        tracing::info!("Collected book ids: {:?}", book_ids);

        let updated_user = self.attach_books(created_user, &book_ids).await?;
        tracing::info!("Updated user: {:?}", updated_user);

        Ok(UserBookResponse { user_id, book_ids })
    }

    /// Overwrite a user and replace all of their books.
    ///
    /// Books the user owned before the call are deleted first. Incoming books
    /// without an id are created; those with an id are updated in place and
    /// re-owned by this user.
    pub async fn update_user_with_books(&self, request: UserBookRequest) -> AppResult<UserBookResponse> {
        tracing::info!("Got user book update request: {:?}", request);
        let user = UserDto::from(request.user);
        tracing::info!("Mapped user request: {:?}", user);

        let updated_user = self.users.update_user(user).await?;
        tracing::info!("Updated user: {:?}", updated_user);
        let user_id = generated_id(updated_user.id, "user")?;

        for book in self.books.get_all_books_by_user_id(user_id).await? {
            self.books.delete_book_by_id(book.id).await?;
        }

        let mut book_ids = Vec::with_capacity(request.books.len());
        for book_request in request.books.into_iter().flatten() {
            let mut book = BookDto::from(book_request);
            book.user_id = Some(user_id);
            tracing::info!("Mapped book: {:?}", book);
            let saved_book = if book.id.is_none() {
                let created = self.books.create_book(book).await?;
                tracing::info!("Created book: {:?}", created);
                created
            } else {
                let updated = self.books.update_book(book).await?;
                tracing::info!("Updated book: {:?}", updated);
                updated
            };
            book_ids.push(generated_id(saved_book.id, "book")?);
        }
        tracing::info!("Collected book ids: {:?}", book_ids);

        let updated_user = self.attach_books(updated_user, &book_ids).await?;
        tracing::info!("Updated user: {:?}", updated_user);

        Ok(UserBookResponse { user_id, book_ids })
    }

    pub async fn get_user_with_books(&self, user_id: i64) -> AppResult<UserBookResponse> {
        tracing::info!("Got user with books get request by id: {}", user_id);
        let user = self.users.get_user_by_id(Some(user_id)).await?;
        tracing::info!("Received user: {:?}", user);

        Ok(UserBookResponse {
            user_id: generated_id(user.id, "user")?,
            book_ids: user.book_ids(),
        })
    }

    /// Delete every book of the user, then the user
    pub async fn delete_user_with_books(&self, user_id: i64) -> AppResult<()> {
        tracing::info!("Got delete user with books request by id: {}", user_id);
        for book in self.books.get_all_books_by_user_id(user_id).await? {
            self.books.delete_book_by_id(book.id).await?;
        }
        self.users.delete_user_by_id(Some(user_id)).await
    }

    /// Second write of the two-phase create/update: fetch the saved books by
    /// id and persist the user with them attached.
    async fn attach_books(&self, mut user: UserDto, book_ids: &[i64]) -> AppResult<UserDto> {
        let id_set: BTreeSet<i64> = book_ids.iter().copied().collect();
        user.books = self.books.get_all_books_by_id_set(&id_set).await?;
        self.users.update_user(user).await
    }
}

fn generated_id(id: Option<i64>, entity: &str) -> AppResult<i64> {
    id.ok_or_else(|| AppError::Internal(format!("Stored {} came back without an id", entity)))
}
