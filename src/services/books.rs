//! Book aggregate service

use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    mapper::{book_dto_to_new_book, user_id_to_person},
    models::book::{Book, BookDto},
    repository::Repository,
    services::users::UsersService,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    users: UsersService,
}

impl BooksService {
    pub fn new(repository: Repository, users: UsersService) -> Self {
        Self { repository, users }
    }

    /// Insert a book owned by `book.user_id`, which must resolve to a person
    pub async fn create_book(&self, book: BookDto) -> AppResult<BookDto> {
        let owner = user_id_to_person(book.user_id, &self.users).await?;
        let new_book = book_dto_to_new_book(&book, &owner);
        tracing::info!("Mapped book: {:?}", new_book);
        let saved = self.repository.books.insert(&new_book).await?;
        tracing::info!("Saved book: {:?}", saved);
        Ok(BookDto::from(saved))
    }

    /// Overwrite an existing book, re-resolving its owner
    pub async fn update_book(&self, book: BookDto) -> AppResult<BookDto> {
        let stored = self.find_book(book.id).await?;
        tracing::info!("Book from DB: {:?}", stored);

        let owner = user_id_to_person(book.user_id, &self.users).await?;
        let changed = Book {
            id: stored.id,
            title: book.title,
            author: book.author,
            page_count: book.page_count,
            person_id: owner.id,
        };
        let updated = self.repository.books.update(&changed).await?;
        tracing::info!("Updated book: {:?}", updated);
        Ok(BookDto::from(updated))
    }

    pub async fn get_book_by_id(&self, id: Option<i64>) -> AppResult<BookDto> {
        let book = self.find_book(id).await?;
        tracing::debug!("(Service)Received book: {:?}", book);
        Ok(BookDto::from(book))
    }

    /// All books owned by a user; empty when they own none
    pub async fn get_all_books_by_user_id(&self, user_id: i64) -> AppResult<BTreeSet<BookDto>> {
        let books = self.repository.books.find_all_by_person_id(user_id).await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    /// Bulk lookup; ids without a book are left out of the result
    pub async fn get_all_books_by_id_set(&self, ids: &BTreeSet<i64>) -> AppResult<BTreeSet<BookDto>> {
        if ids.is_empty() {
            return Ok(BTreeSet::new());
        }
        let ids: Vec<i64> = ids.iter().copied().collect();
        let books = self.repository.books.find_all_by_ids(&ids).await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    pub async fn delete_book_by_id(&self, id: Option<i64>) -> AppResult<()> {
        let id = id.ok_or_else(|| AppError::book_not_found(None))?;
        self.repository.books.delete_by_id(id).await?;
        tracing::info!("(Service)Removed book with id: {}", id);
        Ok(())
    }

    async fn find_book(&self, id: Option<i64>) -> AppResult<Book> {
        let id = id.ok_or_else(|| AppError::book_not_found(None))?;
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::book_not_found(Some(id)))
    }
}
