//! Conversions between request shapes, transfer representations and rows
//!
//! The owner lookup hook lives here too: a book never reaches storage
//! without its owner having been resolved through [`user_id_to_person`].

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookDto, NewBook},
        person::{NewPerson, Person, UserDto},
        request::{BookRequest, UserRequest},
    },
};

/// Resolves a person id to the stored person
#[async_trait]
pub trait PersonLookup: Send + Sync {
    async fn get_person_by_id(&self, id: Option<i64>) -> AppResult<Person>;
}

/// Resolve the owner of a book, failing with NotFound on a null or unknown id
pub async fn user_id_to_person(user_id: Option<i64>, lookup: &dyn PersonLookup) -> AppResult<Person> {
    if user_id.is_none() {
        return Err(AppError::NotFound("Null given personId".to_string()));
    }
    lookup.get_person_by_id(user_id).await
}

impl From<UserRequest> for UserDto {
    fn from(request: UserRequest) -> Self {
        Self {
            id: request.id,
            full_name: request.full_name,
            title: request.title,
            age: request.age,
            books: Default::default(),
        }
    }
}

impl From<BookRequest> for BookDto {
    fn from(request: BookRequest) -> Self {
        Self {
            id: request.id,
            user_id: None,
            title: request.title,
            author: request.author,
            page_count: request.page_count,
        }
    }
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: Some(book.id),
            user_id: Some(book.person_id),
            title: book.title,
            author: book.author,
            page_count: book.page_count,
        }
    }
}

impl From<&UserDto> for NewPerson {
    fn from(dto: &UserDto) -> Self {
        Self {
            full_name: dto.full_name.clone(),
            title: dto.title.clone(),
            age: dto.age,
        }
    }
}

/// Build the transfer representation of a person from its row and owned books
pub fn person_to_user_dto(person: Person, books: Vec<Book>) -> UserDto {
    UserDto {
        id: Some(person.id),
        full_name: person.full_name,
        title: person.title,
        age: person.age,
        books: books.into_iter().map(BookDto::from).collect(),
    }
}

/// Build an insertable book owned by an already resolved person
pub fn book_dto_to_new_book(dto: &BookDto, owner: &Person) -> NewBook {
    NewBook {
        title: dto.title.clone(),
        author: dto.author.clone(),
        page_count: dto.page_count,
        person_id: owner.id,
    }
}
