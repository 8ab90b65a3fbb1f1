//! Data models for Bookshelf

pub mod book;
pub mod person;
pub mod request;

// Re-export commonly used types
pub use book::{Book, BookDto, NewBook};
pub use person::{NewPerson, Person, UserDto};
pub use request::{BookRequest, UserBookRequest, UserBookResponse, UserRequest};
