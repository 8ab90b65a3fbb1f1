//! In-memory storage adapter
//!
//! Keeps both tables behind one lock and draws ids from one shared counter,
//! like the database sequence. The owner foreign key is enforced the same way
//! the database enforces it.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookRepository, PersonRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, NewBook},
        person::{NewPerson, Person},
    },
};

#[derive(Default)]
struct Tables {
    last_id: i64,
    persons: BTreeMap<i64, Person>,
    books: BTreeMap<i64, Book>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn check_owner(&self, person_id: i64) -> AppResult<()> {
        if !self.persons.contains_key(&person_id) {
            return Err(AppError::ConstraintViolation(format!(
                "book.person_id {} does not reference a person",
                person_id
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for MemoryRepository {
    async fn insert(&self, person: &NewPerson) -> AppResult<Person> {
        let mut tables = self.tables.write().await;
        let saved = Person {
            id: tables.next_id(),
            full_name: person.full_name.clone(),
            title: person.title.clone(),
            age: person.age,
        };
        tables.persons.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, person: &Person) -> AppResult<Person> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .persons
            .get_mut(&person.id)
            .ok_or_else(|| AppError::person_not_found(Some(person.id)))?;
        *stored = person.clone();
        Ok(person.clone())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Person>> {
        Ok(self.tables.read().await.persons.get(&id).cloned())
    }

    async fn books_of(&self, person_id: i64) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|book| book.person_id == person_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.persons.contains_key(&id) {
            return Err(AppError::person_not_found(Some(id)));
        }
        if tables.books.values().any(|book| book.person_id == id) {
            return Err(AppError::ConstraintViolation(format!(
                "person {} is still referenced by book.person_id",
                id
            )));
        }
        tables.persons.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MemoryRepository {
    async fn insert(&self, book: &NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        tables.check_owner(book.person_id)?;
        let saved = Book {
            id: tables.next_id(),
            title: book.title.clone(),
            author: book.author.clone(),
            page_count: book.page_count,
            person_id: book.person_id,
        };
        tables.books.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&book.id) {
            return Err(AppError::book_not_found(Some(book.id)));
        }
        tables.check_owner(book.person_id)?;
        tables.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn find_all_by_person_id(&self, person_id: i64) -> AppResult<Vec<Book>> {
        self.books_of(person_id).await
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|book| ids.contains(&book.id))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::book_not_found(Some(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_person() -> NewPerson {
        NewPerson {
            full_name: "test name".to_string(),
            title: "test title".to_string(),
            age: 11,
        }
    }

    fn new_book(person_id: i64, title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "test author".to_string(),
            page_count: 1000,
            person_id,
        }
    }

    #[tokio::test]
    async fn test_ids_come_from_one_sequence() {
        let repo = MemoryRepository::new();
        let person = PersonRepository::insert(&repo, &new_person()).await.unwrap();
        let book = BookRepository::insert(&repo, &new_book(person.id, "B1")).await.unwrap();
        let other = PersonRepository::insert(&repo, &new_person()).await.unwrap();
        assert_eq!((person.id, book.id, other.id), (1, 2, 3));
    }

    #[tokio::test]
    async fn test_book_without_owner_violates_constraint() {
        let repo = MemoryRepository::new();
        let err = BookRepository::insert(&repo, &new_book(42, "B1")).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert!(repo.find_all_by_ids(&[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_person_with_books_cannot_be_deleted() {
        let repo = MemoryRepository::new();
        let person = PersonRepository::insert(&repo, &new_person()).await.unwrap();
        BookRepository::insert(&repo, &new_book(person.id, "B1")).await.unwrap();
        let err = PersonRepository::delete_by_id(&repo, person.id).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_rows_is_not_found() {
        let repo = MemoryRepository::new();
        let err = PersonRepository::delete_by_id(&repo, 9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = BookRepository::delete_by_id(&repo, 9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_books_of_follows_owner_column() {
        let repo = MemoryRepository::new();
        let first = PersonRepository::insert(&repo, &new_person()).await.unwrap();
        let second = PersonRepository::insert(&repo, &new_person()).await.unwrap();
        let mut book = BookRepository::insert(&repo, &new_book(first.id, "B1")).await.unwrap();

        book.person_id = second.id;
        BookRepository::update(&repo, &book).await.unwrap();

        assert!(repo.books_of(first.id).await.unwrap().is_empty());
        assert_eq!(repo.books_of(second.id).await.unwrap(), vec![book]);
    }
}
