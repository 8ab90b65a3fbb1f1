//! Repository layer: the storage port and its adapters
//!
//! Services only ever talk to [`PersonRepository`] and [`BookRepository`].
//! Three adapters implement both traits:
//! - [`mapped::MappedRepository`]: typed row mapping, every write runs in a
//!   transaction and owner references are checked as lookups
//! - [`statement::StatementRepository`]: raw parameterized statements, ids
//!   pulled from the global sequence, owner references left to the foreign key
//! - [`memory::MemoryRepository`]: process-local tables

pub mod mapped;
pub mod memory;
pub mod statement;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    config::StorageStrategy,
    error::AppResult,
    models::{
        book::{Book, NewBook},
        person::{NewPerson, Person},
    },
};

/// Persistence port for persons
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Insert a person and return it with its generated id
    async fn insert(&self, person: &NewPerson) -> AppResult<Person>;

    /// Overwrite name, title and age of an existing person (NotFound if absent)
    async fn update(&self, person: &Person) -> AppResult<Person>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Person>>;

    /// Books whose owner is this person, ordered by id
    async fn books_of(&self, person_id: i64) -> AppResult<Vec<Book>>;

    /// Delete by id (NotFound if no row matched)
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;
}

/// Persistence port for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book and return it with its generated id
    async fn insert(&self, book: &NewBook) -> AppResult<Book>;

    /// Overwrite every column of an existing book (NotFound if absent)
    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>>;

    async fn find_all_by_person_id(&self, person_id: i64) -> AppResult<Vec<Book>>;

    /// Books matching any of `ids`, ordered by id; unknown ids are skipped
    async fn find_all_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Book>>;

    /// Delete by id (NotFound if no row matched)
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;
}

/// Main repository struct holding the storage ports
#[derive(Clone)]
pub struct Repository {
    pub pool: Option<Pool<Postgres>>,
    pub persons: Arc<dyn PersonRepository>,
    pub books: Arc<dyn BookRepository>,
}

impl Repository {
    /// Create a repository backed by the given strategy.
    ///
    /// The SQL strategies need a pool; the memory strategy ignores it.
    pub fn new(pool: Option<Pool<Postgres>>, strategy: StorageStrategy) -> Self {
        match (strategy, pool) {
            (StorageStrategy::Mapped, Some(pool)) => Self::mapped(pool),
            (StorageStrategy::Statement, Some(pool)) => Self::statement(pool),
            (StorageStrategy::Memory, _) | (_, None) => Self::in_memory(),
        }
    }

    pub fn mapped(pool: Pool<Postgres>) -> Self {
        let adapter = Arc::new(mapped::MappedRepository::new(pool.clone()));
        Self {
            pool: Some(pool),
            persons: adapter.clone(),
            books: adapter,
        }
    }

    pub fn statement(pool: Pool<Postgres>) -> Self {
        let adapter = Arc::new(statement::StatementRepository::new(pool.clone()));
        Self {
            pool: Some(pool),
            persons: adapter.clone(),
            books: adapter,
        }
    }

    pub fn in_memory() -> Self {
        let adapter = Arc::new(memory::MemoryRepository::new());
        Self {
            pool: None,
            persons: adapter.clone(),
            books: adapter,
        }
    }

    /// Assemble a repository from arbitrary port implementations
    pub fn from_ports(persons: Arc<dyn PersonRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self {
            pool: None,
            persons,
            books,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
