//! Statement storage adapter
//!
//! Issues one parameterized statement per operation and decodes rows by
//! column name. Ids are pulled from the global sequence before the insert.
//! Owner references are not looked up: a missing owner is rejected by the
//! foreign key and surfaces as a constraint violation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use super::{BookRepository, PersonRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, NewBook},
        person::{NewPerson, Person},
    },
};

const SELECT_BOOK_COLUMNS: &str = "SELECT id, title, author, page_count, person_id FROM book";

#[derive(Clone)]
pub struct StatementRepository {
    pool: Pool<Postgres>,
}

impl StatementRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn next_id(&self) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar("SELECT nextval('id_sequence')")
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }
}

fn person_from_row(row: &PgRow) -> AppResult<Person> {
    Ok(Person {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        title: row.try_get("title")?,
        age: row.try_get("age")?,
    })
}

fn book_from_row(row: &PgRow) -> AppResult<Book> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        page_count: row.try_get("page_count")?,
        person_id: row.try_get("person_id")?,
    })
}

#[async_trait]
impl PersonRepository for StatementRepository {
    async fn insert(&self, person: &NewPerson) -> AppResult<Person> {
        let id = self.next_id().await?;
        sqlx::query("INSERT INTO person (id, full_name, title, age) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(&person.full_name)
            .bind(&person.title)
            .bind(person.age)
            .execute(&self.pool)
            .await?;

        Ok(Person {
            id,
            full_name: person.full_name.clone(),
            title: person.title.clone(),
            age: person.age,
        })
    }

    async fn update(&self, person: &Person) -> AppResult<Person> {
        let result = sqlx::query("UPDATE person SET full_name = $1, title = $2, age = $3 WHERE id = $4")
            .bind(&person.full_name)
            .bind(&person.title)
            .bind(person.age)
            .bind(person.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::person_not_found(Some(person.id)));
        }
        tracing::debug!("Updated {} rows in person", result.rows_affected());
        Ok(person.clone())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Person>> {
        let row = sqlx::query("SELECT id, full_name, title, age FROM person WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn books_of(&self, person_id: i64) -> AppResult<Vec<Book>> {
        let query = format!("{} WHERE person_id = $1 ORDER BY id", SELECT_BOOK_COLUMNS);
        let rows = sqlx::query(&query)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(book_from_row).collect()
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM person WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!("Removed {} rows from person", result.rows_affected());
        if result.rows_affected() == 0 {
            return Err(AppError::person_not_found(Some(id)));
        }
        Ok(())
    }
}

#[async_trait]
impl BookRepository for StatementRepository {
    async fn insert(&self, book: &NewBook) -> AppResult<Book> {
        let id = self.next_id().await?;
        sqlx::query("INSERT INTO book (id, title, author, page_count, person_id) VALUES ($1, $2, $3, $4, $5)")
            .bind(id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.page_count)
            .bind(book.person_id)
            .execute(&self.pool)
            .await?;

        Ok(Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            page_count: book.page_count,
            person_id: book.person_id,
        })
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let result = sqlx::query(
            "UPDATE book SET title = $1, author = $2, page_count = $3, person_id = $4 WHERE id = $5",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.page_count)
        .bind(book.person_id)
        .bind(book.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found(Some(book.id)));
        }
        Ok(book.clone())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let query = format!("{} WHERE id = $1", SELECT_BOOK_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(book_from_row).transpose()
    }

    async fn find_all_by_person_id(&self, person_id: i64) -> AppResult<Vec<Book>> {
        self.books_of(person_id).await
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("{} WHERE id = ANY($1) ORDER BY id", SELECT_BOOK_COLUMNS);
        let rows = sqlx::query(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(book_from_row).collect()
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!("Removed {} rows from book", result.rows_affected());
        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found(Some(id)));
        }
        Ok(())
    }
}
