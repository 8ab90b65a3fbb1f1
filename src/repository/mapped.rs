//! Mapped storage adapter
//!
//! Rows are decoded straight into models through `FromRow`, and every write
//! runs inside its own transaction. Owner references are locked and checked
//! before a book is written, so a missing owner is a lookup failure here.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use super::{BookRepository, PersonRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, NewBook},
        person::{NewPerson, Person},
    },
};

#[derive(Clone)]
pub struct MappedRepository {
    pool: Pool<Postgres>,
}

impl MappedRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Lock the owner row for the rest of the transaction
    async fn lock_owner(tx: &mut Transaction<'_, Postgres>, person_id: i64) -> AppResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM person WHERE id = $1 FOR KEY SHARE")
            .bind(person_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::person_not_found(Some(person_id)))?;
        Ok(())
    }
}

#[async_trait]
impl PersonRepository for MappedRepository {
    async fn insert(&self, person: &NewPerson) -> AppResult<Person> {
        let mut tx = self.pool.begin().await?;
        let saved = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO person (full_name, title, age)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, title, age
            "#,
        )
        .bind(&person.full_name)
        .bind(&person.title)
        .bind(person.age)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn update(&self, person: &Person) -> AppResult<Person> {
        let mut tx = self.pool.begin().await?;
        let saved = sqlx::query_as::<_, Person>(
            r#"
            UPDATE person SET full_name = $1, title = $2, age = $3
            WHERE id = $4
            RETURNING id, full_name, title, age
            "#,
        )
        .bind(&person.full_name)
        .bind(&person.title)
        .bind(person.age)
        .bind(person.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::person_not_found(Some(person.id)))?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, full_name, title, age FROM person WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }

    async fn books_of(&self, person_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.page_count, b.person_id
            FROM person p
            JOIN book b ON b.person_id = p.id
            WHERE p.id = $1
            ORDER BY b.id
            "#,
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM person WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::person_not_found(Some(id)));
        }
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MappedRepository {
    async fn insert(&self, book: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        Self::lock_owner(&mut tx, book.person_id).await?;
        let saved = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO book (title, author, page_count, person_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, page_count, person_id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.page_count)
        .bind(book.person_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        Self::lock_owner(&mut tx, book.person_id).await?;
        let saved = sqlx::query_as::<_, Book>(
            r#"
            UPDATE book SET title = $1, author = $2, page_count = $3, person_id = $4
            WHERE id = $5
            RETURNING id, title, author, page_count, person_id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.page_count)
        .bind(book.person_id)
        .bind(book.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::book_not_found(Some(book.id)))?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, page_count, person_id FROM book WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn find_all_by_person_id(&self, person_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, page_count, person_id FROM book WHERE person_id = $1 ORDER BY id",
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, page_count, person_id FROM book WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found(Some(id)));
        }
        Ok(())
    }
}
