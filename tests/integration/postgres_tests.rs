//! Storage contract tests against a live PostgreSQL
//!
//! Both SQL adapters must behave the same behind the services.
//! Run with: DATABASE_URL=... cargo test --test postgres_tests -- --ignored

use std::collections::BTreeSet;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use bookshelf_server::{
    models::{BookDto, BookRequest, UserBookRequest, UserDto, UserRequest},
    repository::Repository,
    services::Services,
    AppError,
};

async fn pool() -> Pool<Postgres> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    pool
}

async fn both_strategies() -> Vec<(&'static str, Services)> {
    let pool = pool().await;
    vec![
        ("mapped", Services::new(Repository::mapped(pool.clone()))),
        ("statement", Services::new(Repository::statement(pool))),
    ]
}

fn request(id: Option<i64>, books: Vec<Option<BookRequest>>) -> UserBookRequest {
    UserBookRequest {
        user: UserRequest {
            id,
            full_name: "A".to_string(),
            title: "T".to_string(),
            age: 30,
        },
        books,
    }
}

fn book(title: &str, author: &str, page_count: i64) -> Option<BookRequest> {
    Some(BookRequest {
        id: None,
        title: title.to_string(),
        author: author.to_string(),
        page_count,
    })
}

#[tokio::test]
#[ignore]
async fn test_workflows_on_both_strategies() {
    for (name, services) in both_strategies().await {
        let created = services
            .user_data
            .create_user_with_books(request(None, vec![book("B1", "X", 100), book("B2", "Y", 200)]))
            .await
            .unwrap_or_else(|e| panic!("{}: create failed: {}", name, e));
        assert_eq!(created.book_ids.len(), 2, "{}", name);

        let fetched = services.user_data.get_user_with_books(created.user_id).await.unwrap();
        assert_eq!(fetched, created, "{}", name);

        let updated = services
            .user_data
            .update_user_with_books(request(Some(created.user_id), vec![book("B3", "Z", 300)]))
            .await
            .unwrap();
        assert_eq!(updated.book_ids.len(), 1, "{}", name);
        for old_id in &created.book_ids {
            let err = services.books.get_book_by_id(Some(*old_id)).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)), "{}", name);
        }

        services.user_data.delete_user_with_books(created.user_id).await.unwrap();
        assert!(services.books.get_all_books_by_user_id(created.user_id).await.unwrap().is_empty());
        let err = services.users.get_user_by_id(Some(created.user_id)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", name);
    }
}

#[tokio::test]
#[ignore]
async fn test_generated_ids_are_fresh() {
    let mut seen = BTreeSet::new();
    for (name, services) in both_strategies().await {
        for _ in 0..3 {
            let user = services
                .users
                .create_user(UserDto {
                    full_name: "A".to_string(),
                    title: "T".to_string(),
                    age: 1,
                    ..Default::default()
                })
                .await
                .unwrap();
            let id = user.id.expect("generated id");
            assert!(seen.insert(id), "{}: id {} reused", name, id);
            services.users.delete_user_by_id(Some(id)).await.unwrap();
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_bulk_fetch_and_missing_rows() {
    for (name, services) in both_strategies().await {
        let created = services
            .user_data
            .create_user_with_books(request(None, vec![book("B1", "X", 100)]))
            .await
            .unwrap();
        let existing = created.book_ids[0];

        let found = services
            .books
            .get_all_books_by_id_set(&BTreeSet::from([existing, -1]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "{}", name);

        let err = services.books.delete_book_by_id(Some(-1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", name);

        let err = services
            .books
            .create_book(BookDto {
                user_id: Some(-1),
                title: "B".to_string(),
                author: "X".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", name);

        services.user_data.delete_user_with_books(created.user_id).await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_store_rejects_orphan_book_rows() {
    use bookshelf_server::models::NewBook;

    let pool = pool().await;
    let orphan = NewBook {
        title: "B".to_string(),
        author: "X".to_string(),
        page_count: 1,
        person_id: -1,
    };

    // The mapped adapter checks the owner as a lookup
    let mapped = Repository::mapped(pool.clone());
    let err = mapped.books.insert(&orphan).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // The statement adapter leaves it to the foreign key
    let statement = Repository::statement(pool);
    let err = statement.books.insert(&orphan).await.unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
}
