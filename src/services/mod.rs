//! Business logic services

pub mod books;
pub mod user_data;
pub mod users;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub user_data: user_data::UserDataFacade,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        let users = users::UsersService::new(repository.clone());
        let books = books::BooksService::new(repository.clone(), users.clone());
        let user_data = user_data::UserDataFacade::new(users.clone(), books.clone());
        Self {
            users,
            books,
            user_data,
            repository,
        }
    }

    /// Check that storage is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
