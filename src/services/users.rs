//! User aggregate service

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    mapper::{person_to_user_dto, user_id_to_person, PersonLookup},
    models::person::{NewPerson, Person, UserDto},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Insert a new person; any id on the input is ignored
    pub async fn create_user(&self, user: UserDto) -> AppResult<UserDto> {
        let person = NewPerson::from(&user);
        tracing::info!("Mapped user: {:?}", person);
        let saved = self.repository.persons.insert(&person).await?;
        tracing::info!("Saved user: {:?}", saved);
        Ok(person_to_user_dto(saved, Vec::new()))
    }

    /// Overwrite name, title and age of an existing person.
    ///
    /// Every book attached to `user.books` must carry a resolvable owner.
    /// The returned book set is read back from storage, not copied from the
    /// input.
    pub async fn update_user(&self, user: UserDto) -> AppResult<UserDto> {
        let mut person = self.get_person_by_id(user.id).await?;
        tracing::info!("User from DB: {:?}", person);

        person.full_name = user.full_name;
        person.title = user.title;
        person.age = user.age;

        for book in &user.books {
            user_id_to_person(book.user_id, self).await?;
        }

        let saved = self.repository.persons.update(&person).await?;
        let books = self.repository.persons.books_of(saved.id).await?;
        tracing::info!("Updated user: {:?} with {} books", saved, books.len());
        Ok(person_to_user_dto(saved, books))
    }

    /// Get a user with the books they currently own
    pub async fn get_user_by_id(&self, id: Option<i64>) -> AppResult<UserDto> {
        let person = self.get_person_by_id(id).await?;
        let books = self.repository.persons.books_of(person.id).await?;
        Ok(person_to_user_dto(person, books))
    }

    /// Get the stored person row
    pub async fn get_person_by_id(&self, id: Option<i64>) -> AppResult<Person> {
        let id = id.ok_or_else(|| AppError::person_not_found(None))?;
        let person = self
            .repository
            .persons
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::person_not_found(Some(id)))?;
        tracing::debug!("(Service)Received person: {:?}", person);
        Ok(person)
    }

    pub async fn delete_user_by_id(&self, id: Option<i64>) -> AppResult<()> {
        let id = id.ok_or_else(|| AppError::person_not_found(None))?;
        self.repository.persons.delete_by_id(id).await?;
        tracing::info!("(Service)Removed person with id: {}", id);
        Ok(())
    }
}

#[async_trait]
impl PersonLookup for UsersService {
    async fn get_person_by_id(&self, id: Option<i64>) -> AppResult<Person> {
        UsersService::get_person_by_id(self, id).await
    }
}
