use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Book, NewBook};
use crate::repo::BookRepo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("the book store lock was poisoned by a panicking request")]
    Poisoned,
}

/// Books held in process memory, in insertion order. Clones share the same
/// underlying collection.
#[derive(Clone, Default)]
pub struct InMemoryBookRepo {
    books: Arc<Mutex<Vec<Book>>>,
}

impl InMemoryBookRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn books(&self) -> Result<MutexGuard<'_, Vec<Book>>, StoreError> {
        self.books.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl BookRepo for InMemoryBookRepo {
    type Error = StoreError;

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books()?.clone())
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let books = self.books()?;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn insert_book(&self, book: Book) -> Result<(), StoreError> {
        self.books()?.push(book);
        Ok(())
    }

    async fn update_book(
        &self,
        id: &str,
        update: NewBook,
        now: DateTime<Utc>,
    ) -> Result<Option<Book>, StoreError> {
        let mut books = self.books()?;

        let updated_book = books.iter_mut().find(|book| book.id == id).map(|book| {
            book.apply_update(update, now);
            book.clone()
        });

        Ok(updated_book)
    }

    async fn delete_book(&self, id: &str) -> Result<bool, StoreError> {
        let mut books = self.books()?;

        match books.iter().position(|book| book.id == id) {
            Some(index) => {
                books.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
