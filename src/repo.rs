use crate::models::{Book, NewBook};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::future::Future;

pub trait BookRepo {
    type Error: Error + Send + Sync + 'static;

    /// All books, in insertion order
    fn list_books(&self) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send;

    fn get_book(&self, id: &str) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send;

    fn insert_book(&self, book: Book) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Replaces the mutable fields of the book with the given ID.
    /// Returns the updated book, or None if no such book exists
    fn update_book(
        &self,
        id: &str,
        update: NewBook,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send;

    /// Returns true if the book existed and was deleted, false otherwise
    fn delete_book(&self, id: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
