use crate::models::NewBook;
use thiserror::Error;

/// A rule broken by an incoming payload. The `Display` text is the reason
/// shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Please provide the book name")]
    MissingName,
    #[error("Please provide the publication year")]
    MissingYear,
    #[error("Please provide the author name")]
    MissingAuthor,
    #[error("Please provide the publisher name")]
    MissingPublisher,
    #[error("pageCount and readPage must be greater than 0")]
    NonPositivePages,
    #[error("readPage must not be greater than pageCount")]
    ReadExceedsPageCount,
}

/// Checks a create payload.
///
/// All rules are evaluated and the last one that fails is reported, so a
/// payload with no name but `readPage > pageCount` reports the page error.
pub fn validate_new_book(book: &NewBook) -> Result<(), Violation> {
    let mut violation = None;

    if book.name.is_none() {
        violation = Some(Violation::MissingName);
    }
    if book.year.is_none() {
        violation = Some(Violation::MissingYear);
    }
    if book.author.is_none() {
        violation = Some(Violation::MissingAuthor);
    }
    if book.publisher.is_none() {
        violation = Some(Violation::MissingPublisher);
    }
    // A zero-page book is rejected as well
    if !is_positive(book.page_count) || !is_positive(book.read_page) {
        violation = Some(Violation::NonPositivePages);
    }
    if read_exceeds_page_count(book) {
        violation = Some(Violation::ReadExceedsPageCount);
    }

    violation.map_or(Ok(()), Err)
}

/// Checks an update payload. Only the name and the page relation are
/// enforced; everything else is replaced as given.
pub fn validate_book_update(book: &NewBook) -> Result<(), Violation> {
    let mut violation = None;

    if book.name.is_none() {
        violation = Some(Violation::MissingName);
    }
    if read_exceeds_page_count(book) {
        violation = Some(Violation::ReadExceedsPageCount);
    }

    violation.map_or(Ok(()), Err)
}

fn is_positive(pages: Option<u32>) -> bool {
    pages.is_some_and(|pages| pages > 0)
}

// Absent counts are stored as 0, so compare them as 0 here too
fn read_exceeds_page_count(book: &NewBook) -> bool {
    book.read_page.unwrap_or_default() > book.page_count.unwrap_or_default()
}
