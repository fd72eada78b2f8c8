use chrono::{DateTime, SecondsFormat, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize, Serializer};

const BOOK_ID_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
    pub finished: bool,
    #[serde(serialize_with = "iso_8601")]
    pub inserted_at: DateTime<Utc>,
    #[serde(serialize_with = "iso_8601")]
    pub updated_at: DateTime<Utc>,
}

/// Request payload for both create and update. Every field is optional so
/// that the validation rules can tell a missing field from a present one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    pub reading: Option<bool>,
}

/// The projection returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListing {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

/// Query parameters accepted by the list endpoint. The flags are kept as raw
/// strings so that any value can be interpreted (see [`parse_flag`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    pub name: Option<String>,
    pub reading: Option<String>,
    pub finished: Option<String>,
}

impl BookQuery {
    /// Selects the matching books from `books`.
    ///
    /// Filters do not combine. Each supplied filter, in the order name,
    /// reading, finished, is applied to the whole collection and replaces
    /// the previous result, so only the last supplied one has an effect.
    pub fn apply<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        let mut results: Vec<&Book> = books.iter().collect();

        if let Some(name) = &self.name {
            let needle = name.to_lowercase();
            results = books
                .iter()
                .filter(|book| book.name.to_lowercase().contains(&needle))
                .collect();
        }

        if let Some(reading) = &self.reading {
            let reading = parse_flag(reading);
            results = books.iter().filter(|book| book.reading == reading).collect();
        }

        if let Some(finished) = &self.finished {
            let finished = parse_flag(finished);
            results = books
                .iter()
                .filter(|book| book.finished == finished)
                .collect();
        }

        results
    }
}

/// Only the empty string is false. Every other value, `0` and `false`
/// included, is true.
pub fn parse_flag(value: &str) -> bool {
    !value.is_empty()
}

impl Book {
    /// Builds a fresh record from a payload that already passed create
    /// validation.
    pub fn create(new_book: NewBook, now: DateTime<Utc>) -> Self {
        let page_count = new_book.page_count.unwrap_or_default();
        let read_page = new_book.read_page.unwrap_or_default();

        Book {
            id: generate_book_id(),
            name: new_book.name.unwrap_or_default(),
            year: new_book.year,
            author: new_book.author,
            summary: new_book.summary,
            publisher: new_book.publisher,
            page_count,
            read_page,
            reading: new_book.reading.unwrap_or(false),
            finished: read_page == page_count,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field. `id` and `inserted_at` are left alone.
    pub fn apply_update(&mut self, update: NewBook, now: DateTime<Utc>) {
        self.name = update.name.unwrap_or_default();
        self.year = update.year;
        self.author = update.author;
        self.summary = update.summary;
        self.publisher = update.publisher;
        self.page_count = update.page_count.unwrap_or_default();
        self.read_page = update.read_page.unwrap_or_default();
        self.reading = update.reading.unwrap_or(false);
        self.finished = self.read_page == self.page_count;
        self.updated_at = now;
    }

    pub fn listing(&self) -> BookListing {
        BookListing {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

fn generate_book_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOOK_ID_LENGTH)
        .map(char::from)
        .collect()
}

fn iso_8601<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
