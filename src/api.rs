use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::error::{Action, ApiError, Envelope};
use crate::models::{Book, BookListing, BookQuery, NewBook};
use crate::repo::BookRepo;
use crate::validation::{validate_book_update, validate_new_book};

#[derive(Clone)]
struct AppState<R> {
    repo: R,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBook {
    book_id: String,
}

#[derive(Serialize)]
struct BookList {
    books: Vec<BookListing>,
}

#[derive(Serialize)]
struct SingleBook {
    book: Book,
}

type ApiResult<T> = Result<T, ApiError>;

pub fn build_app<R>(repo: R) -> Router
where
    R: BookRepo + Send + Sync + Clone + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/books", get(list_books::<R>).post(insert_book::<R>))
        .route(
            "/books/{id}",
            get(get_book::<R>)
                .put(update_book::<R>)
                .delete(delete_book::<R>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { repo })
}

async fn insert_book<R>(
    State(state): State<AppState<R>>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<CreatedBook>>)>
where
    R: BookRepo,
{
    let Json(new_book) = payload?;

    validate_new_book(&new_book).map_err(|violation| {
        warn!("Rejected new book: {}", violation);
        ApiError::Validation {
            action: Action::Add,
            violation,
        }
    })?;

    let book = Book::create(new_book, Utc::now());
    let id = book.id.clone();

    state
        .repo
        .insert_book(book)
        .await
        .map_err(ApiError::store)?;

    // The insert only counts once the book can be read back
    let stored = state.repo.get_book(&id).await.map_err(ApiError::store)?;
    if stored.is_none() {
        return Err(ApiError::InsertNotVisible);
    }

    info!("Inserted book with ID: {}", id);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(CreatedBook { book_id: id }).with_message("Book added successfully")),
    ))
}

async fn list_books<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<BookList>>>
where
    R: BookRepo,
{
    let Query(query) = query?;

    let all_books = state.repo.list_books().await.map_err(ApiError::store)?;
    let books: Vec<BookListing> = query
        .apply(&all_books)
        .into_iter()
        .map(Book::listing)
        .collect();

    info!(
        "Listed {} of {} books ({:?})",
        books.len(),
        all_books.len(),
        query
    );

    Ok(Json(Envelope::data(BookList { books })))
}

async fn get_book<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<SingleBook>>>
where
    R: BookRepo,
{
    let book = state.repo.get_book(&id).await.map_err(ApiError::store)?;

    match book {
        Some(book) => {
            info!("Retrieved book: {:?}", book);
            Ok(Json(Envelope::data(SingleBook { book })))
        }
        None => {
            info!("No book found with ID: {}", id);
            Err(ApiError::BookNotFound)
        }
    }
}

async fn update_book<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> ApiResult<Json<Envelope<()>>>
where
    R: BookRepo,
{
    let Json(update) = payload?;

    validate_book_update(&update).map_err(|violation| {
        warn!("Rejected update of book {}: {}", id, violation);
        ApiError::Validation {
            action: Action::Update,
            violation,
        }
    })?;

    let updated_book = state
        .repo
        .update_book(&id, update, Utc::now())
        .await
        .map_err(ApiError::store)?;

    match updated_book {
        Some(book) => {
            info!("Updated book: {:?}", book);
            Ok(Json(Envelope::message("Book updated successfully")))
        }
        None => {
            info!("Tried to update non-existent book with ID: {}", id);
            Err(ApiError::IdNotFound(Action::Update))
        }
    }
}

async fn delete_book<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<()>>>
where
    R: BookRepo,
{
    let deleted = state.repo.delete_book(&id).await.map_err(ApiError::store)?;

    if deleted {
        info!("Deleted book with ID: {}", id);
        Ok(Json(Envelope::message("Book deleted successfully")))
    } else {
        info!("Tried to delete non-existent book with ID: {}", id);
        Err(ApiError::IdNotFound(Action::Delete))
    }
}
