use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use bookshelf_classify::{ClassifyClient, ClassifyError, SearchResult};
use bookshelf_db::{Book, BookStore, StoreError};
use bookshelf_http::{AppError, LiveStore};

use super::models::{
    new_book, AddBookParams, DeleteBookParams, IndexPage, IndexParams, SearchParams, DEFAULT_NAME,
};
use super::page;

/// Dependencies shared by the books handlers.
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
    pub classify: ClassifyClient,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search))
        .route("/books", get(list_books))
        .route("/books/add", post(add_book))
        .route("/books/delete", post(delete_book))
        .with_state(state)
}

async fn index(
    State(state): State<BooksState>,
    live: Option<Extension<LiveStore>>,
    Query(params): Query<IndexParams>,
) -> Result<Html<String>, AppError> {
    let name = params
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    // Set by the liveness layer; absent when the router is served ungated
    let db_status = live.is_some();
    let books = state.store.list_books().await.map_err(store_error)?;

    Ok(Html(page::render_index(&IndexPage {
        name,
        db_status,
        books,
    })))
}

async fn search(
    State(state): State<BooksState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let term = required(params.search, "search")?;
    let results = state.classify.search(&term).await.map_err(classify_error)?;

    Ok(Json(results))
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.store.list_books().await.map_err(store_error)?;
    Ok(Json(books))
}

async fn add_book(
    State(state): State<BooksState>,
    Query(params): Query<AddBookParams>,
) -> Result<Json<Book>, AppError> {
    let owi = required(params.id, "id")?;
    let lookup = state.classify.lookup(&owi).await.map_err(classify_error)?;
    let book = state
        .store
        .insert_book(new_book(lookup))
        .await
        .map_err(store_error)?;

    Ok(Json(book))
}

async fn delete_book(
    State(state): State<BooksState>,
    Query(params): Query<DeleteBookParams>,
) -> Result<StatusCode, AppError> {
    let raw = required(params.pk, "pk")?;
    let pk: i64 = raw
        .parse()
        .map_err(|_| AppError::bad_request(format!("query parameter 'pk' must be an integer, got '{raw}'")))?;

    state.store.delete_book(pk).await.map_err(store_error)?;
    Ok(StatusCode::OK)
}

/// The value as given; whitespace-only counts as missing.
fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(format!("missing query parameter '{name}'")))
}

fn classify_error(err: ClassifyError) -> AppError {
    match &err {
        ClassifyError::NotFound { .. } => AppError::not_found(err.to_string()),
        _ => AppError::internal(err),
    }
}

fn store_error(err: StoreError) -> AppError {
    AppError::Internal(anyhow::Error::new(err).context("book store operation failed"))
}
