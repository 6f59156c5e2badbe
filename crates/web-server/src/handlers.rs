use crate::{
    error::AppError,
    extractors::{JsonBody, RecordId},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use core_types::{
    Book, BookAuthor, BookBorrow, BookDetail, BookInput, LinkInput, Role, Schema, User,
    UserDetail, UserInput,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Acknowledgement body for writes. `id` is set when a row was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self { message: message.to_owned(), id: None }
    }

    fn created(message: &str, id: i64) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Json(Self { message: message.to_owned(), id: Some(id) }))
    }
}

/// # GET /
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new("Index page"))
}

// ==============================================================================
// Users
// ==============================================================================

/// # GET /users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.db_repo.list_users().await?;
    Ok(Json(users))
}

/// # GET /user/:id
pub async fn get_user(
    RecordId(id): RecordId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, AppError> {
    let user = state.db_repo.get_user(id).await?;
    Ok(Json(user))
}

/// # GET /user-detail/:id
/// The user plus full records of every book they authored and borrowed.
pub async fn get_user_detail(
    RecordId(id): RecordId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserDetail>, AppError> {
    let detail = state.db_repo.get_user_detail(id).await?;
    Ok(Json(detail))
}

/// # POST /user
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(raw): JsonBody,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input = UserInput::validate(raw)?;
    let user = state.db_repo.create_user(&input).await?;
    Ok(MessageResponse::created("New User successfully added", user.id))
}

/// # DELETE /user/:id
pub async fn delete_user(
    RecordId(id): RecordId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    state.db_repo.delete_user(id).await?;
    Ok(Json(MessageResponse::new("User successfully deleted")))
}

// ==============================================================================
// Books
// ==============================================================================

/// # GET /books
pub async fn list_books(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.db_repo.list_books().await?;
    Ok(Json(books))
}

/// # GET /book/:id
pub async fn get_book(
    RecordId(id): RecordId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Book>, AppError> {
    let book = state.db_repo.get_book(id).await?;
    Ok(Json(book))
}

/// # GET /book-detail/:id
pub async fn get_book_detail(
    RecordId(id): RecordId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookDetail>, AppError> {
    let detail = state.db_repo.get_book_detail(id).await?;
    Ok(Json(detail))
}

/// # POST /book
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    JsonBody(raw): JsonBody,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input = BookInput::validate(raw)?;
    let book = state.db_repo.create_book(&input).await?;
    Ok(MessageResponse::created("New Book successfully added", book.id))
}

/// # DELETE /book/:id
pub async fn delete_book(
    RecordId(id): RecordId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    state.db_repo.delete_book(id).await?;
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}

// ==============================================================================
// Links & roles
// ==============================================================================

/// # POST /book-author
pub async fn create_book_author(
    State(state): State<Arc<AppState>>,
    JsonBody(raw): JsonBody,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input = LinkInput::validate(raw)?;
    let link = state.db_repo.create_book_author(&input).await?;
    Ok(MessageResponse::created("Authorship recorded", link.id))
}

/// # GET /book-authors
pub async fn list_book_authors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookAuthor>>, AppError> {
    let links = state.db_repo.list_book_authors().await?;
    Ok(Json(links))
}

/// # POST /book-borrow
pub async fn create_book_borrow(
    State(state): State<Arc<AppState>>,
    JsonBody(raw): JsonBody,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input = LinkInput::validate(raw)?;
    let link = state.db_repo.create_book_borrow(&input).await?;
    Ok(MessageResponse::created("Borrow recorded", link.id))
}

/// # GET /book-borrows
pub async fn list_book_borrows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookBorrow>>, AppError> {
    let links = state.db_repo.list_book_borrows().await?;
    Ok(Json(links))
}

/// # GET /roles
pub async fn list_roles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Role>>, AppError> {
    let roles = state.db_repo.list_roles().await?;
    Ok(Json(roles))
}
