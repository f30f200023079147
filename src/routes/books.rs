use axum::{
	extract::State,
	http::StatusCode,
	routing::{get, post},
	Router,
};
use garde::Validate;
use serde::Serialize;

use crate::{
	app::SharedState,
	auth::{Admin, Officer},
	error::AppResult,
	extract::{Json, Path, Query},
	store::books,
	types::{Bid, Book, BookForm, SearchParams},
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/books", get(list_books))
		.route("/book/create", post(create_book))
		.route("/book/:id", get(book_detail))
		.route("/book/:id/update", post(update_book))
		.route("/book/:id/delete", post(delete_book))
}

#[derive(Debug, Serialize)]
struct BookList {
	books: Vec<Book>,
	search_input: String,
}

async fn list_books(
	State(stt): State<SharedState>,
	_officer: Officer,
	Query(params): Query<SearchParams>,
) -> AppResult<Json<BookList>> {
	let search_input = params.input().to_string();
	let books = books::list(&stt.db, &search_input).await?;
	Ok(Json(BookList { books, search_input }))
}

async fn book_detail(
	State(stt): State<SharedState>,
	_officer: Officer,
	Path(bid): Path<Bid>,
) -> AppResult<Json<Book>> {
	Ok(Json(books::find(&stt.db, bid).await?))
}

async fn create_book(
	State(stt): State<SharedState>,
	_admin: Admin,
	Json(form): Json<BookForm>,
) -> AppResult<(StatusCode, Json<Book>)> {
	form.validate()?;
	let book = books::create(&stt.db, form).await?;
	Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(bid): Path<Bid>,
	Json(form): Json<BookForm>,
) -> AppResult<Json<Book>> {
	form.validate()?;
	Ok(Json(books::update(&stt.db, bid, form).await?))
}

async fn delete_book(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(bid): Path<Bid>,
) -> AppResult<StatusCode> {
	books::delete(&stt.db, bid).await?;
	Ok(StatusCode::NO_CONTENT)
}
