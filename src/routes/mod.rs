mod books;
mod borrowers;
mod catalog;
mod officers;
mod registration;

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
	auth::{self, Officer, Token},
	error::AppResult,
	extract::{Json, Query},
	store,
	types::{Account, Book, FormLogin, SearchParams},
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/", get(display_home))
		.route("/login", post(perform_login))
		.route("/logout", post(perform_logout))
		.merge(registration::router())
		.merge(books::router())
		.merge(catalog::router())
		.merge(officers::router())
		.merge(borrowers::router())
}

#[derive(Debug, Serialize)]
struct HomeView {
	accounts: Vec<Account>,
	books: Vec<Book>,
	search_input: String,
}

async fn display_home(
	State(stt): State<SharedState>,
	_officer: Officer,
	Query(params): Query<SearchParams>,
) -> AppResult<Json<HomeView>> {
	let search_input = params.input().to_string();
	let accounts = store::accounts::list_all(&stt.db).await?;
	let books = store::books::list(&stt.db, &search_input).await?;
	Ok(Json(HomeView { accounts, books, search_input }))
}

#[derive(Debug, Serialize)]
struct LoginView {
	token: Token,
	officer: Account,
}

async fn perform_login(
	State(stt): State<SharedState>,
	Json(login): Json<FormLogin>,
) -> AppResult<Json<LoginView>> {
	login.validate()?;
	let (token, officer) = auth::login(&stt.db, login).await?;
	Ok(Json(LoginView { token, officer }))
}

async fn perform_logout(State(stt): State<SharedState>, officer: Officer) -> AppResult<StatusCode> {
	auth::delete_session(&stt.db, officer.token).await?;
	tracing::info!(uid = %officer.id(), "officer logged out");
	Ok(StatusCode::NO_CONTENT)
}
