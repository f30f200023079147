use axum::{
	extract::State,
	http::StatusCode,
	routing::{get, post},
	Router,
};
use garde::Validate;

use crate::{
	app::SharedState,
	auth::{Admin, Officer},
	error::AppResult,
	extract::{Json, Path},
	store::catalog::{self, Catalog},
	types::{Genre, GenreId, Language, LanguageId, NameForm},
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/genres", get(list_genres))
		.route("/genre/create", post(create_genre))
		.route("/genre/:id/delete", post(delete_genre))
		.route("/languages", get(list_languages))
		.route("/language/create", post(create_language))
		.route("/language/:id/delete", post(delete_language))
}

async fn list_genres(State(stt): State<SharedState>, _officer: Officer) -> AppResult<Json<Vec<Genre>>> {
	Ok(Json(catalog::list(&stt.db, Catalog::Genres).await?))
}

async fn create_genre(
	State(stt): State<SharedState>,
	_admin: Admin,
	Json(form): Json<NameForm>,
) -> AppResult<(StatusCode, Json<Genre>)> {
	form.validate()?;
	let genre = catalog::create(&stt.db, Catalog::Genres, &form.name).await?;
	Ok((StatusCode::CREATED, Json(genre)))
}

async fn delete_genre(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(id): Path<GenreId>,
) -> AppResult<StatusCode> {
	catalog::delete(&stt.db, Catalog::Genres, id).await?;
	Ok(StatusCode::NO_CONTENT)
}

async fn list_languages(State(stt): State<SharedState>, _officer: Officer) -> AppResult<Json<Vec<Language>>> {
	Ok(Json(catalog::list(&stt.db, Catalog::Languages).await?))
}

async fn create_language(
	State(stt): State<SharedState>,
	_admin: Admin,
	Json(form): Json<NameForm>,
) -> AppResult<(StatusCode, Json<Language>)> {
	form.validate()?;
	let language = catalog::create(&stt.db, Catalog::Languages, &form.name).await?;
	Ok((StatusCode::CREATED, Json(language)))
}

async fn delete_language(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(id): Path<LanguageId>,
) -> AppResult<StatusCode> {
	catalog::delete(&stt.db, Catalog::Languages, id).await?;
	Ok(StatusCode::NO_CONTENT)
}
