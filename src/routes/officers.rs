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
	auth::{self, Admin, Officer},
	error::{AppError, AppResult},
	extract::{Json, Path, Query},
	store::accounts,
	types::{Account, FormRegister, OfficerUpdateForm, SearchParams, Uid},
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/officers", get(list_officers))
		.route("/officer/create", post(create_officer))
		.route("/officer/:id", get(officer_detail))
		.route("/officer/:id/update", post(update_officer))
		.route("/officer/:id/delete", post(delete_officer))
}

#[derive(Debug, Serialize)]
struct OfficerList {
	officers: Vec<Account>,
	search_input: String,
}

async fn list_officers(
	State(stt): State<SharedState>,
	_admin: Admin,
	Query(params): Query<SearchParams>,
) -> AppResult<Json<OfficerList>> {
	let search_input = params.input().to_string();
	let officers = accounts::list_officers(&stt.db, &search_input).await?;
	Ok(Json(OfficerList { officers, search_input }))
}

async fn officer_detail(
	State(stt): State<SharedState>,
	_officer: Officer,
	Path(uid): Path<Uid>,
) -> AppResult<Json<Account>> {
	Ok(Json(accounts::find(&stt.db, uid).await?))
}

async fn create_officer(
	State(stt): State<SharedState>,
	_admin: Admin,
	Json(form): Json<FormRegister>,
) -> AppResult<(StatusCode, Json<Account>)> {
	let form = form.trimmed();
	form.validate()?;
	let pass_hash = auth::hash_password(form.password.clone(), stt.settings.bcrypt_cost).await?;
	let account = accounts::create_user(&stt.db, form, pass_hash).await?;
	Ok((StatusCode::CREATED, Json(account)))
}

// officers edit their own profile; role flags and other profiles need the admin permission
async fn update_officer(
	State(stt): State<SharedState>,
	officer: Officer,
	Path(uid): Path<Uid>,
	Json(form): Json<OfficerUpdateForm>,
) -> AppResult<Json<Account>> {
	if (uid != officer.id() || form.touches_flags()) && !officer.has_perm() {
		return Err(AppError::Forbidden);
	}
	let form = form.trimmed();
	form.validate()?;

	let pass_hash = match &form.password {
		Some(password) => Some(auth::hash_password(password.clone(), stt.settings.bcrypt_cost).await?),
		None => None,
	};
	Ok(Json(accounts::update(&stt.db, uid, form, pass_hash).await?))
}

async fn delete_officer(
	State(stt): State<SharedState>,
	Admin(admin): Admin,
	Path(uid): Path<Uid>,
) -> AppResult<StatusCode> {
	if uid == admin.id() {
		return Err(AppError::Unprocessable("cannot delete your own account".to_string()));
	}
	accounts::delete(&stt.db, uid).await?;
	Ok(StatusCode::NO_CONTENT)
}
