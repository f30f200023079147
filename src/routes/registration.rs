use axum::{
	extract::State,
	http::StatusCode,
	routing::{get, post},
	Router,
};
use garde::Validate;

use crate::{
	app::SharedState,
	auth::{self, Admin},
	error::AppResult,
	extract::{Json, Path},
	store::registrations,
	types::{Account, FormApprove, FormId, FormInformation, InformationForm},
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/info-register", get(list_requests).post(register))
		.route("/info-register/:id/approve", post(approve_request))
		.route("/info-register/:id/delete", post(reject_request))
}

// open to anonymous visitors
async fn register(
	State(stt): State<SharedState>,
	Json(form): Json<FormInformation>,
) -> AppResult<(StatusCode, Json<InformationForm>)> {
	let form = form.trimmed();
	form.validate()?;
	let request = registrations::create(&stt.db, form).await?;
	Ok((StatusCode::CREATED, Json(request)))
}

async fn list_requests(State(stt): State<SharedState>, _admin: Admin) -> AppResult<Json<Vec<InformationForm>>> {
	Ok(Json(registrations::list(&stt.db).await?))
}

async fn approve_request(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(id): Path<FormId>,
	Json(form): Json<FormApprove>,
) -> AppResult<(StatusCode, Json<Account>)> {
	form.validate()?;
	let pass_hash = auth::hash_password(form.password.clone(), stt.settings.bcrypt_cost).await?;
	let account = registrations::approve(&stt.db, id, form, pass_hash).await?;
	Ok((StatusCode::CREATED, Json(account)))
}

async fn reject_request(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(id): Path<FormId>,
) -> AppResult<StatusCode> {
	registrations::reject(&stt.db, id).await?;
	Ok(StatusCode::NO_CONTENT)
}
