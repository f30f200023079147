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
	store::borrowers,
	types::{Borrower, BorrowerUpdateForm, LoanId, NewBorrowerForm},
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/borrowers", get(list_borrowers))
		.route("/borrower/create", post(create_borrower))
		.route("/borrower/:id", get(borrower_detail))
		.route("/borrower/:id/update", post(update_borrower))
		.route("/borrower/:id/delete", post(delete_borrower))
}

// admins see every loan, everyone else only their own
async fn list_borrowers(State(stt): State<SharedState>, officer: Officer) -> AppResult<Json<Vec<Borrower>>> {
	let filter = if officer.has_perm() { None } else { Some(officer.id()) };
	Ok(Json(borrowers::list(&stt.db, filter, &stt.settings).await?))
}

async fn borrower_detail(
	State(stt): State<SharedState>,
	_officer: Officer,
	Path(id): Path<LoanId>,
) -> AppResult<Json<Borrower>> {
	Ok(Json(borrowers::find(&stt.db, id, &stt.settings).await?))
}

async fn create_borrower(
	State(stt): State<SharedState>,
	_admin: Admin,
	Json(form): Json<NewBorrowerForm>,
) -> AppResult<(StatusCode, Json<Borrower>)> {
	form.validate()?;
	let id = borrowers::create(&stt.db, form, &stt.settings).await?;
	let borrower = borrowers::find(&stt.db, id, &stt.settings).await?;
	Ok((StatusCode::CREATED, Json(borrower)))
}

async fn update_borrower(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(id): Path<LoanId>,
	Json(form): Json<BorrowerUpdateForm>,
) -> AppResult<Json<Borrower>> {
	form.validate()?;
	borrowers::update(&stt.db, id, form).await?;
	Ok(Json(borrowers::find(&stt.db, id, &stt.settings).await?))
}

async fn delete_borrower(
	State(stt): State<SharedState>,
	_admin: Admin,
	Path(id): Path<LoanId>,
) -> AppResult<StatusCode> {
	borrowers::delete(&stt.db, id).await?;
	Ok(StatusCode::NO_CONTENT)
}
