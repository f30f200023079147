use crate::{
	error::{AppError, AppResult},
	sql::DB,
	store::accounts::{self, NewAccount},
	types::{normalize_email, Account, FormApprove, FormId, FormInformation, InformationForm},
};

pub async fn create(db: &DB, form: FormInformation) -> AppResult<InformationForm> {
	let request = sqlx::query_as::<_, InformationForm>(
		"INSERT INTO information_forms (email, name, username, officer)
		VALUES (?, ?, ?, ?)
		RETURNING id, email, name, username, officer"
	)
		.bind(normalize_email(&form.email))
		.bind(&form.name)
		.bind(&form.username)
		.bind(form.officer)
		.fetch_one(db)
		.await?;
	tracing::info!(id = request.id, email = %request.email, "registration requested");
	Ok(request)
}

pub async fn list(db: &DB) -> AppResult<Vec<InformationForm>> {
	let requests = sqlx::query_as::<_, InformationForm>(
		"SELECT id, email, name, username, officer FROM information_forms ORDER BY id"
	)
		.fetch_all(db)
		.await?;
	Ok(requests)
}

/// Turns a pending request into an account and drops the request.
pub async fn approve(db: &DB, id: FormId, form: FormApprove, pass_hash: String) -> AppResult<Account> {
	let mut tx = db.begin().await?;

	let request = sqlx::query_as::<_, InformationForm>(
		"DELETE FROM information_forms WHERE id = ?
		RETURNING id, email, name, username, officer"
	)
		.bind(id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or_else(|| AppError::NotFound("registration request".to_string()))?;

	let account = accounts::insert(&mut *tx, NewAccount {
		email: request.email,
		name: request.name,
		username: request.username,
		ba_no: form.ba_no,
		pass_hash,
		is_admin: false,
		is_staff: request.officer,
		is_superuser: false,
	}).await?;
	tx.commit().await?;

	tracing::info!(id, uid = %account.id, "registration approved");
	Ok(account)
}

pub async fn reject(db: &DB, id: FormId) -> AppResult<()> {
	let deleted = sqlx::query("DELETE FROM information_forms WHERE id = ?")
		.bind(id)
		.execute(db)
		.await?
		.rows_affected();
	if deleted == 0 {
		return Err(AppError::NotFound("registration request".to_string()));
	}
	tracing::info!(id, "registration rejected");
	Ok(())
}
