use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
	error::{AppError, AppResult},
	sql::{like_prefix, DB},
	store::borrowers,
	types::{normalize_email, Account, AccountQuery, FormRegister, OfficerUpdateForm, Uid},
};

const ACCOUNT_COLUMNS: &str = "id, email, name, username, ba_no, date_joined, last_login, \
	is_admin, is_active, is_staff, is_superuser";

#[derive(Debug)]
pub struct NewAccount {
	pub email: String,
	pub name: String,
	pub username: String,
	pub ba_no: Option<i64>,
	pub pass_hash: String,
	pub is_admin: bool,
	pub is_staff: bool,
	pub is_superuser: bool,
}

impl NewAccount {
	pub fn officer(form: FormRegister, pass_hash: String) -> Self {
		NewAccount {
			email: form.email,
			name: form.name,
			username: form.username,
			ba_no: form.ba_no,
			pass_hash,
			is_admin: false,
			is_staff: false,
			is_superuser: false,
		}
	}
}

pub async fn insert(conn: &mut SqliteConnection, new: NewAccount) -> AppResult<Account> {
	let email = normalize_email(&new.email);
	if email.is_empty() {
		return Err(AppError::Unprocessable("Users must have an email address".to_string()));
	}
	if new.username.trim().is_empty() {
		return Err(AppError::Unprocessable("Users must have a username".to_string()));
	}

	let account = sqlx::query_as::<_, Account>(&format!(
		"INSERT INTO accounts
			(id, email, name, username, ba_no, pass_hash, date_joined, is_admin, is_staff, is_superuser)
		VALUES
			(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		RETURNING {ACCOUNT_COLUMNS}"
	))
		.bind(Uuid::new_v4())
		.bind(email)
		.bind(new.name)
		.bind(new.username.trim())
		.bind(new.ba_no)
		.bind(new.pass_hash)
		.bind(Utc::now())
		.bind(new.is_admin)
		.bind(new.is_staff)
		.bind(new.is_superuser)
		.fetch_one(&mut *conn)
		.await?;

	tracing::info!(uid = %account.id, username = %account.username, "account created");
	Ok(account)
}

pub async fn create_user(db: &DB, form: FormRegister, pass_hash: String) -> AppResult<Account> {
	let mut conn = db.acquire().await?;
	insert(&mut *conn, NewAccount::officer(form, pass_hash)).await
}

pub async fn create_superuser(db: &DB, form: FormRegister, pass_hash: String) -> AppResult<Account> {
	let mut new = NewAccount::officer(form, pass_hash);
	new.is_admin = true;
	new.is_staff = true;
	new.is_superuser = true;
	let mut conn = db.acquire().await?;
	insert(&mut *conn, new).await
}

pub async fn find_optional(db: &DB, uid: Uid) -> AppResult<Option<Account>> {
	let account = sqlx::query_as::<_, Account>(&format!(
		"SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
	))
		.bind(uid)
		.fetch_optional(db)
		.await?;
	Ok(account)
}

pub async fn find(db: &DB, uid: Uid) -> AppResult<Account> {
	find_optional(db, uid)
		.await?
		.ok_or_else(|| AppError::NotFound("officer".to_string()))
}

pub async fn find_with_hash(db: &DB, email: &str) -> AppResult<Option<AccountQuery>> {
	let found = sqlx::query_as::<_, AccountQuery>(&format!(
		"SELECT {ACCOUNT_COLUMNS}, pass_hash FROM accounts WHERE email = ?"
	))
		.bind(email)
		.fetch_optional(db)
		.await?;
	Ok(found)
}

pub async fn exists(conn: &mut SqliteConnection, uid: Uid) -> AppResult<bool> {
	let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM accounts WHERE id = ?")
		.bind(uid)
		.fetch_optional(&mut *conn)
		.await?;
	Ok(found.is_some())
}

pub async fn list_all(db: &DB) -> AppResult<Vec<Account>> {
	let accounts = sqlx::query_as::<_, Account>(&format!(
		"SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY name"
	))
		.fetch_all(db)
		.await?;
	Ok(accounts)
}

/// Non-admin accounts, optionally narrowed to names starting with `search`.
pub async fn list_officers(db: &DB, search: &str) -> AppResult<Vec<Account>> {
	let officers = sqlx::query_as::<_, Account>(&format!(
		"SELECT {ACCOUNT_COLUMNS} FROM accounts
		WHERE is_admin = false AND name LIKE ? ESCAPE '\\'
		ORDER BY name"
	))
		.bind(like_prefix(search))
		.fetch_all(db)
		.await?;
	Ok(officers)
}

pub async fn touch_last_login(db: &DB, uid: Uid) -> AppResult<Account> {
	let account = sqlx::query_as::<_, Account>(&format!(
		"UPDATE accounts SET last_login = ? WHERE id = ? RETURNING {ACCOUNT_COLUMNS}"
	))
		.bind(Utc::now())
		.bind(uid)
		.fetch_optional(db)
		.await?;
	account.ok_or_else(|| AppError::NotFound("officer".to_string()))
}

/// Applies the fields present in `form`. Flag changes must already be authorized by the caller.
pub async fn update(
	db: &DB,
	uid: Uid,
	form: OfficerUpdateForm,
	pass_hash: Option<String>,
) -> AppResult<Account> {
	let account = sqlx::query_as::<_, Account>(&format!(
		"UPDATE accounts SET
			email = COALESCE(?, email),
			name = COALESCE(?, name),
			username = COALESCE(?, username),
			ba_no = COALESCE(?, ba_no),
			pass_hash = COALESCE(?, pass_hash),
			is_admin = COALESCE(?, is_admin),
			is_staff = COALESCE(?, is_staff),
			is_active = COALESCE(?, is_active)
		WHERE id = ?
		RETURNING {ACCOUNT_COLUMNS}"
	))
		.bind(form.email.as_deref().map(normalize_email))
		.bind(form.name)
		.bind(form.username)
		.bind(form.ba_no)
		.bind(pass_hash)
		.bind(form.is_admin)
		.bind(form.is_staff)
		.bind(form.is_active)
		.bind(uid)
		.fetch_optional(db)
		.await?;

	let account = account.ok_or_else(|| AppError::NotFound("officer".to_string()))?;
	tracing::info!(%uid, "account updated");
	Ok(account)
}

/// Deletes an account after returning every copy it still has out.
/// On Ok returns the number of loans closed.
pub async fn delete(db: &DB, uid: Uid) -> AppResult<usize> {
	let mut tx = db.begin().await?;

	let loans: Vec<(Uuid,)> = sqlx::query_as("DELETE FROM borrowers WHERE officer_id = ? RETURNING book_id")
		.bind(uid)
		.fetch_all(&mut *tx)
		.await?;
	for (book,) in &loans {
		borrowers::give_back(&mut *tx, *book).await?;
	}

	let deleted = sqlx::query("DELETE FROM accounts WHERE id = ?")
		.bind(uid)
		.execute(&mut *tx)
		.await?
		.rows_affected();
	if deleted == 0 {
		return Err(AppError::NotFound("officer".to_string()));
	}

	tx.commit().await?;
	tracing::info!(%uid, returned = loans.len(), "account deleted");
	Ok(loans.len())
}
