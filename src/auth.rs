//! Password hashing, session tokens and the request extractors that gate
//! handlers on a logged-in officer or an administrator.

use axum::{
	async_trait,
	extract::FromRequestParts,
	http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
	app::SharedState,
	error::{AppError, AppResult},
	sql::DB,
	store::accounts,
	types::{normalize_email, Account, FormLogin, Uid},
};

pub type Token = Uuid;

pub async fn hash_password(password: String, cost: u32) -> AppResult<String> {
	let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
	Ok(hashed)
}

pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
	let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
	Ok(ok)
}

pub async fn login(db: &DB, form: FormLogin) -> AppResult<(Token, Account)> {
	let email = normalize_email(&form.email);
	let Some(found) = accounts::find_with_hash(db, &email).await? else {
		tracing::info!(%email, "login for unknown email");
		return Err(AppError::InvalidCredentials);
	};
	if !verify_password(form.password, found.pass_hash).await? {
		tracing::info!(%email, "login with wrong password");
		return Err(AppError::InvalidCredentials);
	}
	if !found.account.is_active {
		tracing::info!(%email, "login for inactive account");
		return Err(AppError::InvalidCredentials);
	}

	let token = create_session(db, found.account.id).await?;
	let account = accounts::touch_last_login(db, found.account.id).await?;
	tracing::info!(uid = %account.id, "officer logged in");
	Ok((token, account))
}

pub async fn create_session(db: &DB, uid: Uid) -> AppResult<Token> {
	let token = Uuid::new_v4();
	sqlx::query("INSERT INTO sessions (token, account_id, created_at) VALUES (?, ?, ?)")
		.bind(token)
		.bind(uid)
		.bind(Utc::now())
		.execute(db)
		.await?;
	Ok(token)
}

pub async fn delete_session(db: &DB, token: Token) -> AppResult<()> {
	sqlx::query("DELETE FROM sessions WHERE token = ?")
		.bind(token)
		.execute(db)
		.await?;
	Ok(())
}

/// Resolves a token to its account, dropping the session once it has expired.
pub async fn session_account(db: &DB, token: Token, ttl: chrono::Duration) -> AppResult<Option<Account>> {
	let created: Option<(Uid, DateTime<Utc>)> = sqlx::query_as(
		"SELECT account_id, created_at FROM sessions WHERE token = ?"
	)
		.bind(token)
		.fetch_optional(db)
		.await?;

	let Some((uid, created_at)) = created else {
		return Ok(None);
	};
	if created_at + ttl < Utc::now() {
		tracing::debug!(%uid, "session expired");
		delete_session(db, token).await?;
		return Ok(None);
	}
	accounts::find_optional(db, uid).await
}

fn bearer_token(parts: &Parts) -> Option<Token> {
	let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
	let token = header.strip_prefix("Bearer ")?;
	Uuid::parse_str(token.trim()).ok()
}

/// Any logged-in, active officer.
#[derive(Debug, Clone)]
pub struct Officer {
	pub token: Token,
	pub account: Account,
}

impl Officer {
	pub fn id(&self) -> Uid {
		self.account.id
	}

	pub fn has_perm(&self) -> bool {
		self.account.has_perm()
	}
}

#[async_trait]
impl FromRequestParts<SharedState> for Officer {
	type Rejection = AppError;

	async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
		let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
		let account = session_account(&state.db, token, state.settings.session_ttl())
			.await?
			.ok_or(AppError::Unauthenticated)?;
		if !account.is_active {
			return Err(AppError::Unauthenticated);
		}
		Ok(Officer { token, account })
	}
}

/// An officer that passes the admin permission check.
#[derive(Debug, Clone)]
pub struct Admin(pub Officer);

#[async_trait]
impl FromRequestParts<SharedState> for Admin {
	type Rejection = AppError;

	async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
		let officer = Officer::from_request_parts(parts, state).await?;
		if !officer.has_perm() {
			tracing::info!(uid = %officer.id(), path = %parts.uri.path(), "permission denied");
			return Err(AppError::Forbidden);
		}
		Ok(Admin(officer))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::Request;

	fn parts_with(header: Option<&str>) -> Parts {
		let mut builder = Request::builder().uri("/books");
		if let Some(value) = header {
			builder = builder.header(AUTHORIZATION, value);
		}
		builder.body(()).unwrap().into_parts().0
	}

	#[test]
	fn bearer_token_parses_uuid() {
		let token = Uuid::new_v4();
		let parts = parts_with(Some(&format!("Bearer {token}")));
		assert_eq!(bearer_token(&parts), Some(token));
	}

	#[test]
	fn bearer_token_rejects_other_schemes() {
		assert_eq!(bearer_token(&parts_with(None)), None);
		assert_eq!(bearer_token(&parts_with(Some("Basic Zm9vOmJhcg=="))), None);
		assert_eq!(bearer_token(&parts_with(Some("Bearer not-a-token"))), None);
	}

	#[tokio::test]
	async fn password_round_trip() {
		let hash = hash_password("correct horse".to_string(), 4).await.unwrap();
		assert!(verify_password("correct horse".to_string(), hash.clone()).await.unwrap());
		assert!(!verify_password("wrong horse".to_string(), hash).await.unwrap());
	}
}
