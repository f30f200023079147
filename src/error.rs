use axum::{
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
	#[error("{0} not found")]
	NotFound(String),
	#[error("{0}")]
	Conflict(String),
	#[error("Book not in stock")]
	OutOfStock,
	#[error("{0}")]
	Unprocessable(String),
	#[error("{0}")]
	Validation(#[from] garde::Report),
	#[error("invalid email or password")]
	InvalidCredentials,
	#[error("login required")]
	Unauthenticated,
	#[error("permission denied")]
	Forbidden,
	#[error("database error")]
	Database(#[source] sqlx::Error),
	#[error("password hashing failed")]
	PasswordHash(#[from] bcrypt::BcryptError),
	#[error("background task failed")]
	Task(#[from] tokio::task::JoinError),
	#[error("{0}")]
	Io(#[from] std::io::Error),
	#[error("{message}")]
	Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for AppError {
	fn from(rejection: JsonRejection) -> Self {
		AppError::Rejected { status: rejection.status(), message: rejection.body_text() }
	}
}

impl From<PathRejection> for AppError {
	fn from(rejection: PathRejection) -> Self {
		AppError::Rejected { status: rejection.status(), message: rejection.body_text() }
	}
}

impl From<QueryRejection> for AppError {
	fn from(rejection: QueryRejection) -> Self {
		AppError::Rejected { status: rejection.status(), message: rejection.body_text() }
	}
}

// several variants wrap sqlx::Error, so the conversion is written out
impl From<sqlx::Error> for AppError {
	fn from(err: sqlx::Error) -> Self {
		if let sqlx::Error::Database(db) = &err {
			if db.is_unique_violation() {
				return AppError::Conflict(format!("already exists: {}", db.message()));
			}
			if db.is_foreign_key_violation() {
				return AppError::NotFound("referenced record".to_string());
			}
			if db.is_check_violation() {
				return AppError::Unprocessable(format!("constraint violated: {}", db.message()));
			}
		}
		match err {
			sqlx::Error::RowNotFound => AppError::NotFound("record".to_string()),
			other => AppError::Database(other),
		}
	}
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			AppError::NotFound(_) => StatusCode::NOT_FOUND,
			AppError::Conflict(_) | AppError::OutOfStock => StatusCode::CONFLICT,
			AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
			AppError::Validation(_) => StatusCode::BAD_REQUEST,
			AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
			AppError::Forbidden => StatusCode::FORBIDDEN,
			AppError::Rejected { status, .. } => *status,
			AppError::Database(_)
			| AppError::PasswordHash(_)
			| AppError::Task(_)
			| AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(
				error.cause_chain = ?self,
				error.message = %self,
				"unexpected error"
			);
		}
		(status, Json(json!({ "error": self.to_string() }))).into_response()
	}
}

pub type AppResult<T> = Result<T, AppError>;
