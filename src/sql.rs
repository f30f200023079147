use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::Settings;

pub type DB = SqlitePool;

// Transactions that write start with a write. A deferred SQLite transaction
// that has read can't become a writer after another connection commits, and
// fails with SQLITE_BUSY instead of waiting out the busy timeout.

pub async fn open(settings: &Settings) -> Result<DB, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(&settings.database_url)?
		.create_if_missing(true)
		.foreign_keys(true)
		.journal_mode(SqliteJournalMode::Wal)
		.busy_timeout(Duration::from_secs(5));

	SqlitePoolOptions::new()
		.max_connections(settings.max_connections)
		.acquire_timeout(settings.acquire_timeout())
		.connect_with(options)
		.await
}

// on Ok returns number of statements applied
pub async fn migrate(db: &DB) -> Result<usize, sqlx::Error> {
	let mut tx = db.begin().await?;
	let mut applied = 0;
	for statement in TABLE_SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
		sqlx::query(statement).execute(&mut *tx).await?;
		applied += 1;
	}
	tx.commit().await?;
	tracing::debug!(applied, "schema applied");
	Ok(applied)
}

/// Pattern for `LIKE ? ESCAPE '\'` matching values that start with `prefix`.
pub fn like_prefix(prefix: &str) -> String {
	let mut pattern = String::with_capacity(prefix.len() + 1);
	for chr in prefix.chars() {
		if matches!(chr, '\\' | '%' | '_') {
			pattern.push('\\');
		}
		pattern.push(chr);
	}
	pattern.push('%');
	pattern
}

pub const TABLE_SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS accounts (
	id BLOB NOT NULL PRIMARY KEY,
	email TEXT NOT NULL UNIQUE,
	name TEXT NOT NULL,
	username TEXT NOT NULL UNIQUE,
	ba_no INTEGER UNIQUE,
	pass_hash TEXT NOT NULL,
	date_joined TEXT NOT NULL,
	last_login TEXT DEFAULT NULL,
	is_admin BOOL NOT NULL DEFAULT false,
	is_active BOOL NOT NULL DEFAULT true,
	is_staff BOOL NOT NULL DEFAULT false,
	is_superuser BOOL NOT NULL DEFAULT false
);

CREATE TABLE IF NOT EXISTS sessions (
	token BLOB NOT NULL PRIMARY KEY,
	account_id BLOB NOT NULL,
	created_at TEXT NOT NULL,
	FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS genres (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS languages (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS books (
	id BLOB NOT NULL PRIMARY KEY,
	title TEXT NOT NULL,
	author TEXT NOT NULL,
	summary TEXT NOT NULL DEFAULT '',
	isbn TEXT NOT NULL,
	language_id INTEGER DEFAULT NULL,
	total_copies INTEGER NOT NULL,
	available_copies INTEGER NOT NULL,
	CHECK(total_copies >= 0),
	CHECK(available_copies >= 0 AND available_copies <= total_copies),
	FOREIGN KEY(language_id) REFERENCES languages(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS book_genres (
	book_id BLOB NOT NULL,
	genre_id INTEGER NOT NULL,
	UNIQUE(book_id, genre_id),
	FOREIGN KEY(book_id) REFERENCES books(id) ON DELETE CASCADE,
	FOREIGN KEY(genre_id) REFERENCES genres(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS borrowers (
	id BLOB NOT NULL PRIMARY KEY,
	officer_id BLOB NOT NULL,
	book_id BLOB NOT NULL,
	issue_date TEXT NOT NULL,
	return_date TEXT NOT NULL,
	CHECK(return_date >= issue_date),
	FOREIGN KEY(officer_id) REFERENCES accounts(id) ON DELETE CASCADE,
	FOREIGN KEY(book_id) REFERENCES books(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS information_forms (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	email TEXT NOT NULL UNIQUE,
	name TEXT NOT NULL,
	username TEXT NOT NULL UNIQUE,
	officer BOOL NOT NULL DEFAULT false
);

"#;
