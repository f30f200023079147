use sqlx::{sqlite::SqliteRow, FromRow};

use crate::{
	error::{AppError, AppResult},
	sql::DB,
};

/// The two name-only lookup tables books refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
	Genres,
	Languages,
}

impl Catalog {
	fn table(self) -> &'static str {
		match self {
			Catalog::Genres => "genres",
			Catalog::Languages => "languages",
		}
	}

	pub fn noun(self) -> &'static str {
		match self {
			Catalog::Genres => "genre",
			Catalog::Languages => "language",
		}
	}
}

pub async fn list<T>(db: &DB, catalog: Catalog) -> AppResult<Vec<T>>
where
	T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
	let entries = sqlx::query_as::<_, T>(&format!(
		"SELECT id, name FROM {} ORDER BY name",
		catalog.table()
	))
		.fetch_all(db)
		.await?;
	Ok(entries)
}

pub async fn create<T>(db: &DB, catalog: Catalog, name: &str) -> AppResult<T>
where
	T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
	let entry = sqlx::query_as::<_, T>(&format!(
		"INSERT INTO {} (name) VALUES (?) RETURNING id, name",
		catalog.table()
	))
		.bind(name.trim())
		.fetch_one(db)
		.await?;
	tracing::info!(kind = catalog.noun(), %name, "catalog entry created");
	Ok(entry)
}

pub async fn delete(db: &DB, catalog: Catalog, id: i64) -> AppResult<()> {
	let deleted = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", catalog.table()))
		.bind(id)
		.execute(db)
		.await?
		.rows_affected();
	if deleted == 0 {
		return Err(AppError::NotFound(catalog.noun().to_string()));
	}
	tracing::info!(kind = catalog.noun(), id, "catalog entry deleted");
	Ok(())
}
