use std::collections::{BTreeSet, HashMap};

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
	error::{AppError, AppResult},
	sql::{like_prefix, DB},
	types::{Bid, Book, BookForm, BookQuery, Genre, GenreId},
};

const BOOK_SELECT: &str = "SELECT
		b.id, b.title, b.author, b.summary, b.isbn,
		b.language_id, l.name AS language_name,
		b.total_copies, b.available_copies
	FROM books b
	LEFT JOIN languages l ON l.id = b.language_id";

/// Books whose title starts with `search` (every book when empty).
pub async fn list(db: &DB, search: &str) -> AppResult<Vec<Book>> {
	let rows = sqlx::query_as::<_, BookQuery>(&format!(
		"{BOOK_SELECT} WHERE b.title LIKE ? ESCAPE '\\' ORDER BY b.title"
	))
		.bind(like_prefix(search))
		.fetch_all(db)
		.await?;

	let links: Vec<(Bid, i64, String)> = sqlx::query_as(
		"SELECT bg.book_id, g.id, g.name
		FROM book_genres bg
		JOIN genres g ON g.id = bg.genre_id
		ORDER BY g.name"
	)
		.fetch_all(db)
		.await?;

	let mut genres: HashMap<Bid, Vec<Genre>> = HashMap::new();
	for (book, id, name) in links {
		genres.entry(book).or_default().push(Genre { id, name });
	}

	let books = rows
		.into_iter()
		.map(|row| {
			let book_genres = genres.remove(&row.id).unwrap_or_default();
			Book::from_query(row, book_genres)
		})
		.collect();
	Ok(books)
}

pub async fn fetch(conn: &mut SqliteConnection, bid: Bid) -> AppResult<Book> {
	let row = sqlx::query_as::<_, BookQuery>(&format!("{BOOK_SELECT} WHERE b.id = ?"))
		.bind(bid)
		.fetch_optional(&mut *conn)
		.await?
		.ok_or_else(|| AppError::NotFound("book".to_string()))?;

	let genres = sqlx::query_as::<_, Genre>(
		"SELECT g.id, g.name
		FROM book_genres bg
		JOIN genres g ON g.id = bg.genre_id
		WHERE bg.book_id = ?
		ORDER BY g.name"
	)
		.bind(bid)
		.fetch_all(&mut *conn)
		.await?;

	Ok(Book::from_query(row, genres))
}

pub async fn find(db: &DB, bid: Bid) -> AppResult<Book> {
	let mut conn = db.acquire().await?;
	fetch(&mut *conn, bid).await
}

pub async fn create(db: &DB, form: BookForm) -> AppResult<Book> {
	let available = form.available_copies.unwrap_or(form.total_copies);
	if available > form.total_copies {
		return Err(AppError::Unprocessable(format!(
			"available_copies ({available}) cannot exceed total_copies ({})",
			form.total_copies
		)));
	}

	let bid = Uuid::new_v4();
	let mut tx = db.begin().await?;
	sqlx::query(
		"INSERT INTO books
			(id, title, author, summary, isbn, language_id, total_copies, available_copies)
		VALUES
			(?, ?, ?, ?, ?, ?, ?, ?)"
	)
		.bind(bid)
		.bind(&form.title)
		.bind(&form.author)
		.bind(&form.summary)
		.bind(&form.isbn)
		.bind(form.language)
		.bind(form.total_copies)
		.bind(available)
		.execute(&mut *tx)
		.await?;
	set_genres(&mut *tx, bid, &form.genres).await?;
	let book = fetch(&mut *tx, bid).await?;
	tx.commit().await?;

	tracing::info!(%bid, title = %book.title, copies = book.total_copies, "book created");
	Ok(book)
}

/// Replaces a book's fields. The number of copies on loan is preserved, so
/// `available_copies` follows `total_copies` and a total below it is refused.
pub async fn update(db: &DB, bid: Bid, form: BookForm) -> AppResult<Book> {
	let mut tx = db.begin().await?;

	// SET expressions see the old counts
	let updated = sqlx::query(
		"UPDATE books SET
			title = ?1, author = ?2, summary = ?3, isbn = ?4, language_id = ?5,
			available_copies = ?6 - (total_copies - available_copies),
			total_copies = ?6
		WHERE id = ?7 AND total_copies - available_copies <= ?6"
	)
		.bind(&form.title)
		.bind(&form.author)
		.bind(&form.summary)
		.bind(&form.isbn)
		.bind(form.language)
		.bind(form.total_copies)
		.bind(bid)
		.execute(&mut *tx)
		.await?
		.rows_affected();
	if updated == 0 {
		let on_loan = fetch(&mut *tx, bid).await?.on_loan();
		return Err(AppError::Unprocessable(format!(
			"total_copies ({}) is below the {on_loan} copies on loan",
			form.total_copies
		)));
	}

	set_genres(&mut *tx, bid, &form.genres).await?;
	let book = fetch(&mut *tx, bid).await?;
	tx.commit().await?;

	tracing::info!(%bid, total = book.total_copies, available = book.available_copies, "book updated");
	Ok(book)
}

pub async fn delete(db: &DB, bid: Bid) -> AppResult<()> {
	let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
		.bind(bid)
		.execute(db)
		.await?
		.rows_affected();
	if deleted == 0 {
		return Err(AppError::NotFound("book".to_string()));
	}
	tracing::info!(%bid, "book deleted");
	Ok(())
}

async fn set_genres(conn: &mut SqliteConnection, bid: Bid, genres: &[GenreId]) -> AppResult<()> {
	sqlx::query("DELETE FROM book_genres WHERE book_id = ?")
		.bind(bid)
		.execute(&mut *conn)
		.await?;

	let unique: BTreeSet<GenreId> = genres.iter().copied().collect();
	for genre in unique {
		sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES (?, ?)")
			.bind(bid)
			.bind(genre)
			.execute(&mut *conn)
			.await?;
	}
	Ok(())
}
