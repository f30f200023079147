//! Checkout and return. Every change to a book's available copies happens
//! here, inside the caller's transaction, with the bound checked in SQL.

use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
	config::Settings,
	error::{AppError, AppResult},
	sql::DB,
	store::accounts,
	types::{Bid, Borrower, BorrowerQuery, BorrowerUpdateForm, LoanId, NewBorrowerForm, Uid},
};

const BORROWER_SELECT: &str = "SELECT
		br.id, br.officer_id, a.name AS officer_name,
		br.book_id, b.title AS book_title,
		br.issue_date, br.return_date
	FROM borrowers br
	JOIN accounts a ON a.id = br.officer_id
	JOIN books b ON b.id = br.book_id";

fn today() -> NaiveDate {
	Utc::now().date_naive()
}

/// Takes one copy of `book` off the shelf.
pub async fn checkout(conn: &mut SqliteConnection, book: Bid) -> AppResult<()> {
	let taken = sqlx::query(
		"UPDATE books SET available_copies = available_copies - 1
		WHERE id = ? AND available_copies > 0"
	)
		.bind(book)
		.execute(&mut *conn)
		.await?
		.rows_affected();
	if taken == 1 {
		return Ok(());
	}

	let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM books WHERE id = ?")
		.bind(book)
		.fetch_optional(&mut *conn)
		.await?;
	match exists {
		Some(_) => Err(AppError::OutOfStock),
		None => Err(AppError::NotFound("book".to_string())),
	}
}

/// Puts one copy of `book` back. A book already at its total stays there.
pub async fn give_back(conn: &mut SqliteConnection, book: Bid) -> AppResult<()> {
	let returned = sqlx::query(
		"UPDATE books SET available_copies = available_copies + 1
		WHERE id = ? AND available_copies < total_copies"
	)
		.bind(book)
		.execute(&mut *conn)
		.await?
		.rows_affected();
	if returned == 0 {
		tracing::warn!(%book, "returned copy of a book with every copy on the shelf");
	}
	Ok(())
}

fn check_dates(issue_date: NaiveDate, return_date: NaiveDate) -> AppResult<()> {
	if return_date < issue_date {
		return Err(AppError::Unprocessable(format!(
			"return_date {return_date} is before issue_date {issue_date}"
		)));
	}
	Ok(())
}

/// Loans visible to a viewer: `None` lists everyone's.
pub async fn list(db: &DB, officer: Option<Uid>, settings: &Settings) -> AppResult<Vec<Borrower>> {
	let rows = match officer {
		Some(uid) => {
			sqlx::query_as::<_, BorrowerQuery>(&format!(
				"{BORROWER_SELECT} WHERE br.officer_id = ? ORDER BY br.return_date, b.title"
			))
				.bind(uid)
				.fetch_all(db)
				.await?
		},
		None => {
			sqlx::query_as::<_, BorrowerQuery>(&format!(
				"{BORROWER_SELECT} ORDER BY br.return_date, b.title"
			))
				.fetch_all(db)
				.await?
		},
	};

	let today = today();
	Ok(rows
		.into_iter()
		.map(|row| Borrower::from_query(row, today, settings.fine_per_day))
		.collect())
}

pub async fn find(db: &DB, id: LoanId, settings: &Settings) -> AppResult<Borrower> {
	let row = sqlx::query_as::<_, BorrowerQuery>(&format!("{BORROWER_SELECT} WHERE br.id = ?"))
		.bind(id)
		.fetch_optional(db)
		.await?
		.ok_or_else(|| AppError::NotFound("borrower".to_string()))?;
	Ok(Borrower::from_query(row, today(), settings.fine_per_day))
}

/// Lends a copy to an officer. Nothing is written when the book is out of stock.
pub async fn create(db: &DB, form: NewBorrowerForm, settings: &Settings) -> AppResult<LoanId> {
	let issue_date = form.issue_date.unwrap_or_else(today);
	let return_date = form.return_date.unwrap_or(issue_date + settings.loan_period());
	check_dates(issue_date, return_date)?;

	let mut tx = db.begin().await?;
	checkout(&mut *tx, form.book).await?;
	if !accounts::exists(&mut *tx, form.officer).await? {
		return Err(AppError::NotFound("officer".to_string()));
	}

	let id = Uuid::new_v4();
	sqlx::query(
		"INSERT INTO borrowers (id, officer_id, book_id, issue_date, return_date)
		VALUES (?, ?, ?, ?, ?)"
	)
		.bind(id)
		.bind(form.officer)
		.bind(form.book)
		.bind(issue_date)
		.bind(return_date)
		.execute(&mut *tx)
		.await?;
	tx.commit().await?;

	tracing::info!(loan = %id, officer = %form.officer, book = %form.book, %return_date, "book checked out");
	Ok(id)
}

pub async fn update(db: &DB, id: LoanId, form: BorrowerUpdateForm) -> AppResult<()> {
	let mut tx = db.begin().await?;

	// no-op write: holds the write lock while the loan is read
	let (officer, book, issue_date, return_date): (Uid, Bid, NaiveDate, NaiveDate) = sqlx::query_as(
		"UPDATE borrowers SET return_date = return_date WHERE id = ?
		RETURNING officer_id, book_id, issue_date, return_date"
	)
		.bind(id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or_else(|| AppError::NotFound("borrower".to_string()))?;

	let new_officer = form.officer.unwrap_or(officer);
	let new_book = form.book.unwrap_or(book);
	let new_issue = form.issue_date.unwrap_or(issue_date);
	let new_return = form.return_date.unwrap_or(return_date);
	check_dates(new_issue, new_return)?;

	if new_officer != officer && !accounts::exists(&mut *tx, new_officer).await? {
		return Err(AppError::NotFound("officer".to_string()));
	}
	if new_book != book {
		give_back(&mut *tx, book).await?;
		checkout(&mut *tx, new_book).await?;
	}

	sqlx::query(
		"UPDATE borrowers SET officer_id = ?, book_id = ?, issue_date = ?, return_date = ?
		WHERE id = ?"
	)
		.bind(new_officer)
		.bind(new_book)
		.bind(new_issue)
		.bind(new_return)
		.bind(id)
		.execute(&mut *tx)
		.await?;
	tx.commit().await?;

	tracing::info!(loan = %id, book = %new_book, "loan updated");
	Ok(())
}

/// Closes a loan, putting the copy back on the shelf.
pub async fn delete(db: &DB, id: LoanId) -> AppResult<()> {
	let mut tx = db.begin().await?;

	let (book,): (Bid,) = sqlx::query_as("DELETE FROM borrowers WHERE id = ? RETURNING book_id")
		.bind(id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or_else(|| AppError::NotFound("borrower".to_string()))?;
	give_back(&mut *tx, book).await?;
	tx.commit().await?;

	tracing::info!(loan = %id, %book, "book returned");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn return_date_may_equal_issue_date() {
		let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		assert!(check_dates(day, day).is_ok());
	}

	#[test]
	fn return_date_before_issue_date_is_refused() {
		let issue = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
		let back = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		assert!(matches!(check_dates(issue, back), Err(AppError::Unprocessable(_))));
	}
}
