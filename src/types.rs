use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Uid = Uuid;
pub type Bid = Uuid;
pub type LoanId = Uuid;
pub type GenreId = i64;
pub type LanguageId = i64;
pub type FormId = i64;

/// Lowercases the domain part of an address, leaving the local part as typed.
pub fn normalize_email(email: &str) -> String {
	let email = email.trim();
	match email.rsplit_once('@') {
		Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
		None => email.to_string(),
	}
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
	pub id: Uid,
	pub email: String,
	pub name: String,
	pub username: String,
	pub ba_no: Option<i64>,
	pub date_joined: DateTime<Utc>,
	pub last_login: Option<DateTime<Utc>>,
	pub is_admin: bool,
	pub is_active: bool,
	pub is_staff: bool,
	pub is_superuser: bool,
}

impl Account {
	/// Admin-only operations are open to active admins and superusers.
	pub fn has_perm(&self) -> bool {
		self.is_active && (self.is_admin || self.is_superuser)
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountQuery {
	#[sqlx(flatten)]
	pub account: Account,
	pub pass_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Genre {
	pub id: GenreId,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Language {
	pub id: LanguageId,
	pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Book {
	pub id: Bid,
	pub title: String,
	pub author: String,
	pub summary: String,
	pub isbn: String,
	pub genres: Vec<Genre>,
	pub language: Option<Language>,
	pub total_copies: i64,
	pub available_copies: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookQuery {
	pub id: Bid,
	pub title: String,
	pub author: String,
	pub summary: String,
	pub isbn: String,
	pub language_id: Option<LanguageId>,
	pub language_name: Option<String>,
	pub total_copies: i64,
	pub available_copies: i64,
}

impl Book {
	pub fn from_query(info: BookQuery, genres: Vec<Genre>) -> Self {
		let language = match (info.language_id, info.language_name) {
			(Some(id), Some(name)) => Some(Language { id, name }),
			_ => None,
		};
		Book {
			id: info.id,
			title: info.title,
			author: info.author,
			summary: info.summary,
			isbn: info.isbn,
			genres,
			language,
			total_copies: info.total_copies,
			available_copies: info.available_copies,
		}
	}

	pub fn on_loan(&self) -> i64 {
		self.total_copies - self.available_copies
	}
}

/// Where a loan stands relative to its return date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoanStatus {
	OnLoan,
	DueToday,
	Overdue { days: i64 },
}

impl LoanStatus {
	pub fn at(return_date: NaiveDate, today: NaiveDate) -> Self {
		let days = (today - return_date).num_days();
		match days {
			d if d < 0 => LoanStatus::OnLoan,
			0 => LoanStatus::DueToday,
			d => LoanStatus::Overdue { days: d },
		}
	}

	pub fn fine(self, per_day: i64) -> i64 {
		match self {
			LoanStatus::Overdue { days } => per_day * days,
			_ => 0,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct OfficerRef {
	pub id: Uid,
	pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookRef {
	pub id: Bid,
	pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Borrower {
	pub id: LoanId,
	pub officer: OfficerRef,
	pub book: BookRef,
	pub issue_date: NaiveDate,
	pub return_date: NaiveDate,
	pub status: LoanStatus,
	pub fine: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BorrowerQuery {
	pub id: LoanId,
	pub officer_id: Uid,
	pub officer_name: String,
	pub book_id: Bid,
	pub book_title: String,
	pub issue_date: NaiveDate,
	pub return_date: NaiveDate,
}

impl Borrower {
	pub fn from_query(info: BorrowerQuery, today: NaiveDate, fine_per_day: i64) -> Self {
		let status = LoanStatus::at(info.return_date, today);
		Borrower {
			id: info.id,
			officer: OfficerRef { id: info.officer_id, name: info.officer_name },
			book: BookRef { id: info.book_id, title: info.book_title },
			issue_date: info.issue_date,
			return_date: info.return_date,
			status,
			fine: status.fine(fine_per_day),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct InformationForm {
	pub id: FormId,
	pub email: String,
	pub name: String,
	pub username: String,
	pub officer: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FormLogin {
	#[garde(length(chars, min = 1, max = 60))]
	pub email: String,
	#[garde(length(chars, min = 1))]
	pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FormRegister {
	#[garde(email, length(chars, max = 60))]
	pub email: String,
	#[garde(length(chars, min = 1, max = 60))]
	pub name: String,
	#[garde(length(chars, min = 1, max = 30))]
	pub username: String,
	#[garde(range(min = 0))]
	#[serde(default)]
	pub ba_no: Option<i64>,
	#[garde(length(chars, min = 8, max = 128))]
	pub password: String,
}

impl FormRegister {
	pub fn trimmed(mut self) -> Self {
		self.name = self.name.trim().to_string();
		self.username = self.username.trim().to_string();
		self
	}
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct OfficerUpdateForm {
	#[garde(email, length(chars, max = 60))]
	pub email: Option<String>,
	#[garde(length(chars, min = 1, max = 60))]
	pub name: Option<String>,
	#[garde(length(chars, min = 1, max = 30))]
	pub username: Option<String>,
	#[garde(range(min = 0))]
	pub ba_no: Option<i64>,
	#[garde(length(chars, min = 8, max = 128))]
	pub password: Option<String>,
	#[garde(skip)]
	pub is_admin: Option<bool>,
	#[garde(skip)]
	pub is_staff: Option<bool>,
	#[garde(skip)]
	pub is_active: Option<bool>,
}

impl OfficerUpdateForm {
	/// Trims the free-text fields so blanks fail the length rules.
	pub fn trimmed(mut self) -> Self {
		self.name = self.name.map(|name| name.trim().to_string());
		self.username = self.username.map(|username| username.trim().to_string());
		self
	}

	pub fn touches_flags(&self) -> bool {
		self.is_admin.is_some() || self.is_staff.is_some() || self.is_active.is_some()
	}
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookForm {
	#[garde(length(chars, min = 1, max = 200))]
	pub title: String,
	#[garde(length(chars, min = 1, max = 100))]
	pub author: String,
	#[garde(length(chars, max = 1000))]
	#[serde(default)]
	pub summary: String,
	#[garde(length(chars, min = 1, max = 13))]
	pub isbn: String,
	#[garde(skip)]
	#[serde(default)]
	pub genres: Vec<GenreId>,
	#[garde(skip)]
	#[serde(default)]
	pub language: Option<LanguageId>,
	#[garde(range(min = 0))]
	pub total_copies: i64,
	/// Only read on create; updates preserve the number of copies on loan.
	#[garde(range(min = 0))]
	#[serde(default)]
	pub available_copies: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NameForm {
	#[garde(length(chars, min = 1, max = 200))]
	pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBorrowerForm {
	#[garde(skip)]
	pub officer: Uid,
	#[garde(skip)]
	pub book: Bid,
	#[garde(skip)]
	#[serde(default)]
	pub issue_date: Option<NaiveDate>,
	#[garde(skip)]
	#[serde(default)]
	pub return_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct BorrowerUpdateForm {
	#[garde(skip)]
	pub officer: Option<Uid>,
	#[garde(skip)]
	pub book: Option<Bid>,
	#[garde(skip)]
	pub issue_date: Option<NaiveDate>,
	#[garde(skip)]
	pub return_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FormInformation {
	#[garde(email, length(chars, max = 60))]
	pub email: String,
	#[garde(length(chars, min = 1, max = 60))]
	pub name: String,
	#[garde(length(chars, min = 1, max = 30))]
	pub username: String,
	#[garde(skip)]
	#[serde(default)]
	pub officer: bool,
}

impl FormInformation {
	pub fn trimmed(mut self) -> Self {
		self.name = self.name.trim().to_string();
		self.username = self.username.trim().to_string();
		self
	}
}

#[derive(Debug, Deserialize, Validate)]
pub struct FormApprove {
	#[garde(length(chars, min = 8, max = 128))]
	pub password: String,
	#[garde(range(min = 0))]
	#[serde(default)]
	pub ba_no: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
	#[serde(rename = "search-area")]
	pub search_area: Option<String>,
}

impl SearchParams {
	pub fn input(&self) -> &str {
		self.search_area.as_deref().map(str::trim).unwrap_or_default()
	}
}
