pub mod accounts;
pub mod books;
pub mod borrowers;
pub mod catalog;
pub mod registrations;
