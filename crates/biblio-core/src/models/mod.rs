//! Data models for the library API.
//!
//! This module contains the records exchanged with the server:
//!
//! - `User`: account record, including the `is_admin` role flag
//! - `Book`: catalog entry with stock and availability counts
//! - `Loan`: a borrowing, with due date and overdue tracking
//! - `Category`: catalog grouping
//! - `Pagination`: paging metadata attached to every list response
//!
//! The server speaks French field names; serde renames map them onto
//! the Rust names used throughout the crate.

pub mod book;
pub mod category;
pub mod loan;
pub mod pagination;
pub mod user;

pub use book::{Book, BookInput, BookUpdate};
pub use category::{Category, CategoryInput};
pub use loan::{Loan, LoanRequest};
pub use pagination::Pagination;
pub use user::{Credentials, PasswordChange, ProfileUpdate, Registration, User};
