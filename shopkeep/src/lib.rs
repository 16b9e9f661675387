// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::module_name_repetitions)] // ValidationErrors, UserForm etc. - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self by design
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::exhaustive_enums)] // Outcome enums are matched by page handlers
#![allow(clippy::exhaustive_structs)] // Rows and notices are plain data

//! # shopkeep - admin panel core
//!
//! Data access and form validation for a small e-commerce admin panel.
//!
//! - [`records`] - the data-access façade page handlers call: select,
//!   aggregate, insert, update, status flips and the guarded
//!   [`delete_entity`](records::delete_entity) flow.
//! - [`validation`] - rule-based form validation with uniqueness checks.
//! - [`users`] and [`categories`] - the two admin sections built on top.
//! - [`db`] - the [`Database`](db::Database) collaborator and its SQLite
//!   implementation.
//!
//! Every statement is rendered by [`shopkeep_sql`], so table and column
//! names pass an allowlist and every value is bound.
//!
//! ## Quick Start
//!
//! ```
//! use shopkeep::categories::{self, CategoryForm};
//! use shopkeep::db::SqliteDatabase;
//! use shopkeep::validation::{Submission, Validator};
//!
//! # fn main() -> shopkeep::Result<()> {
//! let db = SqliteDatabase::open_in_memory()?;
//! db.initialize_schema()?;
//! let validator = Validator::new();
//!
//! let Submission::Saved(books) =
//!     categories::insert_category(&db, &validator, &CategoryForm::new("Books"))?
//! else {
//!     unreachable!();
//! };
//!
//! let rejected = categories::insert_category(&db, &validator, &CategoryForm::new("Books"))?;
//! assert_eq!(
//!     rejected.errors().map(|e| e.messages("name")),
//!     Some(vec!["Name already in use.".to_string()])
//! );
//! assert!(categories::find_category(&db, books)?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod categories;
pub mod config;
pub mod db;
mod error;
pub mod log;
pub mod password;
pub mod records;
pub mod status;
pub mod users;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};

#[cfg(test)]
mod api_contracts {
    use static_assertions::assert_impl_all;

    // A validator is built once and shared by request handlers
    assert_impl_all!(crate::validation::Validator: Send, Sync, Default, std::fmt::Debug);

    assert_impl_all!(crate::validation::ValidationErrors: Clone, PartialEq, Eq, Default, std::fmt::Display);
    assert_impl_all!(crate::validation::Violation: Clone, PartialEq, Eq, std::fmt::Display);
    assert_impl_all!(crate::validation::Rule: Clone, PartialEq, Eq, std::str::FromStr);
    assert_impl_all!(crate::records::DeleteOutcome: Clone, PartialEq, Eq, std::fmt::Debug);

    // Status flags are Copy and convert into bound values
    assert_impl_all!(crate::status::Visibility: Copy, Eq, TryFrom<i64>, Into<shopkeep_sql::Value>);
    assert_impl_all!(crate::status::TrustStatus: Copy, Eq, TryFrom<i64>, Into<shopkeep_sql::Value>);
    assert_impl_all!(crate::status::RegStatus: Copy, Eq, TryFrom<i64>, Into<shopkeep_sql::Value>);

    // Errors work with `?` into boxed errors
    assert_impl_all!(crate::Error: std::error::Error, Send, Sync);
    assert_impl_all!(crate::config::Config: Clone, PartialEq, std::fmt::Debug);
}
