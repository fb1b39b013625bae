//! Persist plain Rust records to SQL tables.
//!
//! A record type derives [`Entity`] and is wrapped in a [`Record`], which loads,
//! inserts, updates and deletes it through any [`Connection`]:
//!
//! ```rust,ignore
//! use tabula::{Entity, Record, mapping};
//!
//! #[derive(Entity, Clone, Debug)]
//! struct User {
//!     #[tabula(id)]
//!     id: i64,
//!     #[tabula(column = "name")]
//!     name: String,
//!     #[tabula(column = "age")]
//!     age: i32,
//! }
//!
//! let mut record = Record::new(User { id: 0, name: "Ann".into(), age: 30 });
//! record.save(&mut connection).await?;
//! assert!(record.exists(&mut connection, &mapping! { "name" => "Ann" }).await);
//! ```
pub use ::tabula_core::*;
pub use ::tabula_macros::Entity;
