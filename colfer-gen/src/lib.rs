//! Generate Rust record types for Colfer schemas.
//!
//! # Overview
//!
//! A schema arrives as an in-memory [`Package`]: an ordered list of
//! struct definitions whose fields carry a tag index, a declared kind
//! and a list flag. [`generate`] validates the model and renders one
//! Rust module with a struct definition and a `colfer::Record` impl per
//! schema struct. The rendered types depend on the `colfer` runtime
//! crate and `bytes`.
//!
//! # Example
//!
//! ```
//! use colfer_gen::{generate, Field, Kind, Options, Package, Struct};
//!
//! let package = Package::new(
//!     "metrics",
//!     vec![Struct::new(
//!         "sample",
//!         vec![
//!             Field::new(0, "taken", Kind::Timestamp),
//!             Field::new(1, "mean", Kind::Float64),
//!         ],
//!     )],
//! );
//! let source = generate(&package, &Options::default())?;
//! assert!(source.contains("pub struct Sample"));
//! assert!(source.contains("impl Record for Sample"));
//! # Ok::<(), colfer_gen::SchemaError>(())
//! ```

mod rust;
mod schema;

pub use rust::{generate, Options};
pub use schema::{Field, Kind, Package, SchemaError, Struct};
