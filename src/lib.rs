//! Keeps generated API types in lockstep with prose API documentation.
//!
//! Translators ([`registry`]) describe documentation pages element by
//! element. The [`compare`] module checks those descriptions against the
//! live element stream and the [`schema`] builder accumulates the types the
//! matched elements describe. [`generate::run`] ties one run together and
//! returns an [`ir::Model`] for a renderer such as [`codegen`].
pub mod cli;
pub mod codegen;
pub mod compare;
pub mod element;
pub mod error;
pub mod generate;
pub mod ir;
pub mod lower;
pub mod registry;
pub mod schema;
pub mod source;
pub mod translators;

pub use error::GenError;
