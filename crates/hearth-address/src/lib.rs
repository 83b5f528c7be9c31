//! Hearth Address - canonicalization and record matching.
//!
//! Addresses arrive in many near-equivalent spellings ("St" vs "Street",
//! stray commas, trailing zip or not); the record store keys rows by a plain
//! address string. This crate provides the pure normalization layer and the
//! variant-priority matcher that bridges the two. No network or store access
//! happens here.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod canonical;
pub mod matcher;

pub use canonical::{normalize, split_street_zip, variants};
pub use matcher::{match_rows, MatchResult};
