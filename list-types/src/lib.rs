//! # list-types
//!
//! Shared vocabulary for the reslist data-access layer.
//!
//! This crate provides the types used across all reslist crates:
//! - [`Record`], [`RecordId`] - Opaque records and their identifiers
//! - [`ExtractionResult`], [`Extractor`], [`KeyExtractor`] - Normalizing raw service responses
//! - [`RemoteError`] - Failures reported by remote collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod extract;
mod ids;

pub use error::RemoteError;
pub use extract::{ExtractionResult, Extractor, GetDataParams, KeyExtractor, DEFAULT_DATA_KEY};
pub use ids::{Record, RecordId};
