//! # list-core
//!
//! Pure state for reslist (no I/O, instant tests).
//!
//! This crate holds the state-synchronization rules of the data-access layer
//! without any network calls or async runtime, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`Collection`] applies local mutations to the in-memory records
//! - [`PageCursor`] folds extracted pagination into the current cursor
//! - [`FetchState`] admits or rejects fetch attempts and applies their results
//! - [`MutationFlags`] tracks in-flight add/update/delete operations
//!
//! The actual I/O (calling the remote service) is performed by `list-client`,
//! which drives these types around each awaited call.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod cursor;
pub mod mutation;
pub mod state;

pub use collection::{Collection, InsertPosition, DEFAULT_ID_KEY};
pub use cursor::PageCursor;
pub use mutation::{MutationFlags, MutationKind};
pub use state::{Completion, FetchExclusion, FetchMode, FetchState, FetchStatus, FetchTicket};
