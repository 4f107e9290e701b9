//! Content source resolution for the yoink composer.
//!
//! An include directive names a *locator*: either a filesystem path
//! (resolved relative to the including document) or an `http://`/`https://`
//! address. This crate classifies locators, produces the canonical source
//! name used for cycle detection and diagnostics, and fetches the content.
//!
//! # Example
//!
//! ```
//! use yoink_source::Locator;
//!
//! let locator = Locator::classify("./child.txt", "/docs/parent.txt");
//! assert_eq!(locator, Locator::Local("/docs/./child.txt".into()));
//! assert_eq!(locator.canonical_name(), "/docs/child.txt");
//! ```

mod fetch;
mod locator;

pub use fetch::{SourceError, SourceErrorKind, create_agent};
pub use locator::{Locator, canonical_source_name};

// Re-exported so callers can hold a pooled agent without a direct ureq
// dependency.
pub use ureq::Agent;
