//! Directive-driven document composition.
//!
//! A document is resolved line by line: lines of the form `.command args`
//! dispatch to a registered [`Parser`] and are replaced by its output,
//! everything else passes through untouched. The built-in `.yoink`
//! directive splices another document — a local path or an `http(s)://`
//! locator — in place of the line, resolving that document's own
//! directives first.
//!
//! # Architecture
//!
//! 1. The scanner classifies each line as text or a directive invocation.
//! 2. The engine resolves all lines of a document concurrently on the
//!    rayon pool and reassembles results by original line position, so
//!    output order is deterministic regardless of completion order.
//! 3. Includes recurse through the same engine, carrying an inclusion
//!    stack for cycle detection and a shared cancellation signal that the
//!    first fatal error trips.
//!
//! Handlers are registered once per name during setup, either in the
//! process-wide registry ([`register_parser_func`], [`register_parser`])
//! or in an explicit [`Registry`] passed to [`parse_with_registry`].
//!
//! # Example
//!
//! ```
//! use yoink::{CancellationToken, ParseOptions, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_fn("hello", |_: &str, line: usize, raw: &str| {
//!         let subject = raw.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
//!         Ok(format!("{line}. Hello, {subject}!"))
//!     })
//!     .unwrap();
//!
//! let input = "line one\n.hello Ada\nline two\n";
//! let resolved = yoink::parse_with_registry(
//!     &CancellationToken::new(),
//!     input.as_bytes(),
//!     "demo.txt",
//!     &registry,
//!     ParseOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(resolved, "line one\n2. Hello, Ada!\nline two\n");
//! ```

mod cancel;
mod engine;
mod error;
mod handler;
mod registry;
mod scanner;

pub use cancel::CancellationToken;
pub use engine::ParseOptions;
pub use error::Error;
pub use handler::{BoxError, Parser, ParserFn};
pub use registry::{
    INCLUDE_DIRECTIVE, Registry, RegistryError, register_parser, register_parser_func,
};

use std::io::Read;

/// Resolve a document end to end against the process-wide registry.
///
/// Reads `reader` fully, then resolves every directive; `source_name`
/// locates the document for relative includes and error attribution. On
/// any failure the whole call fails — no partial output is produced.
pub fn parse<R: Read>(
    token: &CancellationToken,
    reader: R,
    source_name: &str,
) -> Result<String, Error> {
    parse_with_options(token, reader, source_name, ParseOptions::default())
}

/// [`parse`] with explicit [`ParseOptions`].
pub fn parse_with_options<R: Read>(
    token: &CancellationToken,
    reader: R,
    source_name: &str,
    options: ParseOptions,
) -> Result<String, Error> {
    parse_with_registry(
        token,
        reader,
        source_name,
        &registry::global_snapshot(),
        options,
    )
}

/// [`parse`] against an explicit registry, bypassing process-wide state.
pub fn parse_with_registry<R: Read>(
    token: &CancellationToken,
    mut reader: R,
    source_name: &str,
    registry: &Registry,
    options: ParseOptions,
) -> Result<String, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(Error::Read)?;

    let ctx = engine::ResolveContext::new(registry.clone(), token.clone(), options);
    engine::resolve_document(&ctx, &text, source_name)
}
