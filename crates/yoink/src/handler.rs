//! Directive handler contract.
//!
//! A handler turns one directive line into replacement text. Stateless
//! handlers are plain functions wrapped in [`ParserFn`]; stateful handlers
//! implement [`Parser`] on a type with interior mutability. The engine may
//! invoke a handler from several threads at once and provides no mutual
//! exclusion around invocations — a stateful handler serializes its own
//! mutations (typically with a `Mutex`).

use std::sync::Arc;

/// Error type handlers report; the engine wraps it with source name and
/// line number.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A directive handler.
///
/// `input_line` is the trimmed directive line including the marker and
/// command (e.g. `".hello Ada"`), `line_number` is 1-based, and
/// `source_name` is the canonical name of the document being resolved.
pub trait Parser: Send + Sync {
    fn parse(
        &self,
        source_name: &str,
        line_number: usize,
        input_line: &str,
    ) -> Result<String, BoxError>;
}

impl<P: Parser + ?Sized> Parser for Arc<P> {
    fn parse(
        &self,
        source_name: &str,
        line_number: usize,
        input_line: &str,
    ) -> Result<String, BoxError> {
        (**self).parse(source_name, line_number, input_line)
    }
}

/// Adapter making a function or closure a stateless [`Parser`].
pub struct ParserFn<F>(F);

impl<F> ParserFn<F>
where
    F: Fn(&str, usize, &str) -> Result<String, BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Parser for ParserFn<F>
where
    F: Fn(&str, usize, &str) -> Result<String, BoxError> + Send + Sync,
{
    fn parse(
        &self,
        source_name: &str,
        line_number: usize,
        input_line: &str,
    ) -> Result<String, BoxError> {
        (self.0)(source_name, line_number, input_line)
    }
}
