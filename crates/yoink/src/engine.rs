//! Recursive, concurrency-coordinating document resolution.
//!
//! Every line of a document is an independent unit of work: plain text
//! resolves to itself, directive lines dispatch to their handler, and the
//! built-in include fetches and recursively resolves another document.
//! Units run on the rayon pool; the order-preserving collect stitches
//! results back by original line position, so output order is the input's
//! top-to-bottom order no matter how tasks interleave.
//!
//! The first fatal error trips a shared abort flag; outstanding units
//! observe it before fetching or dispatching and stand down. An inclusion
//! stack of canonical source names travels down each recursion path for
//! cycle detection; sibling branches carry independent copies, so the same
//! document may be included twice at different points of the tree.

use std::time::Duration;

use rayon::prelude::*;
use yoink_source::{Agent, Locator, canonical_source_name, create_agent};

use crate::cancel::CancellationToken;
use crate::error::Error;
use crate::registry::{INCLUDE_DIRECTIVE, Registry};
use crate::scanner::{self, LineRecord};

/// Configuration for a single parse call.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Global timeout applied to every remote fetch of the call.
    pub fetch_timeout: Duration,
    /// Safety cap on include nesting, for pathological non-cyclic trees
    /// that cycle detection cannot catch.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            max_depth: 64,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// State threaded through one top-level parse call.
///
/// Cloned per include branch: signals, registry snapshot, and agent are
/// shared; the inclusion stack is copied so branches cannot observe each
/// other's paths.
pub(crate) struct ResolveContext {
    registry: Registry,
    /// Caller-owned cancellation.
    token: CancellationToken,
    /// Tripped by the first fatal error inside this call.
    abort: CancellationToken,
    agent: Agent,
    options: ParseOptions,
    /// Canonical names of documents on the current recursion path.
    stack: Vec<String>,
}

impl ResolveContext {
    pub(crate) fn new(
        registry: Registry,
        token: CancellationToken,
        options: ParseOptions,
    ) -> Self {
        Self {
            registry,
            token,
            abort: CancellationToken::new(),
            agent: create_agent(options.fetch_timeout),
            options,
            stack: Vec::new(),
        }
    }

    /// Context for a nested document: shared signals, extended path.
    fn child(&self, canonical: String) -> Self {
        let mut stack = self.stack.clone();
        stack.push(canonical);
        Self {
            registry: self.registry.clone(),
            token: self.token.clone(),
            abort: self.abort.clone(),
            agent: self.agent.clone(),
            options: self.options.clone(),
            stack,
        }
    }

    fn cancelled(&self) -> bool {
        self.token.is_cancelled() || self.abort.is_cancelled()
    }
}

/// Resolve every directive of `text`, returning the stitched document.
pub(crate) fn resolve_document(
    ctx: &ResolveContext,
    text: &str,
    source_name: &str,
) -> Result<String, Error> {
    if ctx.cancelled() {
        return Err(Error::Cancelled);
    }

    let canonical = canonical_source_name(source_name);
    if let Some(pos) = ctx.stack.iter().position(|name| *name == canonical) {
        let mut path = ctx.stack[pos..].to_vec();
        path.push(canonical);
        return Err(Error::Cycle { path });
    }
    if ctx.stack.len() >= ctx.options.max_depth {
        return Err(Error::DepthExceeded {
            source_name: canonical,
            depth: ctx.options.max_depth,
        });
    }
    let ctx = ctx.child(canonical.clone());

    let records: Vec<LineRecord<'_>> = scanner::scan(text).collect();
    tracing::debug!(source = %canonical, lines = records.len(), "resolving document");

    let slots: Vec<Result<String, Error>> = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| resolve_line(&ctx, record, index + 1, &canonical))
        .collect();

    let mut lines = Vec::with_capacity(slots.len());
    let mut failure: Option<Error> = None;
    for slot in slots {
        match slot {
            Ok(resolved) => lines.push(resolved),
            Err(err) => {
                // Lowest-line real error wins; a task that merely observed
                // the abort flag never masks the error that tripped it.
                let replace = match &failure {
                    None => true,
                    Some(Error::Cancelled) => !matches!(err, Error::Cancelled),
                    Some(_) => false,
                };
                if replace {
                    failure = Some(err);
                }
            }
        }
    }
    if let Some(err) = failure {
        return Err(err);
    }

    let mut output = lines.join("\n");
    if text.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

/// Resolve one line-level unit of work.
fn resolve_line(
    ctx: &ResolveContext,
    record: &LineRecord<'_>,
    line_number: usize,
    source_name: &str,
) -> Result<String, Error> {
    match record {
        LineRecord::Text(text) => Ok((*text).to_owned()),
        LineRecord::Directive {
            command,
            argument,
            raw,
        } => {
            if ctx.cancelled() {
                return Err(Error::Cancelled);
            }

            let result = if *command == INCLUDE_DIRECTIVE {
                resolve_include(ctx, argument, source_name)
            } else {
                dispatch_handler(ctx, command, raw, line_number, source_name)
            };

            if let Err(err) = &result {
                if !matches!(err, Error::Cancelled) {
                    ctx.abort.cancel();
                }
            }
            result
        }
    }
}

/// Expand the built-in include directive: fetch, recurse, splice.
fn resolve_include(
    ctx: &ResolveContext,
    argument: &str,
    source_name: &str,
) -> Result<String, Error> {
    let locator = Locator::classify(argument, source_name);
    tracing::debug!(source = %source_name, locator = %locator, "expanding include");

    let content = locator.fetch(&ctx.agent)?;
    let mut expanded = resolve_document(ctx, &content, &locator.canonical_name())?;

    // The expansion replaces a single line; the final join re-adds the
    // separator, so the nested document's trailing newline is dropped.
    if expanded.ends_with('\n') {
        expanded.pop();
    }
    Ok(expanded)
}

fn dispatch_handler(
    ctx: &ResolveContext,
    command: &str,
    raw: &str,
    line_number: usize,
    source_name: &str,
) -> Result<String, Error> {
    let Some(parser) = ctx.registry.lookup(command) else {
        return Err(Error::UnknownDirective {
            command: command.to_owned(),
            source_name: source_name.to_owned(),
            line: line_number,
        });
    };

    parser
        .parse(source_name, line_number, raw)
        .map_err(|source| Error::Handler {
            command: command.to_owned(),
            source_name: source_name.to_owned(),
            line: line_number,
            source,
        })
}
