//! Name-to-handler registry.
//!
//! A [`Registry`] maps directive names to handlers. The process-wide
//! default registry backs [`register_parser`](crate::register_parser) and
//! [`register_parser_func`](crate::register_parser_func); it is populated
//! during setup, and each parse call works on a snapshot of it so
//! resolution never touches the lock.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::handler::{BoxError, Parser, ParserFn};

/// Name of the built-in include directive. Reserved; cannot be registered.
pub const INCLUDE_DIRECTIVE: &str = "yoink";

/// Registration failure.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The name is already bound. Shadowing an existing handler is not
    /// allowed; pick another name.
    #[error("directive {0:?} is already registered")]
    Duplicate(String),
    /// The name is reserved for the built-in include directive.
    #[error("directive {0:?} is reserved")]
    Reserved(String),
}

/// Mapping from directive name to handler.
#[derive(Clone, Default)]
pub struct Registry {
    parsers: HashMap<String, Arc<dyn Parser>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`.
    pub fn register<P: Parser + 'static>(
        &mut self,
        name: &str,
        parser: P,
    ) -> Result<(), RegistryError> {
        if name == INCLUDE_DIRECTIVE {
            return Err(RegistryError::Reserved(name.to_owned()));
        }
        match self.parsers.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(name.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(parser));
                Ok(())
            }
        }
    }

    /// Register a stateless handler function under `name`.
    pub fn register_fn<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: Fn(&str, usize, &str) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.register(name, ParserFn::new(f))
    }

    /// Look up the handler bound to `name`.
    ///
    /// `None` is not fatal by itself; the engine decides how an
    /// unrecognized directive is reported.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Parser>> {
        self.parsers.get(name).map(Arc::clone)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

static GLOBAL: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

/// Register a stateful handler in the process-wide registry.
pub fn register_parser<P: Parser + 'static>(name: &str, parser: P) -> Result<(), RegistryError> {
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, parser)
}

/// Register a stateless handler function in the process-wide registry.
pub fn register_parser_func<F>(name: &str, f: F) -> Result<(), RegistryError>
where
    F: Fn(&str, usize, &str) -> Result<String, BoxError> + Send + Sync + 'static,
{
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_fn(name, f)
}

/// Snapshot of the process-wide registry, taken once per parse call.
pub(crate) fn global_snapshot() -> Registry {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
