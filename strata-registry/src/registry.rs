use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use strata_core::ConfigResult;
use tracing::debug;

use crate::checks;
use crate::error::{RegistryError, Result};
use crate::readers;

/// Reads the raw bytes behind a source descriptor
pub type ReadFn = Arc<dyn Fn(&str) -> ConfigResult<Vec<u8>> + Send + Sync>;

/// Validates a single string argument
pub type CheckFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Compiles a parameter into a check; `None` when the parameter is malformed
pub type CheckFactory = Arc<dyn Fn(&str) -> Option<CheckFn> + Send + Sync>;

/// Scheme used when a descriptor has no scheme or no reader matches it
pub const DEFAULT_READER: &str = "default";

static GLOBAL: Lazy<Arc<FunctionRegistry>> =
    Lazy::new(|| Arc::new(FunctionRegistry::with_builtins()));

/// Process-wide registry, populated with the built-ins on first use
pub fn global() -> Arc<FunctionRegistry> {
    GLOBAL.clone()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Reader,
    Check,
    CheckFactory,
}

#[derive(Clone)]
pub enum RegistryEntry {
    Reader(ReadFn),
    Check(CheckFn),
    CheckFactory(CheckFactory),
}

impl RegistryEntry {
    pub fn kind(&self) -> RegistryKind {
        match self {
            RegistryEntry::Reader(_) => RegistryKind::Reader,
            RegistryEntry::Check(_) => RegistryKind::Check,
            RegistryEntry::CheckFactory(_) => RegistryKind::CheckFactory,
        }
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryEntry::{:?}", self.kind())
    }
}

/// Named readers, check predicates and check factories.
///
/// Each map sits behind its own lock, so registration and lookup are safe
/// from any thread at any point of the process lifetime. Entries are shared
/// by all consumers; there is no removal.
#[derive(Default)]
pub struct FunctionRegistry {
    readers: RwLock<HashMap<String, ReadFn>>,
    checks: RwLock<HashMap<String, CheckFn>>,
    factories: RwLock<HashMap<String, CheckFactory>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("readers", &self.reader_schemes())
            .field("checks", &self.check_names())
            .field("factories", &self.check_factory_names())
            .finish()
    }
}

impl FunctionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in readers and checks
    pub fn with_builtins() -> Self {
        let registry = Self::new();

        let file: ReadFn = Arc::new(readers::file::read_file);
        registry.register_reader(DEFAULT_READER, file.clone());
        registry.register_reader("file", file);

        #[cfg(feature = "http")]
        {
            let http: ReadFn = Arc::new(readers::http::read_http);
            registry.register_reader("http", http.clone());
            registry.register_reader("https", http);
        }

        registry.register_check("isnum", Arc::new(checks::isnum));
        registry.register_check_factory("min", Arc::new(checks::min));
        registry.register_check_factory("regexp", Arc::new(checks::regexp));

        registry
    }

    /// Independent registry holding the entries registered here so far.
    ///
    /// Later registrations on either side are not shared.
    pub fn snapshot(&self) -> Self {
        Self {
            readers: RwLock::new(self.readers.read().clone()),
            checks: RwLock::new(self.checks.read().clone()),
            factories: RwLock::new(self.factories.read().clone()),
        }
    }

    /// Insert or replace an entry of any kind
    pub fn register(&self, name: impl Into<String>, entry: RegistryEntry) {
        match entry {
            RegistryEntry::Reader(f) => self.register_reader(name, f),
            RegistryEntry::Check(f) => self.register_check(name, f),
            RegistryEntry::CheckFactory(f) => self.register_check_factory(name, f),
        }
    }

    pub fn lookup(&self, kind: RegistryKind, name: &str) -> Option<RegistryEntry> {
        match kind {
            RegistryKind::Reader => self.reader(name).map(RegistryEntry::Reader),
            RegistryKind::Check => self.check(name).map(RegistryEntry::Check),
            RegistryKind::CheckFactory => self.check_factory(name).map(RegistryEntry::CheckFactory),
        }
    }

    pub fn register_reader(&self, scheme: impl Into<String>, reader: ReadFn) {
        let scheme = scheme.into();
        debug!("Registering config reader for scheme '{}'", scheme);
        self.readers.write().insert(scheme, reader);
    }

    pub fn reader(&self, scheme: &str) -> Option<ReadFn> {
        self.readers.read().get(scheme).cloned()
    }

    /// Reader for `scheme`, falling back to the default reader
    pub fn reader_for_scheme(&self, scheme: Option<&str>) -> Option<ReadFn> {
        let readers = self.readers.read();
        scheme
            .and_then(|s| readers.get(s))
            .or_else(|| readers.get(DEFAULT_READER))
            .cloned()
    }

    pub fn register_check(&self, name: impl Into<String>, check: CheckFn) {
        let name = name.into();
        debug!("Registering check function '{}'", name);
        self.checks.write().insert(name, check);
    }

    pub fn check(&self, name: &str) -> Option<CheckFn> {
        self.checks.read().get(name).cloned()
    }

    pub fn register_check_factory(&self, name: impl Into<String>, factory: CheckFactory) {
        let name = name.into();
        debug!("Registering check factory '{}'", name);
        self.factories.write().insert(name, factory);
    }

    pub fn check_factory(&self, name: &str) -> Option<CheckFactory> {
        self.factories.read().get(name).cloned()
    }

    /// Resolve a check expression.
    ///
    /// `name` looks up a registered check; `name:param` compiles `param`
    /// with the factory registered under `name`.
    pub fn compile_check(&self, expr: &str) -> Result<CheckFn> {
        match expr.split_once(':') {
            None => self
                .check(expr)
                .ok_or_else(|| RegistryError::UnknownCheck(expr.to_string())),
            Some((name, parameter)) => {
                let factory = self
                    .check_factory(name)
                    .ok_or_else(|| RegistryError::UnknownCheck(name.to_string()))?;
                factory(parameter).ok_or_else(|| RegistryError::MalformedCheckParameter {
                    name: name.to_string(),
                    parameter: parameter.to_string(),
                })
            }
        }
    }

    pub fn reader_schemes(&self) -> Vec<String> {
        sorted_keys(&self.readers.read())
    }

    pub fn check_names(&self) -> Vec<String> {
        sorted_keys(&self.checks.read())
    }

    pub fn check_factory_names(&self) -> Vec<String> {
        sorted_keys(&self.factories.read())
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}
