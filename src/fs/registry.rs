use std::collections::HashMap;
use std::sync::Arc;

use super::{FilePath, PathFactory};
use crate::io::{DiskPathFactory, LocalFileSource};
use crate::zipfs::ZipPathFactory;

/// Table of path factories keyed by scheme.
///
/// A path string of the form `scheme:rest` goes to the factory registered
/// for `scheme`; anything else, including Windows drive letters such as
/// `C:\data`, goes to the default factory.
pub struct Registry {
    factories: HashMap<&'static str, Arc<dyn PathFactory>>,
    default: Arc<dyn PathFactory>,
}

impl Registry {
    pub fn new(default: Arc<dyn PathFactory>) -> Self {
        Self {
            factories: HashMap::new(),
            default,
        }
    }

    /// Disk paths as the default (also reachable as `file:`), plus `zip:`
    /// archives opened from the local filesystem.
    pub fn with_defaults() -> Self {
        let disk: Arc<dyn PathFactory> = Arc::new(DiskPathFactory);
        let mut registry = Self::new(disk.clone());
        registry.register(disk);
        registry.register(Arc::new(ZipPathFactory::new(Arc::new(LocalFileSource))));
        registry
    }

    /// Register a factory, replacing any previous one for the same scheme.
    pub fn register(&mut self, factory: Arc<dyn PathFactory>) {
        log::debug!("registering path scheme {}", factory.scheme());
        self.factories.insert(factory.scheme(), factory);
    }

    pub fn unregister(&mut self, scheme: &str) -> bool {
        self.factories.remove(scheme).is_some()
    }

    /// Resolve a path string to the provider owning its scheme.
    pub fn path(&self, raw: &str) -> Box<dyn FilePath> {
        self.factory_for(raw).path(raw)
    }

    fn factory_for(&self, raw: &str) -> &Arc<dyn PathFactory> {
        match raw.find(':') {
            // single letters are drive letters, not schemes
            Some(idx) if idx >= 2 => self.factories.get(&raw[..idx]).unwrap_or(&self.default),
            _ => &self.default,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
