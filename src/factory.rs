//! The factory-name registry and its per-archive recorders.
//!
//! Polymorphic resources are stored behind a name-indexed factory table.
//! Three pieces cooperate:
//!
//! - The **global registry**: a process-wide bidirectional
//!   `name ↔ factory` map. The host populates it at startup
//!   ([`register_factory`]); it is read-only during decode, so population
//!   must complete before the first archive is opened.
//! - [`FactorySet`]: the encode-side recorder. Collects, in
//!   first-appearance order, the canonical name of every factory a
//!   flattenable write touches; the buffer stores the returned index.
//! - [`FactoryPlayback`]: the decode-side table built from the archive's
//!   factory section. Unresolved names stay `None` and only fail the
//!   archive if a resource actually instantiates them.

use crate::flatten::FlattenableFactory;
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, FlattenableFactory>,
    by_factory: HashMap<usize, String>,
}

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::default()));

/// Registers a factory under its canonical name.
///
/// Append-only; re-registering a name replaces its factory. Must complete
/// before any decode begins.
pub fn register_factory(name: &str, factory: FlattenableFactory) {
    if let Ok(mut registry) = REGISTRY.write() {
        registry.by_name.insert(name.to_owned(), factory);
        registry.by_factory.insert(factory as usize, name.to_owned());
    }
}

/// Resolves a canonical name to its factory, if registered.
pub fn name_to_factory(name: &str) -> Option<FlattenableFactory> {
    REGISTRY.read().ok()?.by_name.get(name).copied()
}

/// Resolves a factory back to its canonical name, if registered.
pub fn factory_to_name(factory: FlattenableFactory) -> Option<String> {
    REGISTRY.read().ok()?.by_factory.get(&(factory as usize)).cloned()
}

/// Encode-side recorder of referenced factory names.
///
/// Indices handed out are 1-based: the buffer reserves 0 for "no
/// flattenable".
#[derive(Debug, Default)]
pub struct FactorySet {
    names: Vec<String>,
    indices: HashMap<String, u32>,
}

impl FactorySet {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a name, deduplicating, and returns its 1-based index.
    pub fn record(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        self.names.push(name.to_owned());
        let index = self.names.len() as u32;
        self.indices.insert(name.to_owned(), index);
        index
    }

    /// Number of distinct names recorded.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// The recorded names, in first-appearance order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Decode-side `index → factory` table sized by the factory section.
#[derive(Debug, Default)]
pub struct FactoryPlayback {
    factories: Vec<Option<FlattenableFactory>>,
}

impl FactoryPlayback {
    /// Creates a table with `count` unresolved slots.
    pub fn with_count(count: usize) -> Self {
        Self { factories: vec![None; count] }
    }

    /// Resolves slot `index`; `None` marks a name with no registration.
    pub fn set(&mut self, index: usize, factory: Option<FlattenableFactory>) {
        if let Some(slot) = self.factories.get_mut(index) {
            *slot = factory;
        }
    }

    /// Looks up slot `index`. Returns `None` for out-of-range indices and
    /// for names that never resolved.
    pub fn get(&self, index: usize) -> Option<FlattenableFactory> {
        self.factories.get(index).copied().flatten()
    }

    /// Number of slots.
    pub fn count(&self) -> usize {
        self.factories.len()
    }
}
