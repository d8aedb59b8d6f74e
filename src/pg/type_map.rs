use std::collections::{HashMap, HashSet};

use crate::pg::cast::CastRegistry;
use crate::types::ScalarKind;

/// What a resolved type identifier decodes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgType {
    Scalar(ScalarKind),
    Array(ScalarKind),
}

/// Per-connection cache from backend type identifier to a castable kind.
///
/// The cache is filled by catalog lookups driven from the adapter; this
/// type only holds state. An OID that was looked up and stayed unresolved
/// is never looked up again for the connection's lifetime — resolution
/// failures are sticky.
#[derive(Debug, Clone)]
pub struct TypeMap {
    registry: CastRegistry,
    by_oid: HashMap<u32, ScalarKind>,
    array_elements_by_oid: HashMap<u32, ScalarKind>,
    queried_oids: HashSet<u32>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self {
            registry: CastRegistry::with_builtins(),
            by_oid: HashMap::new(),
            array_elements_by_oid: HashMap::new(),
            queried_oids: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &CastRegistry {
        &self.registry
    }

    pub fn register(&mut self, type_name: &str, kind: ScalarKind) {
        self.registry.register(type_name, kind);
    }

    /// Direct cache lookup, no I/O.
    pub fn lookup(&self, oid: u32) -> Option<PgType> {
        if let Some(kind) = self.by_oid.get(&oid) {
            return Some(PgType::Scalar(*kind));
        }
        self.array_elements_by_oid
            .get(&oid)
            .map(|kind| PgType::Array(*kind))
    }

    /// Mark `oid` as queried. Returns true the first time, false for an
    /// OID already queried on this connection.
    pub fn mark_queried(&mut self, oid: u32) -> bool {
        self.queried_oids.insert(oid)
    }

    /// Fold one row of the type catalog into the caches.
    ///
    /// A row whose name has a registered cast fills the direct cache and,
    /// through `typarray`, the array-element cache for its array type. A
    /// row that is itself an array type (`typelem` non-zero, name prefixed
    /// with `_`) fills the array-element cache for its own OID from the
    /// element type's name.
    pub fn absorb_catalog_row(&mut self, oid: u32, type_name: &str, typelem: u32, typarray: u32) {
        self.queried_oids.insert(oid);

        if let Some(kind) = self.registry.kind_for(type_name) {
            self.by_oid.insert(oid, kind);
            if typarray != 0 {
                self.array_elements_by_oid.insert(typarray, kind);
            }
            return;
        }

        if typelem != 0 {
            if let Some(element_name) = type_name.strip_prefix('_') {
                if let Some(kind) = self.registry.kind_for(element_name) {
                    self.array_elements_by_oid.insert(oid, kind);
                }
            }
        }
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        Self::new()
    }
}
