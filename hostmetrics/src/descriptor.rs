//! ABI descriptor bridge.
//!
//! The native side cannot see how our containers are laid out, so every
//! multi-entry call carries an [`EntryDescriptor`] declaring the record it
//! expects. Descriptors are built once per (record type, key kind), leaked
//! into a process-wide registry, and shared read-only from then on.

use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::OnceLock;

use hostmetrics_core::{AbiRecord, EntryDescriptor, KeyKind};

type Registry = RwLock<HashMap<(TypeId, KeyKind), &'static EntryDescriptor>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The descriptor for `R` entries with keys of kind `key`.
///
/// Always returns the same reference for the same inputs.
pub fn describe<R: AbiRecord>(key: KeyKind) -> &'static EntryDescriptor {
    let id = (TypeId::of::<R>(), key);

    if let Some(&descriptor) = registry().read().get(&id) {
        return descriptor;
    }

    let mut map = registry().write();
    // Another thread may have won the race for the write lock
    *map.entry(id).or_insert_with(|| {
        tracing::trace!(
            "Registering descriptor for {} ({:?} keys)",
            std::any::type_name::<R>(),
            key
        );
        &*Box::leak(Box::new(EntryDescriptor::of::<R>(key)))
    })
}
