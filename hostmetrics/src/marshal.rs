//! Container marshaler.
//!
//! Single-record calls fill one stack-allocated raw record that is converted
//! to its owned form only after the native side reports success.
//!
//! Multi-entry calls hand the native side an [`EntrySink`] whose insertion
//! primitive is [`insert_entry`], monomorphised for the destination
//! container. Each entry is copied (key and value) straight into that
//! container while the native side's views are still valid; there is no
//! intermediate buffer. The container lives inside a [`Target`] on the
//! caller's stack and is only handed out once the call returned `true` and
//! no entry was rejected.

use std::collections::{BTreeMap, HashMap};
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};

use hostmetrics_core::symbols::EntriesFn;
use hostmetrics_core::{AbiRecord, EntrySink, FfiStr, KeyKind};

use crate::descriptor::describe;
use crate::{Error, Metric, Result};

/// Conversion from a boundary record to its owned form.
pub trait FromRaw: Sized {
    type Raw: AbiRecord;

    /// # Safety
    /// Every text view in `raw` must point at live memory.
    unsafe fn from_raw(raw: &Self::Raw) -> Self;
}

/// A caller-side container the native side can append entries to.
pub trait EntryContainer: Default {
    type Value: FromRaw;

    /// Whether entries arrive with a key.
    const KEY: KeyKind;

    /// Adds one entry. Returns `false` if the entry does not fit this
    /// container (a key where none is expected, or the reverse).
    fn insert_entry(&mut self, key: Option<String>, value: Self::Value) -> bool;
}

impl<V: FromRaw> EntryContainer for BTreeMap<String, V> {
    type Value = V;
    const KEY: KeyKind = KeyKind::Text;

    fn insert_entry(&mut self, key: Option<String>, value: V) -> bool {
        match key {
            // Last write for a key wins
            Some(key) => {
                self.insert(key, value);
                true
            }
            None => false,
        }
    }
}

impl<V: FromRaw> EntryContainer for HashMap<String, V> {
    type Value = V;
    const KEY: KeyKind = KeyKind::Text;

    fn insert_entry(&mut self, key: Option<String>, value: V) -> bool {
        match key {
            Some(key) => {
                self.insert(key, value);
                true
            }
            None => false,
        }
    }
}

impl<V: FromRaw> EntryContainer for Vec<V> {
    type Value = V;
    const KEY: KeyKind = KeyKind::None;

    fn insert_entry(&mut self, key: Option<String>, value: V) -> bool {
        if key.is_some() {
            return false;
        }
        self.push(value);
        true
    }
}

/// What the sink's `target` pointer points at during a multi-entry call.
pub struct Target<C> {
    pub container: C,
    pub rejected: usize,
}

impl<C: Default> Default for Target<C> {
    fn default() -> Self {
        Self {
            container: C::default(),
            rejected: 0,
        }
    }
}

/// The insertion primitive handed to the native side.
///
/// Never unwinds into the caller of the callback: a panic while copying an
/// entry is caught and counted as a rejected entry.
///
/// # Safety
/// `target` must be null or point at a live `Target<C>` with no other
/// references to it; `key` must be null or a live view; `value` must be null
/// or point at a live `<C::Value as FromRaw>::Raw`.
pub unsafe extern "C" fn insert_entry<C: EntryContainer>(
    target: *mut c_void,
    key: *const FfiStr,
    value: *const c_void,
) {
    let Some(target) = (target as *mut Target<C>).as_mut() else {
        return;
    };

    let container = &mut target.container;
    let accepted = panic::catch_unwind(AssertUnwindSafe(|| accept::<C>(container, key, value)))
        .unwrap_or(false);

    if !accepted {
        target.rejected += 1;
    }
}

unsafe fn accept<C: EntryContainer>(
    container: &mut C,
    key: *const FfiStr,
    value: *const c_void,
) -> bool {
    let Some(raw) = (value as *const <C::Value as FromRaw>::Raw).as_ref() else {
        return false;
    };
    let key = key.as_ref().map(|k| k.to_owned_string());
    if key.is_some() != (C::KEY == KeyKind::Text) {
        return false;
    }
    container.insert_entry(key, C::Value::from_raw(raw))
}

/// Runs a multi-entry export and returns the container it filled.
///
/// # Safety
/// `call` must be a multi-entry export that honours the [`EntrySink`]
/// contract.
pub unsafe fn collect_entries<C: EntryContainer>(metric: Metric, call: EntriesFn) -> Result<C> {
    let mut target = Target::<C>::default();
    let target_ptr: *mut Target<C> = &mut target;
    let sink = EntrySink {
        descriptor: describe::<<C::Value as FromRaw>::Raw>(C::KEY),
        target: target_ptr.cast(),
        insert: insert_entry::<C>,
    };

    if !call(&sink) {
        return Err(Error::call_failed(metric));
    }
    if target.rejected > 0 {
        tracing::warn!("{}: {} entries rejected", metric, target.rejected);
        return Err(Error::call_failed(metric));
    }
    Ok(target.container)
}

/// Runs a single-record export and converts the record it wrote.
///
/// # Safety
/// `call` must either write a complete record through the pointer and return
/// `true`, or return `false`. Text views in the record must stay alive until
/// this returns.
pub unsafe fn read_record<V: FromRaw>(
    metric: Metric,
    call: impl FnOnce(*mut V::Raw) -> bool,
) -> Result<V> {
    let mut raw = V::Raw::default();
    if !call(&mut raw) {
        return Err(Error::call_failed(metric));
    }
    Ok(V::from_raw(&raw))
}
