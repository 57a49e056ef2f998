//! ABI descriptors and the insertion primitive.
//!
//! The native library knows nothing about the caller's containers. For every
//! multi-entry call the caller hands over an [`EntrySink`]: a descriptor of
//! the record it expects, an opaque pointer to its container, and the one
//! function the native side may use to add an entry to that container.

use std::ffi::c_void;

use crate::string::FfiStr;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over `bytes`, continuing from `hash`.
pub const fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

const fn fnv1a_usize(hash: u64, value: usize) -> u64 {
    fnv1a(hash, &(value as u64).to_le_bytes())
}

/// In-memory shape of one record type.
///
/// Two layouts compare equal only if size, alignment, field count and the
/// fingerprint over every field's name, offset and size all agree.
///
/// # C Mapping
/// ```c
/// typedef struct {
///     size_t size;
///     size_t align;
///     uint32_t field_count;
///     uint64_t fingerprint;
/// } TypeLayout;
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeLayout {
    pub size: usize,
    pub align: usize,
    pub field_count: u32,
    pub fingerprint: u64,
}

/// Compile-time builder behind [`abi_record!`](crate::abi_record).
#[derive(Debug, Clone, Copy)]
pub struct LayoutBuilder {
    size: usize,
    align: usize,
    field_count: u32,
    fingerprint: u64,
}

impl LayoutBuilder {
    pub const fn new(size: usize, align: usize) -> Self {
        Self {
            size,
            align,
            field_count: 0,
            fingerprint: fnv1a_usize(fnv1a_usize(FNV_OFFSET, size), align),
        }
    }

    pub const fn field(self, name: &str, offset: usize, size: usize) -> Self {
        let mut fingerprint = fnv1a(self.fingerprint, name.as_bytes());
        fingerprint = fnv1a_usize(fingerprint, offset);
        fingerprint = fnv1a_usize(fingerprint, size);
        Self {
            field_count: self.field_count + 1,
            fingerprint,
            ..self
        }
    }

    pub const fn finish(self) -> TypeLayout {
        TypeLayout {
            size: self.size,
            align: self.align,
            field_count: self.field_count,
            fingerprint: self.fingerprint,
        }
    }
}

/// A `#[repr(C)]` record that may cross the boundary by value.
///
/// # Safety
/// `LAYOUT` must describe the type's actual fields. Implement it through
/// [`abi_record!`](crate::abi_record) rather than by hand.
pub unsafe trait AbiRecord: Copy + Default + 'static {
    const LAYOUT: TypeLayout;
}

/// Implements [`AbiRecord`] for a `#[repr(C)]` struct from its field list.
///
/// Every listed field type is checked against the struct definition.
#[macro_export]
macro_rules! abi_record {
    ($ty:ty { $($field:ident : $fty:ty),+ $(,)? }) => {
        $(
            const _: () = {
                fn check(record: &$ty) -> &$fty {
                    &record.$field
                }
                let _ = check;
            };
        )+

        unsafe impl $crate::abi::AbiRecord for $ty {
            const LAYOUT: $crate::abi::TypeLayout = $crate::abi::LayoutBuilder::new(
                ::std::mem::size_of::<$ty>(),
                ::std::mem::align_of::<$ty>(),
            )
            $(
                .field(
                    stringify!($field),
                    ::std::mem::offset_of!($ty, $field),
                    ::std::mem::size_of::<$fty>(),
                )
            )+
            .finish();
        }
    };
}

/// What, if anything, accompanies each value handed to the insertion primitive.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Sequence entries: the key pointer is null.
    None = 0,
    /// Map entries: the key pointer is a valid [`FfiStr`].
    Text = 1,
}

/// The caller's declaration of what one container entry looks like.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryDescriptor {
    pub key: KeyKind,
    pub value: TypeLayout,
}

impl EntryDescriptor {
    pub const fn of<R: AbiRecord>(key: KeyKind) -> Self {
        Self {
            key,
            value: R::LAYOUT,
        }
    }
}

/// Adds one entry to the container behind `target`.
///
/// `key` and `value` are only valid for the duration of the call; the
/// implementation copies what it needs and never keeps either pointer.
pub type InsertFn =
    unsafe extern "C" fn(target: *mut c_void, key: *const FfiStr, value: *const c_void);

/// Everything the native side needs to emit entries into caller memory.
///
/// # C Mapping
/// ```c
/// typedef struct {
///     const EntryDescriptor *descriptor;
///     void *target;
///     void (*insert)(void *target, const FfiStr *key, const void *value);
/// } EntrySink;
/// ```
#[repr(C)]
#[derive(Debug)]
pub struct EntrySink {
    pub descriptor: *const EntryDescriptor,
    pub target: *mut c_void,
    pub insert: InsertFn,
}

/// Why a sink was refused before any entry was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("entry sink pointer is null")]
    NullSink,

    #[error("entry descriptor pointer is null")]
    NullDescriptor,

    #[error("key kind mismatch: expected {expected:?}, caller declared {found:?}")]
    KeyMismatch { expected: KeyKind, found: KeyKind },

    #[error("record layout mismatch: expected {expected:?}, caller declared {found:?}")]
    LayoutMismatch {
        expected: TypeLayout,
        found: TypeLayout,
    },
}

impl EntrySink {
    /// Validates a sink received from the caller against the record type
    /// and key kind the native side is about to emit.
    ///
    /// # Safety
    /// `sink` and its descriptor, when non-null, must point at live values
    /// for the rest of the call.
    pub unsafe fn checked<'a, R: AbiRecord>(
        sink: *const EntrySink,
        key: KeyKind,
    ) -> Result<&'a EntrySink, SinkError> {
        let sink = sink.as_ref().ok_or(SinkError::NullSink)?;
        let descriptor = sink.descriptor.as_ref().ok_or(SinkError::NullDescriptor)?;
        if descriptor.key != key {
            return Err(SinkError::KeyMismatch {
                expected: key,
                found: descriptor.key,
            });
        }
        if descriptor.value != R::LAYOUT {
            return Err(SinkError::LayoutMismatch {
                expected: R::LAYOUT,
                found: descriptor.value,
            });
        }
        Ok(sink)
    }

    /// Hands one fully built entry to the caller's insertion primitive.
    ///
    /// # Safety
    /// The sink must have passed [`EntrySink::checked`] for `R`, and any
    /// text views inside `key` or `value` must stay alive until this returns.
    pub unsafe fn emit<R: AbiRecord>(&self, key: Option<&FfiStr>, value: &R) {
        let key = key.map_or(std::ptr::null(), |k| k as *const FfiStr);
        (self.insert)(self.target, key, (value as *const R).cast::<c_void>());
    }
}
