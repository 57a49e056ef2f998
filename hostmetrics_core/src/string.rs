//! Borrowed text views for crossing the library boundary.
//!
//! An [`FfiStr`] never owns its bytes. Whoever builds one keeps the backing
//! storage alive until the call (or insertion callback) that receives it
//! returns; the receiving side copies the bytes out before that point.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::marker::PhantomData;

/// Pointer/length view over UTF-8 (or near-UTF-8) bytes.
///
/// # C Mapping
/// ```c
/// typedef struct {
///     const uint8_t *ptr;
///     size_t len;
/// } FfiStr;
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiStr {
    ptr: *const u8,
    len: usize,
}

impl FfiStr {
    /// The empty view. `ptr` is null, which readers treat as "".
    pub const fn empty() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
        }
    }

    /// Borrows `s` for as long as the caller keeps it alive.
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    #[cfg(unix)]
    pub fn from_os_str(s: &OsStr) -> Self {
        use std::os::unix::ffi::OsStrExt;
        Self::from_bytes(s.as_bytes())
    }

    #[cfg(not(unix))]
    pub fn from_os_str(s: &OsStr) -> Self {
        // Non-unix platforms only see the UTF-8 subset of the name.
        Self::from_str(s.to_str().unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        if self.ptr.is_null() {
            0
        } else {
            self.len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Safety
    /// The view must still point at live memory of at least `len` bytes.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.ptr.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.ptr, self.len)
    }

    /// # Safety
    /// Same as [`FfiStr::as_bytes`].
    pub unsafe fn to_str_lossy<'a>(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Copies the viewed bytes into an owned string, replacing invalid UTF-8.
    ///
    /// # Safety
    /// Same as [`FfiStr::as_bytes`].
    pub unsafe fn to_owned_string(&self) -> String {
        self.to_str_lossy().into_owned()
    }

    #[cfg(unix)]
    /// # Safety
    /// Same as [`FfiStr::as_bytes`].
    pub unsafe fn as_os_str<'a>(&self) -> &'a OsStr {
        use std::os::unix::ffi::OsStrExt;
        OsStr::from_bytes(self.as_bytes())
    }
}

impl Default for FfiStr {
    fn default() -> Self {
        Self::empty()
    }
}

/// An [`FfiStr`] tied to the lifetime of the text it views.
///
/// Builders on either side use this to keep the borrow checker honest while
/// the raw view is handed across the boundary.
#[derive(Debug, Clone, Copy)]
pub struct BorrowedStr<'a> {
    raw: FfiStr,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> BorrowedStr<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            raw: FfiStr::from_str(s),
            _marker: PhantomData,
        }
    }

    pub fn raw(&self) -> FfiStr {
        self.raw
    }

    pub fn as_ptr(&self) -> *const FfiStr {
        &self.raw
    }
}
