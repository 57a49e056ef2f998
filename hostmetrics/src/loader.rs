//! Dynamic library loading and symbol resolution.
//!
//! Unloading is advisory. Dropping or closing a [`NativeLibrary`] asks the
//! platform loader to release the image, but the image may stay mapped for
//! the rest of the process (other handles, `RTLD_NODELETE`, TLS destructors).
//! Nothing here assumes the memory is reclaimed.

use libloading::Library;
use std::path::{Path, PathBuf};

use hostmetrics_core::symbols::display_name;

use crate::{Error, Result};

/// An opened native library image.
#[derive(Debug)]
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    /// Opens the library at `path`.
    ///
    /// A missing file is `LibraryNotFound`; anything the platform loader
    /// rejects (wrong architecture, malformed image, missing dependency) is
    /// `LibraryLoad`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::LibraryNotFound {
                path: path.to_path_buf(),
                hint: "check the path or build hostmetrics_native first".to_string(),
            });
        }

        let library = unsafe { open_image(path) }.map_err(|source| Error::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Opened native library {}", path.display());
        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves `symbol` (NUL-terminated) to a copy of its address.
    ///
    /// # Safety
    /// `T` must be the exact function-pointer type of the export, and the
    /// returned value must not be used after this library is closed.
    pub unsafe fn resolve<T: Copy>(&self, symbol: &[u8]) -> Result<T> {
        let resolved = self
            .library
            .get::<T>(symbol)
            .map_err(|source| Error::SymbolNotFound {
                symbol: display_name(symbol).to_string(),
                source,
            })?;
        Ok(*resolved)
    }

    /// Best-effort unload. Failures are logged, not returned.
    pub fn close(self) {
        let path = self.path;
        match self.library.close() {
            Ok(()) => tracing::debug!("Released native library {}", path.display()),
            Err(e) => tracing::warn!("Releasing {} failed: {}", path.display(), e),
        }
    }
}

#[cfg(unix)]
unsafe fn open_image(path: &Path) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LOCAL, RTLD_NOW};

    // Bind everything up front so unresolved dependencies fail here, not on
    // the first metric call.
    UnixLibrary::open(Some(path), RTLD_NOW | RTLD_LOCAL).map(Library::from)
}

#[cfg(not(unix))]
unsafe fn open_image(path: &Path) -> std::result::Result<Library, libloading::Error> {
    Library::new(path)
}
