use crate::NATIVE_ENTRYPOINT_SYMBOL;
use crate::codec::WireRequest;
use crate::error::gateway::GatewayError;

use common::ErrorLocation;

use std::ffi::{CStr, c_char, c_void};
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Mutex;

use libloading::Library;
use log::{debug, info};
use once_cell::sync::OnceCell;

/// Signature of the native `entrypoint`.
///
/// Both request encodings pass exactly one pointer: a C string for the JSON
/// envelope, a `RawParameters` record for the fixed record. The reply is a
/// NUL-terminated UTF-8 JSON text owned by the native module.
pub type RawEntrypoint = unsafe extern "C" fn(*const c_void) -> *const c_char;

/// Where the entry point comes from.
#[derive(Clone)]
pub enum LibrarySource {
    /// Shared library resolved with the dynamic loader.
    Path(PathBuf),
    /// Entry point already linked into this process.
    Entrypoint(RawEntrypoint),
}

impl fmt::Debug for LibrarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibrarySource::Path(path) => write!(f, "LibrarySource::Path({})", path.display()),
            LibrarySource::Entrypoint(_) => f.write_str("LibrarySource::Entrypoint(..)"),
        }
    }
}

struct BoundEntrypoint {
    entrypoint: RawEntrypoint,
    // Keeps the code behind `entrypoint` mapped.
    _library: Option<Library>,
}

/// The process's one handle on the native module.
pub struct NativeGateway {
    source: LibrarySource,
    bound: OnceCell<BoundEntrypoint>,
    call_lock: Mutex<()>,
}

impl NativeGateway {
    /// No I/O happens until [`ensure_loaded`](Self::ensure_loaded) or the first call.
    pub fn new(source: LibrarySource) -> Self {
        Self {
            source,
            bound: OnceCell::new(),
            call_lock: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.bound.get().is_some()
    }

    /// Resolve the library and bind the entry point if not done yet.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::LibraryNotFound`] if the loader cannot open the library
    /// - [`GatewayError::SymbolNotFound`] if `entrypoint` is not exported
    pub fn ensure_loaded(&self) -> Result<(), GatewayError> {
        self.bound().map(|_| ())
    }

    /// Invoke the native entry point with one encoded request.
    ///
    /// Blocks the calling thread for the whole native call. Calls from other
    /// threads wait on the call lock. The reply is copied out before the lock
    /// is released; no retries are attempted.
    pub fn call(&self, request: &WireRequest) -> Result<Vec<u8>, GatewayError> {
        let bound = self.bound()?;

        let _guard = self.call_lock.lock().map_err(|e| GatewayError::Poisoned {
            message: format!("A previous native call panicked: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // SAFETY: the pointer handed to the entry point is valid for the duration
        // of the closure, and the native contract reads it only during the call.
        let reply = request.with_native_ptr(|ptr| unsafe { (bound.entrypoint)(ptr) });

        if reply.is_null() {
            return Err(GatewayError::NullReply {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // SAFETY: non-null replies are NUL-terminated and outlive this call.
        let bytes = unsafe { CStr::from_ptr(reply) }.to_bytes().to_vec();
        debug!("Native call returned {} bytes", bytes.len());
        Ok(bytes)
    }

    fn bound(&self) -> Result<&BoundEntrypoint, GatewayError> {
        self.bound.get_or_try_init(|| bind(&self.source))
    }
}

impl fmt::Debug for NativeGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeGateway")
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

fn bind(source: &LibrarySource) -> Result<BoundEntrypoint, GatewayError> {
    match source {
        LibrarySource::Entrypoint(entrypoint) => {
            info!("Native entry point bound in-process");
            Ok(BoundEntrypoint {
                entrypoint: *entrypoint,
                _library: None,
            })
        }
        LibrarySource::Path(path) => {
            info!("Loading native library {}", path.display());

            // SAFETY: loading runs the library's initialisers; the native module is trusted.
            let library = unsafe { Library::new(path) }.map_err(|e| GatewayError::LibraryNotFound {
                path: path.clone(),
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

            // SAFETY: `entrypoint` is declared with the `RawEntrypoint` signature by the native module.
            let entrypoint = match unsafe {
                library.get::<RawEntrypoint>(NATIVE_ENTRYPOINT_SYMBOL.as_bytes())
            } {
                Ok(symbol) => *symbol,
                Err(e) => {
                    return Err(GatewayError::SymbolNotFound {
                        symbol: NATIVE_ENTRYPOINT_SYMBOL.to_string(),
                        message: e.to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            info!("Bound '{}' from {}", NATIVE_ENTRYPOINT_SYMBOL, path.display());
            Ok(BoundEntrypoint {
                entrypoint,
                _library: Some(library),
            })
        }
    }
}
