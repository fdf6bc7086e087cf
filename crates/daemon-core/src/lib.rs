//! Support-library provider for the native daemon library
//! Builds the list of library names handed to `pfs.android.daemon.Daemon`

use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;

/// Daemon-core errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to allocate {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },
}

pub type Result<T> = std::result::Result<T, DaemonError>;

/// Library names reported to the Java side, in load order.
/// Placeholders until the daemon's real native dependencies exist.
pub const SUPPORTED_LIBRARIES: &[&str] = &["lib1", "lib2", "lib3"];

/// Ordered list of library names, owned by whoever requested it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportLibraries(Vec<String>);

impl SupportLibraries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for SupportLibraries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Source of library names - the boundary adapter is written against this
pub trait LibraryProvider: Send + Sync {
    /// Build a fresh list of library names
    fn support_libraries(&self) -> Result<SupportLibraries>;
}

/// Provider backed by [`SUPPORTED_LIBRARIES`]
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLibraryProvider;

impl LibraryProvider for StaticLibraryProvider {
    fn support_libraries(&self) -> Result<SupportLibraries> {
        support_libraries()
    }
}

/// Build a new list of the supported library names.
///
/// Every call allocates an independent copy. Allocation failure is
/// returned as [`DaemonError::Allocation`] instead of aborting.
pub fn support_libraries() -> Result<SupportLibraries> {
    build_list(SUPPORTED_LIBRARIES)
}

fn build_list(names: &[&str]) -> Result<SupportLibraries> {
    let mut libs = Vec::new();
    libs.try_reserve_exact(names.len())
        .map_err(|source| DaemonError::Allocation {
            what: "library name list",
            source,
        })?;

    for name in names {
        let mut lib = String::new();
        lib.try_reserve_exact(name.len())
            .map_err(|source| DaemonError::Allocation {
                what: "library name",
                source,
            })?;
        lib.push_str(name);
        libs.push(lib);
    }

    Ok(SupportLibraries(libs))
}

#[cfg(test)]
mod tests;
