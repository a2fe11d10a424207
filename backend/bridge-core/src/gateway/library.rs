use std::path::{Path, PathBuf};

/// Naming convention for shared libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryPlatform {
    /// `lib<name>.so`
    Unix,
    /// `<name>.dll`
    Windows,
}

impl LibraryPlatform {
    #[cfg(windows)]
    pub const fn current() -> Self {
        LibraryPlatform::Windows
    }

    #[cfg(not(windows))]
    pub const fn current() -> Self {
        LibraryPlatform::Unix
    }

    pub fn file_name(self, name: &str) -> String {
        match self {
            LibraryPlatform::Unix => format!("lib{name}.so"),
            LibraryPlatform::Windows => format!("{name}.dll"),
        }
    }
}

/// Path handed to the dynamic loader.
///
/// Without a directory the bare file name is returned and the platform's
/// library search path applies.
pub fn library_path(name: &str, directory: Option<&Path>) -> PathBuf {
    let file_name = LibraryPlatform::current().file_name(name);
    match directory {
        Some(directory) => directory.join(file_name),
        None => PathBuf::from(file_name),
    }
}
