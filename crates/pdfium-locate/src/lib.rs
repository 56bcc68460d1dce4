//! # pdfium-locate
//!
//! Find a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library that
//! is already present on the machine and bind `pdfium-render` to it.
//!
//! Nothing is downloaded. The library is searched for, in order:
//!
//! 1. `PDFIUM_LIB_PATH`: a file, or a directory containing the platform library.
//! 2. The directory of the running executable.
//! 3. `PDFIUM_CACHE_DIR`, else the per-user cache (`~/.cache/docshift/pdfium/`
//!    on Linux).
//! 4. The current working directory.
//! 5. The system library search path (`Pdfium::bind_to_system_library`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locate::{bind_pdfium, locate_pdfium_library};
//!
//! if let Some(path) = locate_pdfium_library() {
//!     eprintln!("using {}", path.display());
//! }
//! let pdfium = bind_pdfium().expect("PDFium unavailable");
//! ```

use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

/// Environment variable naming an explicit library file or directory.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache search directory.
pub const CACHE_DIR_ENV: &str = "PDFIUM_CACHE_DIR";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or binding PDFium.
#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// The current OS has no known PDFium library name.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// No candidate path held a library and the system search failed too.
    #[error("PDFium library not found (searched: {searched}); system lookup failed: {reason}")]
    NotFound { searched: String, reason: String },

    /// A library file was found but could not be loaded.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// File name of the PDFium shared library on the current platform.
pub fn platform_library_name() -> Result<&'static str, PdfiumLocateError> {
    library_name_for(std::env::consts::OS).ok_or_else(|| PdfiumLocateError::UnsupportedPlatform {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    })
}

fn library_name_for(os: &str) -> Option<&'static str> {
    match os {
        "macos" | "ios" => Some("libpdfium.dylib"),
        "linux" | "android" | "freebsd" | "openbsd" | "netbsd" => Some("libpdfium.so"),
        "windows" => Some("pdfium.dll"),
        _ => None,
    }
}

/// Default cache directory searched for the library.
///
/// `PDFIUM_CACHE_DIR` wins when set; otherwise `{cache_dir}/docshift/pdfium`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("docshift").join("pdfium")
}

// ── Search ───────────────────────────────────────────────────────────────────

/// Inputs to the candidate search, captured once so the ordering logic stays
/// a pure function.
#[derive(Debug, Clone, Default)]
pub struct SearchRoots {
    pub lib_path: Option<PathBuf>,
    pub exe_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl SearchRoots {
    /// Capture the roots from the process environment.
    pub fn from_env() -> Self {
        Self {
            lib_path: std::env::var_os(LIB_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            exe_dir: std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf)),
            cache_dir: Some(pdfium_cache_dir()),
            working_dir: std::env::current_dir().ok(),
        }
    }

    /// Candidate library paths in search order. Existence is not checked.
    pub fn candidates(&self, lib_name: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();

        if let Some(ref p) = self.lib_path {
            // A directory is allowed as well as the file itself.
            if p.file_name().map(|n| n == lib_name).unwrap_or(false) || p.is_file() {
                out.push(p.clone());
            } else {
                out.push(p.join(lib_name));
            }
        }

        for dir in [&self.exe_dir, &self.cache_dir, &self.working_dir]
            .into_iter()
            .flatten()
        {
            let candidate = dir.join(lib_name);
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }

        out
    }
}

/// Returns the first candidate path holding a library file, if any.
pub fn locate_pdfium_library() -> Option<PathBuf> {
    let lib_name = platform_library_name().ok()?;
    SearchRoots::from_env()
        .candidates(lib_name)
        .into_iter()
        .find(|p| p.is_file())
}

// ── Binding ──────────────────────────────────────────────────────────────────

/// Binds to PDFium using the search order documented at the crate root.
pub fn bind_pdfium() -> Result<Pdfium, PdfiumLocateError> {
    let lib_name = platform_library_name()?;
    let candidates = SearchRoots::from_env().candidates(lib_name);

    if let Some(path) = candidates.iter().find(|p| p.is_file()) {
        return bind_pdfium_from_path(path);
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::NotFound {
            searched: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
