//! Binding to the pdfium shared library.
//!
//! Both PDF text extraction and PDF report rendering go through pdfium.
//! The library is looked up in this order:
//!
//! 1. `ProcessingConfig::pdfium_lib_path`
//! 2. the `PDFIUM_LIB_PATH` environment variable
//! 3. the system library search path
//!
//! A path may name the library file itself or the directory holding it.
//!
//! pdfium bindings are process-wide, so the first successful binding is
//! kept and shared by every later caller; the lookup above only runs until
//! it succeeds once.

use crate::config::ProcessingConfig;
use crate::error::MarksheetError;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// File name of the pdfium library on this platform.
pub fn platform_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    }
}

/// The explicit library location, if one was configured.
pub fn configured_library_path(config: &ProcessingConfig) -> Option<PathBuf> {
    config.pdfium_lib_path.clone().or_else(|| {
        std::env::var_os(PDFIUM_LIB_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(platform_library_name())
    } else {
        path.to_path_buf()
    }
}

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// The shared pdfium instance, bound on first use.
///
/// Fails with [`MarksheetError::PdfiumBindingFailed`] when no library can be
/// loaded; a later call retries.
pub fn bind_pdfium(config: &ProcessingConfig) -> Result<&'static Pdfium, MarksheetError> {
    PDFIUM.get_or_try_init(|| bind(config))
}

fn bind(config: &ProcessingConfig) -> Result<Pdfium, MarksheetError> {
    let bindings = match configured_library_path(config) {
        Some(path) => {
            let file = library_file(&path);
            debug!("Binding pdfium from {}", file.display());
            Pdfium::bind_to_library(file.to_string_lossy().to_string())
        }
        None => {
            debug!("Binding system pdfium library");
            Pdfium::bind_to_system_library()
        }
    }
    .map_err(|e| MarksheetError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
