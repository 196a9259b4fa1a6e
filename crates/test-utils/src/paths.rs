//! Path utilities for locating optional test assets.
//!
//! Fonts and boundary shapefiles are not checked into the repository. Tests
//! that need them look in a few well-known places and skip when nothing is
//! found.

use std::path::PathBuf;

/// Font files tried by [`find_test_font`], in order.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/DejaVuSans.ttf",
];

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test file in multiple locations.
///
/// Checked in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `crates/renderer/testdata/`
/// 3. `crates/forecast-panel/testdata/`
/// 4. `testdata/` at the workspace root
/// 5. `assets/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/renderer/testdata").join(name),
        root.join("crates/forecast-panel/testdata").join(name),
        root.join("testdata").join(name),
        root.join("assets").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Locates a TrueType font usable for text rendering tests.
///
/// `TEST_FONT` wins when set; then `DejaVuSans.ttf` via [`find_test_file`];
/// then the usual system locations.
pub fn find_test_font() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TEST_FONT") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    find_test_file("DejaVuSans.ttf").or_else(|| {
        FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    })
}

/// Creates a temporary directory for test output.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
