//! Locating external executables (ffmpeg, ffprobe, the TTS engine).

use std::path::{Path, PathBuf};

/// Resolve `name` to an executable path.
///
/// An explicit override must point at an existing file. Otherwise every
/// `PATH` entry is searched (with `.exe` appended on Windows).
#[must_use]
pub fn find_executable(name: &str, override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return path.is_file().then(|| path.to_path_buf());
    }

    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let full = dir.join(name);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
