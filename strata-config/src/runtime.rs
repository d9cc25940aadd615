//! Runtime mode detection

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

/// Mode reported inside containers
pub const DOCKER_MODE: &str = "docker";

const DOCKER_MARKER: &str = "/.dockerenv";

/// Name of the mode overlay matching the current runtime.
///
/// `docker` when the container marker file is present, otherwise the
/// operating system name (`linux`, `macos`, `windows`, ...).
pub fn detect_mode() -> String {
    detect_mode_with_marker(Path::new(DOCKER_MARKER))
}

pub(crate) fn detect_mode_with_marker(marker: &Path) -> String {
    let mode = match marker.metadata() {
        Ok(_) => DOCKER_MODE,
        // Anything but a clean "not found" still means the marker is there
        Err(e) if e.kind() != ErrorKind::NotFound => DOCKER_MODE,
        Err(_) => std::env::consts::OS,
    };
    debug!("Detected runtime mode '{}'", mode);
    mode.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marker_present_means_docker() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join(".dockerenv");
        std::fs::write(&marker, b"").unwrap();
        assert_eq!(detect_mode_with_marker(&marker), "docker");
    }

    #[test]
    fn test_marker_absent_means_os() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join(".dockerenv");
        assert_eq!(detect_mode_with_marker(&marker), std::env::consts::OS);
    }
}
