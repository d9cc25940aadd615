use std::fs;

use strata_core::{ConfigError, ConfigResult};
use tracing::debug;

const FILE_PREFIX: &str = "file://";

/// Read a local configuration file.
///
/// The file name must carry an extension, since decoders are picked by it.
/// The check runs after the read, so an unnamed file is rejected even when
/// it exists.
pub fn read_file(descriptor: &str) -> ConfigResult<Vec<u8>> {
    let path = descriptor.strip_prefix(FILE_PREFIX).unwrap_or(descriptor);
    let data = fs::read(path);

    if !has_extension(path) {
        return Err(ConfigError::UnknownContentType {
            path: path.to_string(),
        });
    }

    let data = data.map_err(|e| ConfigError::unreachable(descriptor, e))?;
    debug!("Read {} bytes from {}", data.len(), path);
    Ok(data)
}

fn has_extension(path: &str) -> bool {
    path.rsplit(['/', '\\'])
        .next()
        .is_some_and(|name| name.contains('.'))
}
