//! Built-in source readers

pub mod file;
#[cfg(feature = "http")]
pub mod http;

/// Split a descriptor at the first `://` into scheme and remainder
pub fn split_scheme(descriptor: &str) -> (Option<&str>, &str) {
    match descriptor.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, descriptor),
    }
}
