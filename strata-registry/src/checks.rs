//! Built-in check functions and check factories

use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use crate::registry::CheckFn;

/// Accepts strings that parse as an integer
pub fn isnum(arg: &str) -> bool {
    arg.parse::<i64>().is_ok()
}

/// Compile a lower-bound check; `param` must be an integer threshold
pub fn min(param: &str) -> Option<CheckFn> {
    let threshold = match param.parse::<i64>() {
        Ok(n) => n,
        Err(e) => {
            warn!("Invalid threshold '{}' for min check: {}", param, e);
            return None;
        }
    };
    Some(Arc::new(move |arg: &str| {
        arg.parse::<i64>().map(|n| n >= threshold).unwrap_or(false)
    }))
}

/// Compile a pattern check; the match is unanchored
pub fn regexp(param: &str) -> Option<CheckFn> {
    let re = match Regex::new(param) {
        Ok(re) => re,
        Err(e) => {
            warn!("Invalid pattern '{}' for regexp check: {}", param, e);
            return None;
        }
    };
    Some(Arc::new(move |arg: &str| re.is_match(arg)))
}
