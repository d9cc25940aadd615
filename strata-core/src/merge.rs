//! Structural merge of property trees

use crate::value::Value;

/// Merge `src` onto `dest`.
///
/// Objects merge key by key, recursively. Any other pairing replaces `dest`
/// with `src`, so lists and scalars behave as leaves. A `Null` source leaves
/// `dest` untouched.
pub fn merge_value(dest: &mut Value, src: Value) {
    match (dest, src) {
        (_, Value::Null) => {}
        (Value::Object(dest_map), Value::Object(src_map)) => {
            for (key, src_child) in src_map {
                match dest_map.get_mut(&key) {
                    Some(dest_child) => merge_value(dest_child, src_child),
                    None => {
                        if !src_child.is_null() {
                            dest_map.insert(key, src_child);
                        }
                    }
                }
            }
        }
        (dest, src) => *dest = src,
    }
}
