//! Bounded-depth key search over embedded JSON.
//!
//! Hydration payloads are arbitrarily deep application state; an unbounded
//! walk over a multi-megabyte store is wasted work. This search visits
//! object entries whose key matches a configured set, descending a fixed
//! number of levels. Arrays count as a level too, so a pathological list
//! of lists cannot extend the walk.

use serde_json::Value;

/// Visit every object entry within `depth` levels whose lowercased key is
/// in `keys`. The visitor receives the lowercased key and the value; the
/// walk continues into matched values, so nested matches are reported too.
pub fn search_keys<'a, F>(value: &'a Value, keys: &[String], depth: usize, visit: &mut F)
where
    F: FnMut(&str, &'a Value),
{
    if depth == 0 {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let lower = key.to_lowercase();
                if keys.iter().any(|k| k.eq_ignore_ascii_case(&lower)) {
                    visit(&lower, child);
                }
                search_keys(child, keys, depth - 1, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                search_keys(item, keys, depth - 1, visit);
            }
        }
        _ => {}
    }
}
