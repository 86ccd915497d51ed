//! Attribute path parsing and nested value lookup.
//!
//! Paths use dot/bracket notation, e.g. `jobs.build.steps[0].run`. Lookup on
//! a missing path returns `None`, which callers must keep distinct from a
//! present `Value::Null`.

use serde_json::Value;

/// One segment of a parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parse `jobs.build.steps[0].run` into segments.
///
/// A malformed bracket (unclosed, or a non-numeric index) is treated as part
/// of the key text rather than an error; lookups on such paths simply miss.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            continue;
        }
        let mut rest = part;
        while let Some(open) = rest.find('[') {
            let key = &rest[..open];
            match rest[open + 1..].find(']') {
                Some(close) => {
                    let idx_text = &rest[open + 1..open + 1 + close];
                    match idx_text.parse::<usize>() {
                        Ok(idx) => {
                            if !key.is_empty() {
                                segments.push(PathSegment::Key(key.to_string()));
                            }
                            segments.push(PathSegment::Index(idx));
                            rest = &rest[open + 1 + close + 1..];
                        }
                        Err(_) => {
                            segments.push(PathSegment::Key(rest.to_string()));
                            rest = "";
                        }
                    }
                }
                None => {
                    segments.push(PathSegment::Key(rest.to_string()));
                    rest = "";
                }
            }
            if rest.is_empty() {
                break;
            }
        }
        if !rest.is_empty() {
            segments.push(PathSegment::Key(rest.to_string()));
        }
    }
    segments
}

/// Walk `root` along `path`. `None` means the path is absent.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in parse_path(path) {
        current = match segment {
            PathSegment::Key(key) => current.as_object()?.get(&key)?,
            PathSegment::Index(idx) => current.as_array()?.get(idx)?,
        };
    }
    Some(current)
}

/// Mutable walk, used only by the variable resolver.
pub fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in parse_path(path) {
        current = match segment {
            PathSegment::Key(key) => current.as_object_mut()?.get_mut(&key)?,
            PathSegment::Index(idx) => current.as_array_mut()?.get_mut(idx)?,
        };
    }
    Some(current)
}
