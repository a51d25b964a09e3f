//! Placeholder resolution for configuration values.
//!
//! String values may contain `${path.to.field}` tokens. Each path is looked up
//! in the caller's context first, then in the document itself. A string that
//! is exactly one token takes the looked-up value with its native type;
//! tokens embedded in longer strings are substituted as text.
//!
//! Tokens that cannot be resolved, or that would re-enter a path already being
//! resolved, are left in place unchanged.

use std::collections::HashSet;
use std::iter::Peekable;
use std::str::Chars;

use tracing::trace;

use super::ConfigValue;

/// Resolves all placeholder tokens in `value` against `context` and `value` itself.
///
/// Returns a new tree; neither input is modified.
pub fn resolve_placeholders(value: &ConfigValue, context: &ConfigValue) -> ConfigValue {
    let mut resolver = Resolver {
        context,
        root: value,
        position: Vec::new(),
        in_progress: HashSet::new(),
    };
    resolver.resolve_value(value)
}

struct Resolver<'a> {
    context: &'a ConfigValue,
    root: &'a ConfigValue,
    /// Path segments of the value currently being walked.
    position: Vec<String>,
    /// Paths of string values currently being resolved, for cycle detection.
    in_progress: HashSet<String>,
}

impl Resolver<'_> {
    fn resolve_value(&mut self, value: &ConfigValue) -> ConfigValue {
        match value {
            ConfigValue::String(s) => self.resolve_leaf(s),
            ConfigValue::Array(arr) => ConfigValue::Array(
                arr.iter()
                    .enumerate()
                    .map(|(index, item)| self.resolve_at(index.to_string(), item))
                    .collect(),
            ),
            ConfigValue::Object(map) => ConfigValue::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.resolve_at(key.clone(), item)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn resolve_at(&mut self, segment: String, value: &ConfigValue) -> ConfigValue {
        self.position.push(segment);
        let resolved = self.resolve_value(value);
        self.position.pop();
        resolved
    }

    /// Resolves a string while its path is marked in progress.
    fn resolve_leaf(&mut self, s: &str) -> ConfigValue {
        if self.position.is_empty() {
            return self.resolve_string(s);
        }

        let key = self.position.join(".");
        if !self.in_progress.insert(key.clone()) {
            trace!(path = %key, "placeholder cycle, leaving value unresolved");
            return ConfigValue::String(s.to_owned());
        }
        let resolved = self.resolve_string(s);
        self.in_progress.remove(&key);
        resolved
    }

    fn resolve_string(&mut self, s: &str) -> ConfigValue {
        if let Some(path) = whole_token(s) {
            return self
                .resolve_path(path)
                .unwrap_or_else(|| ConfigValue::String(s.to_owned()));
        }

        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '$' || chars.peek() != Some(&'{') {
                result.push(ch);
                continue;
            }
            chars.next(); // consume '{'

            let (path, closed) = consume_until(&mut chars, '}');
            if !closed {
                // unclosed, rest of the string is literal
                result.push_str("${");
                result.push_str(&path);
                break;
            }

            match self.resolve_path(&path) {
                Some(resolved) => result.push_str(&value_to_string(&resolved)),
                None => {
                    result.push_str("${");
                    result.push_str(&path);
                    result.push('}');
                }
            }
        }

        ConfigValue::String(result)
    }

    fn resolve_path(&mut self, path: &str) -> Option<ConfigValue> {
        let path = path.trim();
        if self.is_in_progress(path) {
            trace!(path, "placeholder cycle, leaving token unresolved");
            return None;
        }

        let (context, root) = (self.context, self.root);
        let Some(found) = lookup_path(context, path).or_else(|| lookup_path(root, path)) else {
            trace!(path, "placeholder not found, leaving token unresolved");
            return None;
        };

        let segments = path.split('.').map(str::to_owned).collect();
        let outer = std::mem::replace(&mut self.position, segments);
        let resolved = self.resolve_value(found);
        self.position = outer;

        Some(resolved)
    }

    /// True if `path` or anything below it is being resolved.
    fn is_in_progress(&self, path: &str) -> bool {
        self.in_progress.iter().any(|key| {
            key.strip_prefix(path)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    }
}

/// Returns the inner path if `s` consists of exactly one `${...}` token.
fn whole_token(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner)
}

/// Consumes characters until the delimiter, returning the collected string
/// and whether the delimiter was found.
fn consume_until(chars: &mut Peekable<Chars>, delim: char) -> (String, bool) {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return (result, true);
        }
        result.push(ch);
    }
    (result, false)
}

/// Looks up a dotted path. Numeric segments index into arrays.
fn lookup_path<'v>(root: &'v ConfigValue, path: &str) -> Option<&'v ConfigValue> {
    if path.is_empty() {
        return None;
    }

    let mut current = root;
    for part in path.split('.') {
        if part.is_empty() {
            return None;
        }
        current = match current {
            ConfigValue::Object(map) => map.get(part)?,
            ConfigValue::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Text form of a value substituted into a longer string.
fn value_to_string(value: &ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(value: ConfigValue) -> ConfigValue {
        resolve_placeholders(&value, &json!({}))
    }

    #[test]
    fn test_self_reference() {
        let value = json!({
            "name": "svc",
            "greeting": {"text": "Hello, ${name}"}
        });
        let resolved = resolve(value);
        assert_eq!(resolved["greeting"]["text"], json!("Hello, svc"));
    }

    #[test]
    fn test_context_takes_precedence() {
        let value = json!({"name": "doc", "title": "${name}"});
        let resolved = resolve_placeholders(&value, &json!({"name": "ctx"}));
        assert_eq!(resolved["title"], json!("ctx"));
    }

    #[test]
    fn test_nested_context_path() {
        let value = json!({"url": "https://${server.host}:${server.port}/api"});
        let context = json!({"server": {"host": "example.com", "port": 8080}});

        let resolved = resolve_placeholders(&value, &context);
        assert_eq!(resolved["url"], json!("https://example.com:8080/api"));
    }

    #[test]
    fn test_whole_token_keeps_native_type() {
        let value = json!({
            "port": "${server.port}",
            "debug": "${flags.debug}",
            "server_copy": "${server}"
        });
        let context = json!({"server": {"port": 8080}, "flags": {"debug": true}});

        let resolved = resolve_placeholders(&value, &context);
        assert_eq!(resolved["port"], json!(8080));
        assert_eq!(resolved["debug"], json!(true));
        assert_eq!(resolved["server_copy"], json!({"port": 8080}));
    }

    #[test]
    fn test_embedded_non_string_values() {
        let value = json!({
            "a": "n=${n}",
            "b": "flag=${f}",
            "c": "nothing=${z}",
            "d": "list=${l}"
        });
        let context = json!({"n": 3, "f": false, "z": null, "l": [1, "x"]});

        let resolved = resolve_placeholders(&value, &context);
        assert_eq!(resolved["a"], json!("n=3"));
        assert_eq!(resolved["b"], json!("flag=false"));
        assert_eq!(resolved["c"], json!("nothing=null"));
        assert_eq!(resolved["d"], json!(r#"list=[1,"x"]"#));
    }

    #[test]
    fn test_unresolved_tokens_left_verbatim() {
        let value = json!({
            "a": "${missing.key}",
            "b": "prefix ${missing} suffix",
            "c": "${}",
            "d": "${a..b}"
        });
        let resolved = resolve(value.clone());
        assert_eq!(resolved, value);
    }

    #[test]
    fn test_unclosed_token_is_literal() {
        let value = json!({"name": "svc", "a": "${name} and ${name"});
        let resolved = resolve(value);
        assert_eq!(resolved["a"], json!("svc and ${name"));
    }

    #[test]
    fn test_lone_dollar() {
        let value = json!({"price": "$5 or $${cost}", "cost": 7});
        let resolved = resolve(value);
        assert_eq!(resolved["price"], json!("$5 or $7"));
    }

    #[test]
    fn test_chained_references() {
        let value = json!({"a": "hello", "b": "${a} world", "c": "${b}!"});
        let resolved = resolve(value);
        assert_eq!(resolved["c"], json!("hello world!"));
    }

    #[test]
    fn test_circular_reference_terminates() {
        let value = json!({"a": "${b}", "b": "${a}", "self": "x${self}"});
        let resolved = resolve(value);

        assert_eq!(resolved["a"], json!("${a}"));
        assert_eq!(resolved["b"], json!("${b}"));
        assert_eq!(resolved["self"], json!("x${self}"));
    }

    #[test]
    fn test_embedded_mutual_reference() {
        let value = json!({"a": "A${b}", "b": "B${a}"});
        let resolved = resolve(value);

        assert_eq!(resolved, json!({"a": "AB${a}", "b": "BA${b}"}));
    }

    #[test]
    fn test_reference_to_enclosing_mapping() {
        let value = json!({"m": {"x": "${m}", "y": "${m.y}"}, "copy": "${m}"});
        let resolved = resolve(value);

        assert_eq!(resolved["m"], json!({"x": "${m}", "y": "${m.y}"}));
        assert_eq!(resolved["copy"], json!({"x": "${m}", "y": "${m.y}"}));
    }

    #[test]
    fn test_array_values_and_index_paths() {
        let value = json!({
            "base": "/api",
            "endpoints": ["${base}/users", "${base}/posts"],
            "first": "${endpoints.0}"
        });
        let resolved = resolve(value);

        assert_eq!(resolved["endpoints"], json!(["/api/users", "/api/posts"]));
        assert_eq!(resolved["first"], json!("/api/users"));
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let value = json!({"name": "svc", "a": "${ name }"});
        assert_eq!(resolve(value)["a"], json!("svc"));
    }

    #[test]
    fn test_idempotent_once_resolved() {
        let value = json!({
            "name": "svc",
            "a": {"b": "Hello, ${name}", "c": ["${name}", 1, null]}
        });
        let once = resolve(value);
        let twice = resolve(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_array_root() {
        let value = json!(["${x}", "${0}"]);
        let resolved = resolve_placeholders(&value, &json!({"x": 1}));
        assert_eq!(resolved, json!([1, 1]));
    }
}
