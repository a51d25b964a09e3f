use serde_json::Number;

use super::ConfigValue;

/// Environment variables with a common prefix, mapped to nested config paths.
#[derive(Debug, Clone)]
pub(crate) struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub(crate) fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    /// Entries taken from the process environment.
    pub(crate) fn entries(&self) -> Vec<(Vec<String>, ConfigValue)> {
        self.entries_from(std::env::vars())
    }

    pub(crate) fn entries_from(
        &self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Vec<(Vec<String>, ConfigValue)> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut entries = Vec::new();

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let path: Vec<String> = path_str
                .split(&self.separator)
                .map(|s| s.to_lowercase())
                .collect();

            entries.push((path, coerce_value(&value)));
        }

        // std::env::vars order is unspecified
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

fn coerce_value(s: &str) -> ConfigValue {
    if s.eq_ignore_ascii_case("true") {
        return ConfigValue::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return ConfigValue::Bool(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return ConfigValue::Number(i.into());
        }
    }

    if s.contains('.') {
        if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
            return ConfigValue::Number(n);
        }
    }

    ConfigValue::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_filter_and_path_split() {
        let source = EnvSource::new("MYAPP", "__");
        let entries = source.entries_from(vars(&[
            ("MYAPP__DATABASE__HOST", "localhost"),
            ("MYAPP__DEBUG", "true"),
            ("OTHER__DEBUG", "false"),
            ("MYAPP__", "ignored"),
        ]));

        assert_eq!(
            entries,
            vec![
                (vec!["database".to_string(), "host".to_string()], json!("localhost")),
                (vec!["debug".to_string()], json!(true)),
            ]
        );
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value("TRUE"), json!(true));
        assert_eq!(coerce_value("false"), json!(false));
        assert_eq!(coerce_value("-42"), json!(-42));
        assert_eq!(coerce_value("1.5"), json!(1.5));
        assert_eq!(coerce_value("1.2.3"), json!("1.2.3"));
        assert_eq!(coerce_value("99999999999999999999"), json!("99999999999999999999"));
        assert_eq!(coerce_value(""), json!(""));
    }

    #[test]
    #[should_panic(expected = "separator must not be empty")]
    fn test_empty_separator_panics() {
        EnvSource::new("APP", "");
    }
}
