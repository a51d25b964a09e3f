//! Context objects for placeholder resolution.

use serde_json::Value;

use crate::config::{merge_at_path, merge_into, ConfigMap, ConfigValue, EnvSource};

/// A layer in the context being built.
#[derive(Debug)]
enum ContextLayer {
    Value { path: Vec<String>, value: Value },
    Map(Value),
    Env(EnvSource),
}

/// Builder for the context mapping passed to
/// [`FileConfig::load_with_resolve_placeholder`](crate::FileConfig::load_with_resolve_placeholder).
///
/// Layers are applied in registration order; later layers override earlier
/// ones, with nested mappings merged.
///
/// ## Example
///
/// ```
/// use fileconfig::Context;
/// use serde_json::json;
///
/// let context = Context::builder()
///     .with_map(json!({"server": {"host": "localhost", "port": 80}}))
///     .with_value("server.port", 8080)
///     .build();
///
/// assert_eq!(context, json!({"server": {"host": "localhost", "port": 8080}}));
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Context {
    layers: Vec<ContextLayer>,
}

impl Context {
    /// Creates a new context builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets `value` at a dotted path such as `"server.port"`.
    pub fn with_value(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.layers.push(ContextLayer::Value {
            path: path.split('.').map(str::to_owned).collect(),
            value: value.into(),
        });
        self
    }

    /// Merges a whole mapping into the context. Non-mapping values are ignored.
    pub fn with_map(mut self, map: Value) -> Self {
        self.layers.push(ContextLayer::Map(map));
        self
    }

    /// Imports environment variables starting with `prefix` followed by `separator`.
    ///
    /// The remainder of each name is split on `separator` into lowercase path
    /// segments, so `MYAPP__DB__HOST` becomes `db.host`. Values are coerced to
    /// boolean, integer or float where they look like one, otherwise kept as
    /// strings. Variables are read when [`build`](Self::build) runs.
    ///
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.layers
            .push(ContextLayer::Env(EnvSource::new(prefix, separator)));
        self
    }

    /// Builds the context mapping.
    pub fn build(self) -> ConfigValue {
        let mut context = ConfigValue::Object(ConfigMap::new());

        for layer in self.layers {
            match layer {
                ContextLayer::Value { path, value } => {
                    if let ConfigValue::Object(map) = &mut context {
                        merge_at_path(map, &path, value);
                    }
                }
                ContextLayer::Map(map @ Value::Object(_)) => merge_into(&mut context, map),
                ContextLayer::Map(_) => {}
                ContextLayer::Env(source) => {
                    if let ConfigValue::Object(map) = &mut context {
                        for (path, value) in source.entries() {
                            merge_at_path(map, &path, value);
                        }
                    }
                }
            }
        }

        context
    }
}
