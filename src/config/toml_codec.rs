//! TOML codec backed by the `toml` crate.
//!
//! TOML has no `null` and its document root is always a table, so
//! [`TomlCodec::stringify`](Codec::stringify) rejects values that use either.
//! Datetimes are read as their RFC 3339 string form.

use serde_json::{Map, Number};
use toml::{Table, Value};

use super::codec::{Codec, CodecError};
use super::ConfigValue;

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec {
    pretty: bool,
}

impl TomlCodec {
    /// Multi-line arrays on output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for TomlCodec {
    fn extension(&self) -> &'static str {
        ".toml"
    }

    fn parse(&self, text: &str) -> Result<ConfigValue, CodecError> {
        let table: Table = toml::from_str(text)?;
        table_to_config(table)
    }

    fn stringify(&self, value: &ConfigValue) -> Result<String, CodecError> {
        let ConfigValue::Object(map) = value else {
            return Err("TOML document root must be a table".into());
        };
        let table = map_to_table(map)?;
        let text = if self.pretty {
            toml::to_string_pretty(&table)?
        } else {
            toml::to_string(&table)?
        };
        Ok(text)
    }
}

fn table_to_config(table: Table) -> Result<ConfigValue, CodecError> {
    let mut map = Map::with_capacity(table.len());
    for (key, value) in table {
        map.insert(key, toml_to_config(value)?);
    }
    Ok(ConfigValue::Object(map))
}

fn toml_to_config(value: Value) -> Result<ConfigValue, CodecError> {
    Ok(match value {
        Value::String(s) => ConfigValue::String(s),
        Value::Integer(i) => ConfigValue::Number(i.into()),
        Value::Float(f) => {
            let number = Number::from_f64(f)
                .ok_or_else(|| format!("cannot represent non-finite float {f}"))?;
            ConfigValue::Number(number)
        }
        Value::Boolean(b) => ConfigValue::Bool(b),
        Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        Value::Array(arr) => ConfigValue::Array(
            arr.into_iter()
                .map(toml_to_config)
                .collect::<Result<_, _>>()?,
        ),
        Value::Table(t) => table_to_config(t)?,
    })
}

fn map_to_table(map: &Map<String, ConfigValue>) -> Result<Table, CodecError> {
    let mut table = Table::new();
    for (key, value) in map {
        let converted = config_to_toml(value).map_err(|e| format!("key '{key}': {e}"))?;
        table.insert(key.clone(), converted);
    }
    Ok(table)
}

fn config_to_toml(value: &ConfigValue) -> Result<Value, CodecError> {
    Ok(match value {
        ConfigValue::Null => return Err("TOML cannot represent null".into()),
        ConfigValue::Bool(b) => Value::Boolean(*b),
        ConfigValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_u64() {
                return Err(format!("integer {n} is out of range for TOML").into());
            } else {
                // as_f64 always succeeds for non-integer numbers
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        ConfigValue::String(s) => Value::String(s.clone()),
        ConfigValue::Array(arr) => Value::Array(
            arr.iter()
                .map(config_to_toml)
                .collect::<Result<_, _>>()?,
        ),
        ConfigValue::Object(map) => Value::Table(map_to_table(map)?),
    })
}
