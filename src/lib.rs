pub mod config;
pub mod context;

pub use config::{
    merge, resolve_placeholders, Codec, ConfigError, ConfigMap, ConfigValue, ErrorKind,
    FileConfig, JsonCodec, JsonFileConfig, TomlCodec, TomlFileConfig,
};
pub use context::Context;
