//! Loading, saving and merging of configuration files.

mod codec;
mod env;
mod error;
mod file;
mod json_codec;
mod merge;
mod resolve;
mod toml_codec;

pub use codec::{codec_for_extension, codec_for_path, Codec, CodecError};
pub use error::{ConfigError, ErrorKind};
pub use file::{FileConfig, JsonFileConfig, TomlFileConfig};
pub use json_codec::JsonCodec;
pub use merge::{merge, merge_into};
pub use resolve::resolve_placeholders;
pub use toml_codec::TomlCodec;

pub(crate) use env::EnvSource;
pub(crate) use merge::merge_at_path;

/// Parsed content of a config file: nested mappings, arrays and scalars.
pub type ConfigValue = serde_json::Value;

/// A mapping node of a [`ConfigValue`].
pub type ConfigMap = serde_json::Map<String, ConfigValue>;
