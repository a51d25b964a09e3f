//! The pluggable text format contract.

use std::fmt::Debug;
use std::path::Path;

use super::json_codec::JsonCodec;
use super::toml_codec::TomlCodec;
use super::ConfigValue;

/// Native error produced by a codec. The loader wraps it before it reaches callers.
pub type CodecError = Box<dyn std::error::Error + Send + Sync>;

/// Converts between config file text and a [`ConfigValue`] for one format.
pub trait Codec: Send + Sync + Debug {
    /// File extension including the leading dot, e.g. `".toml"`.
    fn extension(&self) -> &'static str;

    fn parse(&self, text: &str) -> Result<ConfigValue, CodecError>;

    fn stringify(&self, value: &ConfigValue) -> Result<String, CodecError>;
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn extension(&self) -> &'static str {
        (**self).extension()
    }

    fn parse(&self, text: &str) -> Result<ConfigValue, CodecError> {
        (**self).parse(text)
    }

    fn stringify(&self, value: &ConfigValue) -> Result<String, CodecError> {
        (**self).stringify(value)
    }
}

/// Returns the bundled codec registered for `extension` (with or without the dot).
pub fn codec_for_extension(extension: &str) -> Option<Box<dyn Codec>> {
    let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
    match normalized.as_str() {
        "toml" => Some(Box::new(TomlCodec::default())),
        "json" => Some(Box::new(JsonCodec::default())),
        _ => None,
    }
}

/// Returns the bundled codec matching the extension of `path`.
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<Box<dyn Codec>> {
    let extension = path.as_ref().extension()?.to_str()?;
    codec_for_extension(extension)
}
