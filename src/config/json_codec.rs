use super::codec::{Codec, CodecError};
use super::ConfigValue;

/// JSON codec backed by `serde_json`.
///
/// Output is pretty-printed unless built with [`JsonCodec::compact`].
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn extension(&self) -> &'static str {
        ".json"
    }

    fn parse(&self, text: &str) -> Result<ConfigValue, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    fn stringify(&self, value: &ConfigValue) -> Result<String, CodecError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}
