//! File-backed configuration loader.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, warn};

use super::codec::{Codec, CodecError};
use super::json_codec::JsonCodec;
use super::merge::merge;
use super::resolve::resolve_placeholders;
use super::toml_codec::TomlCodec;
use super::{ConfigError, ConfigMap, ConfigValue};

/// Loads, saves and updates config files of one format.
///
/// A `FileConfig` binds a single [`Codec`] for its whole lifetime and holds no
/// other state, so one instance can serve concurrent operations on different
/// files. Operations on the *same* file are not coordinated: two concurrent
/// [`update`](Self::update) calls race at the file system.
///
/// Writes replace the file in a single write call; there is no temporary file
/// or rename step.
///
/// ## Example
///
/// ```no_run
/// use fileconfig::TomlFileConfig;
/// use serde_json::json;
///
/// # async fn run() -> Result<(), fileconfig::ConfigError> {
/// let config = TomlFileConfig::default();
///
/// let merged = config
///     .update("settings.toml", &json!({"server": {"port": 8080}}))
///     .await?;
/// assert_eq!(merged["server"]["port"], 8080);
///
/// let loaded = config.load("settings.toml").await?;
/// assert_eq!(loaded, Some(merged));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileConfig<C> {
    codec: C,
}

/// A [`FileConfig`] for `.toml` files.
pub type TomlFileConfig = FileConfig<TomlCodec>;

/// A [`FileConfig`] for `.json` files.
pub type JsonFileConfig = FileConfig<JsonCodec>;

impl<C: Codec> FileConfig<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// File extension of the bound format, e.g. `".toml"`.
    pub fn extension_name(&self) -> &'static str {
        self.codec.extension()
    }

    /// Reads and parses the file at `path`.
    ///
    /// Returns `Ok(None)` when the file is empty or only whitespace. The root
    /// of a successfully parsed file is always a mapping or an array.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::Io`] if it cannot be read, and
    /// [`ConfigError::Parse`] if its content is not UTF-8 or not valid for the format.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Option<ConfigValue>, ConfigError> {
        self.load_with_preprocess(path, |text| Ok::<_, CodecError>(text.to_owned()))
            .await
    }

    /// Like [`load`](Self::load), but passes the trimmed file text through
    /// `preprocess` before parsing.
    ///
    /// An error returned by `preprocess`, or a panic inside it, is reported as
    /// [`ConfigError::Parse`], the same as a syntax error in the file.
    pub async fn load_with_preprocess<F, E>(
        &self,
        path: impl AsRef<Path>,
        preprocess: F,
    ) -> Result<Option<ConfigValue>, ConfigError>
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: Into<CodecError>,
    {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ConfigError::from_read(path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| ConfigError::parse(path, e))?;

        let text = text.trim_start_matches('\u{feff}').trim();
        if text.is_empty() {
            debug!(path = %path.display(), "config file is empty");
            return Ok(None);
        }

        let value = self
            .preprocess_and_parse(text, preprocess)
            .map_err(|e| ConfigError::parse(path, e))?;

        debug!(path = %path.display(), "loaded config file");
        Ok(Some(value))
    }

    /// Loads the file, then resolves `${...}` placeholders against `context`
    /// and the loaded document itself.
    ///
    /// An empty file yields `Ok(None)` without resolving anything.
    pub async fn load_with_resolve_placeholder(
        &self,
        path: impl AsRef<Path>,
        context: &ConfigValue,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        let loaded = self.load(path).await?;
        Ok(loaded.map(|value| resolve_placeholders(&value, context)))
    }

    /// Serializes `value` and writes it to `path`, replacing any existing content.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the write fails. A value the format cannot
    /// represent (e.g. `null` in TOML) is also reported as [`ConfigError::Io`],
    /// wrapping an error of kind [`InvalidData`](std::io::ErrorKind::InvalidData).
    pub async fn save(&self, path: impl AsRef<Path>, value: &ConfigValue) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        let text = self
            .codec
            .stringify(value)
            .map_err(|e| io_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        tokio::fs::write(path, text).await.map_err(io_error)?;

        debug!(path = %path.display(), "saved config file");
        Ok(())
    }

    /// Deep-merges `partial` into the file at `path`, writes the result back
    /// and returns it.
    ///
    /// A missing or empty file is treated as an empty mapping, so this creates
    /// the file if needed. An empty mapping as `partial` leaves the content
    /// unchanged whatever its root. Read or parse failures on an existing file are
    /// returned and the file is left untouched.
    pub async fn update(
        &self,
        path: impl AsRef<Path>,
        partial: &ConfigValue,
    ) -> Result<ConfigValue, ConfigError> {
        let path = path.as_ref();
        let base = match self.load(path).await {
            Ok(Some(value)) => value,
            Ok(None) | Err(ConfigError::NotFound { .. }) => ConfigValue::Object(ConfigMap::new()),
            Err(e) => return Err(e),
        };

        // an empty partial keeps any root as is, arrays included
        let merged = if partial.as_object().is_some_and(ConfigMap::is_empty) {
            base
        } else {
            merge(&base, partial)
        };
        self.save(path, &merged).await?;

        debug!(path = %path.display(), "updated config file");
        Ok(merged)
    }

    /// Like [`update`](Self::update), taking the partial value from the file at
    /// `source_path`.
    ///
    /// The source file must exist; an empty source contributes nothing.
    pub async fn update_by_file(
        &self,
        path: impl AsRef<Path>,
        source_path: impl AsRef<Path>,
    ) -> Result<ConfigValue, ConfigError> {
        let partial = self
            .load(source_path)
            .await?
            .unwrap_or_else(|| ConfigValue::Object(ConfigMap::new()));

        self.update(path, &partial).await
    }

    /// Runs the preprocess hook and the codec inside one failure boundary.
    fn preprocess_and_parse<F, E>(&self, text: &str, preprocess: F) -> Result<ConfigValue, CodecError>
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: Into<CodecError>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<ConfigValue, CodecError> {
            let processed = preprocess(text).map_err(Into::<CodecError>::into)?;
            self.codec.parse(&processed)
        }));

        let value = match outcome {
            Ok(result) => result?,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(%message, "config preprocessing panicked");
                return Err(format!("preprocessing panicked: {message}").into());
            }
        };

        match value {
            ConfigValue::Object(_) | ConfigValue::Array(_) => Ok(value),
            _ => Err("config root must be a mapping or an array".into()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
