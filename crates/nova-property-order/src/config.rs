use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::provider::{ClassRoots, SourceEncoding, SourceRoots, UnsupportedEncoding};
use crate::recovery::{OrderRecovery, RecoveryStrategy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Encoding(#[from] UnsupportedEncoding),
}

/// Settings for declaration-order recovery.
///
/// ```toml
/// enabled = true
/// strategy = "auto"          # auto | source_only | binary_only | off
/// source_roots = ["src/main/java"]
/// class_roots = ["target/classes"]
/// encoding = "UTF-8"
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyOrderConfig {
    /// When `false`, members are always left in their supplied order.
    #[serde(default = "PropertyOrderConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub strategy: RecoveryStrategy,
    /// Source roots searched in order (relative to the config file unless absolute).
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,
    /// Classfile output directories searched in order.
    #[serde(default)]
    pub class_roots: Vec<PathBuf>,
    /// Encoding of the files under `source_roots`.
    #[serde(default = "PropertyOrderConfig::default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PropertyOrderConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_encoding() -> String {
        "UTF-8".to_owned()
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: PropertyOrderConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML config file. Relative roots are resolved against the
    /// file's directory.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_encoding().map(|_| ())
    }

    pub fn source_encoding(&self) -> Result<SourceEncoding, ConfigError> {
        Ok(self.encoding.parse()?)
    }

    /// The strategy actually in effect (`Off` when disabled).
    pub fn effective_strategy(&self) -> RecoveryStrategy {
        if self.enabled {
            self.strategy
        } else {
            RecoveryStrategy::Off
        }
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for root in self.source_roots.iter_mut().chain(self.class_roots.iter_mut()) {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }
}

impl Default for PropertyOrderConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            strategy: RecoveryStrategy::default(),
            source_roots: Vec::new(),
            class_roots: Vec::new(),
            encoding: Self::default_encoding(),
            logging: LoggingConfig::default(),
        }
    }
}

impl OrderRecovery<SourceRoots, ClassRoots> {
    /// Builds a filesystem-backed recovery from config.
    pub fn from_config(config: &PropertyOrderConfig) -> Result<Self, ConfigError> {
        let sources = SourceRoots::new(config.source_roots.clone(), config.source_encoding()?);
        let binaries = ClassRoots::new(config.class_roots.clone());
        Ok(OrderRecovery::new(sources, binaries).with_strategy(config.effective_strategy()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// Lowercases bare level names (`WARNING` -> `warn`); anything else is
    /// passed through as `EnvFilter` directives.
    fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            lower @ ("trace" | "debug" | "info" | "warn" | "error") => lower.to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    /// The effective filter: the configured directives, with `RUST_LOG` (if set)
    /// appended so it can raise or lower individual targets.
    pub fn env_filter(&self) -> EnvFilter {
        self.filter_with_overrides(std::env::var("RUST_LOG").ok().as_deref())
    }

    /// Tries `configured,overrides`, then `overrides` alone, then `configured`;
    /// `info` if none parse.
    fn filter_with_overrides(&self, overrides: Option<&str>) -> EnvFilter {
        let configured = Self::normalize_level_directives(&self.level);
        let overrides = overrides.map(str::trim).filter(|o| !o.is_empty());
        overrides
            .into_iter()
            .flat_map(|o| [format!("{configured},{o}"), o.to_owned()])
            .chain(std::iter::once(configured.clone()))
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

/// Installs a global stderr `fmt` subscriber for `config`.
///
/// Returns `false` if a global subscriber was already installed (e.g. by the
/// host process), in which case nothing changes.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn defaults_from_empty_toml() {
        let config = PropertyOrderConfig::load_from_str("").unwrap();
        assert_eq!(config, PropertyOrderConfig::default());
        assert_eq!(config.effective_strategy(), RecoveryStrategy::Auto);
        assert_eq!(config.source_encoding().unwrap(), SourceEncoding::Utf8);
    }

    #[test]
    fn parses_full_config() {
        let config = PropertyOrderConfig::load_from_str(
            r#"
            enabled = true
            strategy = "binary_only"
            source_roots = ["src/main/java", "/abs/gen"]
            class_roots = ["target/classes"]
            encoding = "ISO-8859-1"

            [logging]
            level = "Debug"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.strategy, RecoveryStrategy::BinaryOnly);
        assert_eq!(config.source_encoding().unwrap(), SourceEncoding::Latin1);
        assert!(config.logging.json);
        assert_eq!(LoggingConfig::normalize_level_directives(&config.logging.level), "debug");
    }

    #[test]
    fn disabled_means_off() {
        let config =
            PropertyOrderConfig::load_from_str("enabled = false\nstrategy = \"source_only\"")
                .unwrap();
        assert_eq!(config.effective_strategy(), RecoveryStrategy::Off);
        let recovery = OrderRecovery::from_config(&config).unwrap();
        assert_eq!(recovery.strategy(), RecoveryStrategy::Off);
    }

    #[test]
    fn rejects_unknown_keys_and_encodings() {
        assert!(matches!(
            PropertyOrderConfig::load_from_str("sourceRoots = []"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            PropertyOrderConfig::load_from_str("strategy = \"sometimes\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            PropertyOrderConfig::load_from_str("encoding = \"EBCDIC\""),
            Err(ConfigError::Encoding(_))
        ));
    }

    #[test]
    fn relative_roots_resolve_against_base() {
        let mut config = PropertyOrderConfig {
            source_roots: vec![PathBuf::from("src"), PathBuf::from("/abs")],
            class_roots: vec![PathBuf::from("out")],
            ..PropertyOrderConfig::default()
        };
        config.resolve_relative_to(Path::new("/project"));
        assert_eq!(
            config.source_roots,
            vec![PathBuf::from("/project/src"), PathBuf::from("/abs")]
        );
        assert_eq!(config.class_roots, vec![PathBuf::from("/project/out")]);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(filter: EnvFilter, emit: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn configured_level_filters_events() {
        let logging = LoggingConfig {
            level: "DEBUG".to_owned(),
            ..LoggingConfig::default()
        };
        let text = capture(logging.filter_with_overrides(None), || {
            tracing::trace!("trace-line");
            tracing::debug!("debug-line");
        });
        assert!(!text.contains("trace-line"), "{text}");
        assert!(text.contains("debug-line"), "{text}");
    }

    #[test]
    fn rust_log_directives_are_appended_to_config() {
        let logging = LoggingConfig {
            level: "warn".to_owned(),
            ..LoggingConfig::default()
        };
        let text = capture(
            logging.filter_with_overrides(Some(" nova.order_test=debug ")),
            || {
                tracing::debug!(target: "nova.order_test", "raised-debug");
                tracing::info!(target: "elsewhere", "other-info");
                tracing::warn!(target: "elsewhere", "other-warn");
            },
        );
        assert!(text.contains("raised-debug"), "{text}");
        assert!(!text.contains("other-info"), "{text}");
        assert!(text.contains("other-warn"), "{text}");
    }

    #[test]
    fn bad_rust_log_falls_back_to_config() {
        let logging = LoggingConfig {
            level: "warn".to_owned(),
            ..LoggingConfig::default()
        };
        for overrides in [Some("nova=loudest"), Some("   "), None] {
            let text = capture(logging.filter_with_overrides(overrides), || {
                tracing::info!("info-line");
                tracing::warn!("warn-line");
            });
            assert!(!text.contains("info-line"), "{overrides:?}: {text}");
            assert!(text.contains("warn-line"), "{overrides:?}: {text}");
        }
    }

    #[test]
    fn level_normalization() {
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(
            LoggingConfig::normalize_level_directives("nova.property_order=trace"),
            "nova.property_order=trace"
        );
    }
}
