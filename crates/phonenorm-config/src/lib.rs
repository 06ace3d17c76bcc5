use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use phonenorm_core::{normalize_country_id, CoreError, CountryId, CountryRule, Registry};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const APP_DIR: &str = "phonenorm";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_COUNTRY: &str = "SN";
pub const DEFAULT_COUNTRY_ENV: &str = "PHONE_NORMALIZER_DEFAULT_COUNTRY";

/// Merged, not yet compiled configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub default_country: String,
    pub countries: BTreeMap<String, CountryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountryConfig {
    pub code: String,
    pub pattern: String,
    pub length: usize,
}

impl CountryConfig {
    fn new(code: &str, pattern: &str, length: usize) -> Self {
        Self {
            code: code.to_string(),
            pattern: pattern.to_string(),
            length,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_country: DEFAULT_COUNTRY.to_string(),
            countries: builtin_countries(),
        }
    }
}

fn builtin_countries() -> BTreeMap<String, CountryConfig> {
    BTreeMap::from([
        (
            "SN".to_string(),
            CountryConfig::new("+221", "^7[05678][0-9]{7}$", 9),
        ),
        (
            "CI".to_string(),
            CountryConfig::new("+225", "^(0[157]|2[57])[0-9]{8}$", 10),
        ),
    ])
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid default country: {0:?}")]
    InvalidDefaultCountry(String),
    #[error("invalid rule for country {country}: {source}")]
    InvalidCountry {
        country: String,
        #[source]
        source: CoreError,
    },
    #[error("no countries configured")]
    NoCountries,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_country: Option<String>,
    builtin_countries: Option<bool>,
    #[serde(default)]
    countries: BTreeMap<String, CountryConfig>,
}

impl RegistryConfig {
    /// Compiles every rule and builds the shared registry.
    pub fn build(&self) -> Result<Registry> {
        if self.countries.is_empty() {
            return Err(ConfigError::NoCountries);
        }
        let default_country = CountryId::new(&self.default_country)
            .map_err(|_| ConfigError::InvalidDefaultCountry(self.default_country.clone()))?;

        let mut rules = Vec::with_capacity(self.countries.len());
        for (country, entry) in &self.countries {
            let invalid = |source| ConfigError::InvalidCountry {
                country: country.clone(),
                source,
            };
            let id = CountryId::new(country).map_err(invalid)?;
            let rule =
                CountryRule::new(&entry.code, &entry.pattern, entry.length).map_err(invalid)?;
            rules.push((id, rule));
        }

        let registry =
            Registry::new(default_country, rules).map_err(|source| ConfigError::InvalidCountry {
                country: match &source {
                    CoreError::DuplicateCountry(id) => id.clone(),
                    _ => self.default_country.clone(),
                },
                source,
            })?;
        if !registry.contains(registry.default_country().as_str()) {
            warn!(
                country = %registry.default_country(),
                "default country has no rule; calls without a country will be rejected"
            );
        }
        Ok(registry)
    }
}

/// Loads the config file (if any), applies the environment override and
/// builds the registry.
pub fn load(config_path: Option<PathBuf>) -> Result<Registry> {
    let mut config = load_config(config_path)?;
    apply_default_override(&mut config, env::var(DEFAULT_COUNTRY_ENV).ok());
    config.build()
}

pub fn load_config(config_path: Option<PathBuf>) -> Result<RegistryConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(RegistryConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => {
            return Ok(RegistryConfig::default())
        }
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => {
            debug!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => {
            debug!(path = %path.display(), "config missing, using built-in rules");
            Ok(RegistryConfig::default())
        }
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn apply_default_override(config: &mut RegistryConfig, value: Option<String>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            debug!(country = trimmed, "default country overridden from environment");
            config.default_country = trimmed.to_string();
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<RegistryConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::default();

    if parsed.builtin_countries == Some(false) {
        config.countries.clear();
    }

    let mut seen = Vec::with_capacity(parsed.countries.len());
    for (raw, entry) in parsed.countries {
        let key = normalize_country_id(&raw).map_err(|source| ConfigError::InvalidCountry {
            country: raw.clone(),
            source,
        })?;
        if seen.contains(&key) {
            return Err(ConfigError::InvalidCountry {
                country: raw,
                source: CoreError::DuplicateCountry(key),
            });
        }
        seen.push(key.clone());
        config.countries.insert(key, entry);
    }

    if let Some(default_country) = parsed.default_country {
        config.default_country = default_country;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{
        apply_default_override, load_at_path, merge_config, ConfigError, ConfigFile,
        CountryConfig, RegistryConfig,
    };
    use phonenorm_core::{CoreError, Normalizer};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn empty_file() -> ConfigFile {
        ConfigFile {
            default_country: None,
            builtin_countries: None,
            countries: BTreeMap::new(),
        }
    }

    #[test]
    fn default_config_builds_reference_rules() {
        let registry = RegistryConfig::default().build().expect("build");
        assert_eq!(registry.default_country().as_str(), "SN");
        assert_eq!(registry.len(), 2);
        let ci = registry.lookup_rule("CI").expect("ci");
        assert_eq!(ci.dialing_code(), "+225");
        assert_eq!(ci.length(), 10);

        let normalizer = Normalizer::new(registry);
        assert_eq!(
            normalizer.normalize("78 485 28 12", None).as_deref(),
            Some("+221784852812")
        );
    }

    #[test]
    fn merge_config_overrides_and_extends_builtins() {
        let mut parsed = empty_file();
        parsed.default_country = Some("ml".to_string());
        parsed.countries.insert(
            "ml".to_string(),
            CountryConfig::new("+223", "^[2-9][0-9]{7}$", 8),
        );
        parsed.countries.insert(
            "SN".to_string(),
            CountryConfig::new("+221", "^7[0-9]{8}$", 9),
        );

        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.default_country, "ml");
        assert_eq!(merged.countries.len(), 3);
        assert_eq!(merged.countries["SN"].pattern, "^7[0-9]{8}$");
        assert!(merged.countries.contains_key("ML"));

        let registry = merged.build().expect("build");
        assert_eq!(registry.default_country().as_str(), "ML");
    }

    #[test]
    fn merge_config_can_drop_builtins() {
        let mut parsed = empty_file();
        parsed.builtin_countries = Some(false);
        parsed.countries.insert(
            "CI".to_string(),
            CountryConfig::new("+225", "^(0[157]|2[57])[0-9]{8}$", 10),
        );
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.countries.len(), 1);
        assert!(!merged.countries.contains_key("SN"));
    }

    #[test]
    fn merge_config_rejects_case_duplicates() {
        let mut parsed = empty_file();
        parsed
            .countries
            .insert("CI".to_string(), CountryConfig::new("+225", "[0-9]+", 10));
        parsed
            .countries
            .insert("ci".to_string(), CountryConfig::new("+225", "[0-9]+", 10));
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidCountry {
                source: CoreError::DuplicateCountry(_),
                ..
            }
        ));
    }

    #[test]
    fn build_rejects_bad_rule() {
        let mut config = RegistryConfig::default();
        config
            .countries
            .insert("SN".to_string(), CountryConfig::new("221", "[0-9]+", 9));
        let err = config.build().unwrap_err();
        assert!(err.to_string().contains("invalid rule for country SN"));
    }

    #[test]
    fn build_rejects_empty_country_set() {
        let config = RegistryConfig {
            default_country: "SN".to_string(),
            countries: BTreeMap::new(),
        };
        assert!(matches!(config.build(), Err(ConfigError::NoCountries)));
    }

    #[test]
    fn build_rejects_malformed_default() {
        let mut config = RegistryConfig::default();
        config.default_country = "S N".to_string();
        assert!(matches!(
            config.build(),
            Err(ConfigError::InvalidDefaultCountry(_))
        ));
    }

    #[test]
    fn build_accepts_default_without_rule() {
        let mut config = RegistryConfig::default();
        config.default_country = "FR".to_string();
        let normalizer = Normalizer::new(config.build().expect("build"));
        assert_eq!(normalizer.normalize("78 485 28 12", None), None);
        assert!(normalizer.normalize("0123456789", Some("CI")).is_some());
    }

    #[test]
    fn default_override_ignores_blank_values() {
        let mut config = RegistryConfig::default();
        apply_default_override(&mut config, Some("  ".to_string()));
        assert_eq!(config.default_country, "SN");
        apply_default_override(&mut config, None);
        assert_eq!(config.default_country, "SN");
        apply_default_override(&mut config, Some(" CI ".to_string()));
        assert_eq!(config.default_country, "CI");
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("load").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "default_country = \"CI\"\n\n[countries.GM]\ncode = \"+220\"\npattern = \"^[2-9][0-9]{6}$\"\nlength = 7\n",
        )
        .expect("write config");

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.default_country, "CI");
        assert_eq!(config.countries.len(), 3);
        assert_eq!(config.countries["GM"].code, "+220");
    }

    #[test]
    fn load_at_path_rejects_unknown_fields() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[countries.SN]\ncode = \"+221\"\npattern = \"[0-9]+\"\nlength = 9\nprefix = \"0\"\n",
        )
        .expect("write config");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
