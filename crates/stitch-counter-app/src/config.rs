use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use stitch_counter_core::{Adjustment, CounterFormat};

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "stitch-counter";

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "STITCH_COUNTER_DATA_DIR";

/// Application configuration loaded from `<data_dir>/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Counter and progress templates.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Defaults for new counters.
    #[serde(default)]
    pub counter: CounterConfig,
    /// Persistence mode.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    /// Load configuration from `data_dir`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = data_dir.as_ref().join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.display.format()?;
        self.counter.default_adjustment()?;
        Ok(())
    }
}

/// Text templates used when printing counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_counter")]
    counter: String,
    #[serde(default = "DisplayConfig::default_progress")]
    progress: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            counter: Self::default_counter(),
            progress: Self::default_progress(),
        }
    }
}

impl DisplayConfig {
    fn default_counter() -> String {
        CounterFormat::default().counter_template().to_owned()
    }

    fn default_progress() -> String {
        CounterFormat::default().progress_template().to_owned()
    }

    /// Validated templates.
    ///
    /// # Errors
    /// Returns an error if a template lacks its placeholder.
    pub fn format(&self) -> Result<CounterFormat> {
        CounterFormat::new(self.counter.as_str(), self.progress.as_str())
            .context("display templates are invalid")
    }
}

/// Defaults applied to new counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterConfig {
    #[serde(default = "CounterConfig::default_step")]
    default_adjustment: i64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            default_adjustment: Self::default_step(),
        }
    }
}

impl CounterConfig {
    fn default_step() -> i64 {
        Adjustment::default().into()
    }

    /// Step given to newly created counters.
    ///
    /// # Errors
    /// Returns an error unless the configured step is 1, 5 or 10.
    pub fn default_adjustment(&self) -> Result<Adjustment> {
        Adjustment::from_amount(self.default_adjustment)
            .context("counter.default_adjustment must be 1, 5 or 10")
    }
}

/// How counters are handed to storage.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PersistenceConfig {
    /// Write on a background worker instead of inline.
    #[serde(default)]
    pub background: bool,
}

/// Resolve the data directory: explicit path, then [`ENV_DATA_DIR`], then the
/// platform data directory.
///
/// # Errors
/// Returns an error if no directory can be determined.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let mut fetch = |key: &'static str| env::var_os(key).map(PathBuf::from);
    resolve_data_dir_with(explicit, &mut fetch, dirs::data_dir)
}

fn resolve_data_dir_with(
    explicit: Option<PathBuf>,
    fetch: &mut impl FnMut(&'static str) -> Option<PathBuf>,
    platform_dir: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = fetch(ENV_DATA_DIR) {
        if dir.as_os_str().is_empty() {
            bail!("{ENV_DATA_DIR} is set but empty");
        }
        return Ok(dir);
    }
    platform_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| anyhow!("no data directory available; pass --data-dir or set {ENV_DATA_DIR}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &Path, contents: &str) -> Result<()> {
        let mut file = fs::File::create(dir.join(CONFIG_FILE))?;
        writeln!(file, "{contents}")?;
        Ok(())
    }

    #[test]
    fn missing_config_returns_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = AppConfig::from_dir(dir.path())?;
        let format = cfg.display.format()?;
        assert_eq!(format.format_counter(12), "12");
        assert_eq!(format.format_progress(40), "40%");
        assert_eq!(cfg.counter.default_adjustment()?, Adjustment::One);
        assert!(!cfg.persistence.background);
        Ok(())
    }

    #[test]
    fn load_config_with_templates_and_step() -> Result<()> {
        let dir = tempdir()?;
        write_config(
            dir.path(),
            "[display]\ncounter = \"Stitches: {value}\"\nprogress = \"{percent}% done\"\n\n[counter]\ndefault_adjustment = 5\n\n[persistence]\nbackground = true",
        )?;

        let cfg = AppConfig::from_dir(dir.path())?;
        let format = cfg.display.format()?;
        assert_eq!(format.format_counter(7), "Stitches: 7");
        assert_eq!(format.format_progress(25), "25% done");
        assert_eq!(cfg.counter.default_adjustment()?, Adjustment::Five);
        assert!(cfg.persistence.background);
        Ok(())
    }

    #[test]
    fn template_without_placeholder_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[display]\ncounter = \"Stitches\"")?;

        let Err(err) = AppConfig::from_dir(dir.path()) else {
            panic!("template without placeholder should error");
        };
        assert!(format!("{err:#}").contains("display templates are invalid"));
        Ok(())
    }

    #[test]
    fn unsupported_default_step_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[counter]\ndefault_adjustment = 3")?;

        let Err(err) = AppConfig::from_dir(dir.path()) else {
            panic!("default step of 3 should error");
        };
        assert!(format!("{err:#}").contains("must be 1, 5 or 10"));
        Ok(())
    }

    #[test]
    fn parse_errors_name_the_file() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[display\ncounter = ")?;

        let Err(err) = AppConfig::from_dir(dir.path()) else {
            panic!("malformed toml should error");
        };
        assert!(err.to_string().contains("failed to parse"));
        assert!(err.to_string().contains(CONFIG_FILE));
        Ok(())
    }

    #[test]
    fn data_dir_prefers_explicit_then_env_then_platform() -> Result<()> {
        let mut no_env = |_: &'static str| None;
        let mut with_env = |key: &'static str| {
            assert_eq!(key, ENV_DATA_DIR);
            Some(PathBuf::from("/from/env"))
        };
        let platform = || Some(PathBuf::from("/platform"));

        assert_eq!(
            resolve_data_dir_with(Some(PathBuf::from("/cli")), &mut with_env, platform)?,
            PathBuf::from("/cli")
        );
        assert_eq!(
            resolve_data_dir_with(None, &mut with_env, platform)?,
            PathBuf::from("/from/env")
        );
        assert_eq!(
            resolve_data_dir_with(None, &mut no_env, platform)?,
            PathBuf::from("/platform/stitch-counter")
        );
        assert!(resolve_data_dir_with(None, &mut no_env, || None).is_err());
        Ok(())
    }
}
