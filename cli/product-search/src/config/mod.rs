use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use product_catalog::DEFAULT_CATALOG_URL;
use serde::{Deserialize, Serialize};
use tracing::debug;
use xdg::BaseDirectories;

use crate::search::DEFAULT_DEBOUNCE_DELAY;

/// Name of product-search managed directories (config, cache)
const DIR_NAME: &str = "product-search";
const CONFIG_DIR_VAR: &str = "PRODUCT_SEARCH_CONFIG_DIR";
const ENV_PREFIX: &str = "PRODUCT_SEARCH";
pub const CONFIG_FILE: &str = "product-search.toml";

/// Describes the configuration of product-search
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Base URL of the product catalog
    pub catalog_url: String,
    /// How long the search field has to be idle before a search is sent
    pub debounce_ms: u64,
    /// User agent sent with catalog requests (default: `product-search/<version>`)
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Directory where product-search stores ephemeral data such as logs
    /// (default: `$XDG_CACHE_HOME/product-search`)
    pub cache_dir: PathBuf,
    /// Directory where product-search loads its configuration file from
    /// (default: `$XDG_CONFIG_HOME/product-search`)
    pub config_dir: PathBuf,
}

impl Config {
    /// Creates a [Config] from config files and the environment
    ///
    /// Later sources override earlier ones:
    ///
    /// 1. built-in defaults
    /// 2. `/etc/product-search/product-search.toml`
    /// 3. `product-search.toml` in `$XDG_CONFIG_DIRS`
    /// 4. `product-search.toml` in `$PRODUCT_SEARCH_CONFIG_DIR`
    ///    or `$XDG_CONFIG_HOME/product-search`
    /// 5. `PRODUCT_SEARCH_<KEY>` environment variables
    pub fn parse() -> Result<Config> {
        let raw_config = read_raw_config()?;
        let config: Config = raw_config
            .try_deserialize()
            .context("Could not parse config")?;
        debug!(?config, "parsed config");
        Ok(config)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Path of the log file used while the terminal UI is active
    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join("logs").join("browse.log")
    }
}

fn read_raw_config() -> Result<HierarchicalConfig> {
    let dirs = BaseDirectories::with_prefix(DIR_NAME);

    let cache_dir = dirs
        .get_cache_home()
        .context("Could not determine cache directory, is $HOME set?")?;

    let config_dir = match env::var(CONFIG_DIR_VAR) {
        Ok(v) => {
            debug!("`${CONFIG_DIR_VAR}` set: {v}");
            PathBuf::from(v)
        },
        Err(_) => {
            let config_dir = dirs
                .get_config_home()
                .context("Could not determine config directory, is $HOME set?")?;
            debug!("`${CONFIG_DIR_VAR}` not set, using {config_dir:?}");
            config_dir
        },
    };

    let mut builder = HierarchicalConfig::builder()
        .set_default("catalog_url", DEFAULT_CATALOG_URL)?
        .set_default("debounce_ms", DEFAULT_DEBOUNCE_DELAY.as_millis() as u64)?
        .set_default("cache_dir", path_to_str(&cache_dir)?)?
        // Config dir is added to the config for completeness;
        // the config file cannot change the config dir.
        .set_override("config_dir", path_to_str(&config_dir)?)?;

    // read from /etc
    builder = builder.add_source(
        config::File::from(PathBuf::from("/etc").join(DIR_NAME).join(CONFIG_FILE))
            .format(config::FileFormat::Toml)
            .required(false),
    );

    // look for files in XDG_CONFIG_DIRS locations
    for file in dirs.find_config_files(CONFIG_FILE) {
        if file.parent() == Some(config_dir.as_path()) {
            continue;
        }
        builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
    }

    // Add the file in the config dir last
    builder = builder.add_source(
        config::File::from(config_dir.join(CONFIG_FILE))
            .format(config::FileFormat::Toml)
            .required(false),
    );

    // override via env variables
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    Ok(builder.build()?)
}

fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid unicode: {path:?}"))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write_config_file(config_dir: &Path, contents: &str) {
        std::fs::create_dir_all(config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILE), contents).unwrap();
    }

    /// Parse the config with XDG dirs pointed into `home`
    /// and only the given `PRODUCT_SEARCH_*` variables set.
    fn parse_isolated(home: &TempDir, vars: &[(&str, Option<&str>)]) -> Result<Config> {
        let home = home.path();
        let config_home = home.join("config");
        let cache_home = home.join("cache");
        let config_home = config_home.to_str().unwrap();
        let cache_home = cache_home.to_str().unwrap();

        let mut all_vars = vec![
            ("HOME", Some(home.to_str().unwrap())),
            ("XDG_CONFIG_HOME", Some(config_home)),
            ("XDG_CACHE_HOME", Some(cache_home)),
            ("XDG_CONFIG_DIRS", Some("/nonexistent")),
        ];
        for name in [
            CONFIG_DIR_VAR,
            "PRODUCT_SEARCH_CATALOG_URL",
            "PRODUCT_SEARCH_DEBOUNCE_MS",
            "PRODUCT_SEARCH_USER_AGENT",
            "PRODUCT_SEARCH_CACHE_DIR",
        ] {
            if !vars.iter().any(|(set, _)| *set == name) {
                all_vars.push((name, None));
            }
        }
        all_vars.extend_from_slice(vars);

        temp_env::with_vars(all_vars, Config::parse)
    }

    #[test]
    fn defaults() {
        let home = TempDir::new().unwrap();
        let config = parse_isolated(&home, &[]).unwrap();

        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.debounce_delay(), DEFAULT_DEBOUNCE_DELAY);
        assert_eq!(config.user_agent, None);
        assert_eq!(config.cache_dir, home.path().join("cache").join(DIR_NAME));
        assert_eq!(config.config_dir, home.path().join("config").join(DIR_NAME));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let home = TempDir::new().unwrap();
        write_config_file(
            &home.path().join("config").join(DIR_NAME),
            indoc! {r#"
                catalog_url = "http://catalog.internal:8080"
                debounce_ms = 150
                user_agent = "kiosk/1.0"
            "#},
        );

        let config = parse_isolated(&home, &[]).unwrap();

        assert_eq!(config.catalog_url, "http://catalog.internal:8080");
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.user_agent.as_deref(), Some("kiosk/1.0"));
    }

    #[test]
    fn config_dir_variable_selects_file() {
        let home = TempDir::new().unwrap();
        let custom = home.path().join("custom");
        write_config_file(&custom, "debounce_ms = 50\n");

        let config =
            parse_isolated(&home, &[(CONFIG_DIR_VAR, Some(custom.to_str().unwrap()))]).unwrap();

        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.config_dir, custom);
    }

    #[test]
    fn env_overrides_file() {
        let home = TempDir::new().unwrap();
        write_config_file(
            &home.path().join("config").join(DIR_NAME),
            "catalog_url = \"http://from-file\"\ndebounce_ms = 150\n",
        );

        let config = parse_isolated(&home, &[
            ("PRODUCT_SEARCH_CATALOG_URL", Some("http://from-env")),
            ("PRODUCT_SEARCH_DEBOUNCE_MS", Some("75")),
        ])
        .unwrap();

        assert_eq!(config.catalog_url, "http://from-env");
        assert_eq!(config.debounce_ms, 75);
    }

    #[test]
    fn invalid_value_is_an_error() {
        let home = TempDir::new().unwrap();
        write_config_file(
            &home.path().join("config").join(DIR_NAME),
            "debounce_ms = \"soon\"\n",
        );

        let err = parse_isolated(&home, &[]).unwrap_err();
        assert_eq!(err.to_string(), "Could not parse config");
    }

    #[test]
    fn log_file_is_in_cache_dir() {
        let home = TempDir::new().unwrap();
        let config = parse_isolated(&home, &[]).unwrap();
        assert!(config.log_file().starts_with(&config.cache_dir));
    }
}
