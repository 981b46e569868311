//! Configuration loader and path helpers.
//!
//! Figment merges `catalog.toml` + `catalog.<env>.toml` + `CATALOG_*` env
//! vars (sections separated by `__`, e.g. `CATALOG_INDEX__DIR`) over built-in
//! defaults. Path values expand `~` and `${VAR}`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub index: IndexConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub dir: String,
    pub writer_heap_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig {
                dir: "./data/catalog-index".to_string(),
                writer_heap_bytes: 50_000_000,
            },
            search: SearchConfig {
                default_limit: 10,
                max_limit: 100,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Layered load rooted at `base`: defaults, then `catalog.toml`, then
    /// the environment-specific file, then `CATALOG_*` overrides.
    pub fn load_from(base: &Path, env_name: &str) -> Result<Self> {
        debug!(env = env_name, "loading configuration");
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(base.join("catalog.toml")));
        match env_name {
            "dev" | "development" => {
                figment = figment.merge(Toml::file(base.join("catalog.dev.toml")));
            }
            "prod" | "production" => {
                figment = figment.merge(Toml::file(base.join("catalog.prod.toml")));
            }
            "test" | "testing" => {
                figment = figment.merge(Toml::file(base.join("catalog.test.toml")));
            }
            _ => {}
        }
        figment = figment.merge(Env::prefixed("CATALOG_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The expanded on-disk location of the item index.
    pub fn index_dir(&self) -> PathBuf {
        expand_path(&self.index.dir)
    }

    fn validate(&self) -> Result<()> {
        if self.search.default_limit == 0 {
            return Err(Error::InvalidConfig(
                "search.default_limit must be positive".to_string(),
            ));
        }
        if self.search.max_limit < self.search.default_limit {
            return Err(Error::InvalidConfig(format!(
                "search.max_limit {} is below search.default_limit {}",
                self.search.max_limit, self.search.default_limit
            )));
        }
        // The engine refuses writer heaps below the low megabytes.
        if self.index.writer_heap_bytes < 15_000_000 {
            return Err(Error::InvalidConfig(format!(
                "index.writer_heap_bytes {} is below the 15MB engine minimum",
                self.index.writer_heap_bytes
            )));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. Absolute paths are returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
