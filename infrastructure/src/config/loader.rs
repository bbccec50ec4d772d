//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["leadflow.toml", ".leadflow.toml"];
const ENV_PREFIX: &str = "LEADFLOW_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `LEADFLOW_DISTRIBUTION__ROUNDING=half_even` etc.
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./leadflow.toml` or `./.leadflow.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/leadflow/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged provider chain, before extraction
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/leadflow/config.toml if set,
    /// otherwise falls back to ~/.config/leadflow/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("leadflow").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./leadflow.toml or ./.leadflow.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use leadflow_domain::{OutputFormat, RoundingRule};

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.tables.leads, "leads");
        assert!(config.audit.enabled);
        assert_eq!(config.output.format, None);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("leadflow"));
    }

    #[test]
    fn test_project_file_is_merged_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "leadflow.toml",
                r#"
[distribution]
rounding = "half_even"
assigned_by = "ops"

[tables]
assignments = "assignments"
"#,
            )?;

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.distribution.rounding, "half_even");
            assert_eq!(config.distribution.assigned_by, "ops");
            assert_eq!(config.tables.assignments, "assignments");
            // Untouched sections keep their defaults
            assert_eq!(config.tables.leads, "leads");
            assert_eq!(config.to_settings().0.rounding, RoundingRule::HalfEven);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".leadflow.toml", "[output]\nformat = \"table\"\n")?;
            jail.create_file("custom.toml", "[output]\nformat = \"json\"\ncolor = false\n")?;

            let config = ConfigLoader::load(Some(Path::new("custom.toml"))).map_err(|e| *e)?;
            assert_eq!(config.output.format, Some(OutputFormat::Json));
            assert!(!config.output.color);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("leadflow.toml", "[store]\ndata_file = \"from-file.json\"\n")?;
            jail.set_env("LEADFLOW_STORE__DATA_FILE", "from-env.json");
            jail.set_env("LEADFLOW_DISTRIBUTION__CREATE_DEALS", "true");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.store.data_file, PathBuf::from("from-env.json"));
            assert!(config.distribution.create_deals);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("leadflow.toml", "[audit]\nenabled = \"sometimes\"\n")?;
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
