use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use frelia_core::config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "./frelia.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
///
/// The pipeline settings sit at the top level of the file, next to `[build]`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FreliaConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Pipeline configuration (from frelia-core)
    #[serde(flatten)]
    pub pipeline: Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source directory containing documents
    pub source: String,
    /// Output directory for generated site
    pub output: String,
    /// Glob matching the templates
    pub templates: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "./site".to_string(),
            output: "./out".to_string(),
            templates: "./templates/**/*.html".to_string(),
        }
    }
}

impl FreliaConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (FRELIA_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        Self::load_with_env(args, environment())
    }

    fn load_with_env(args: &ArgMatches, env: Environment) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .ok()
            .flatten()
            .map_or(DEFAULT_CONFIG_FILE, String::as_str);

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        builder = builder.add_source(ConfigBuilder::try_from(&Self::default())?);

        // 2. Add configuration file if it exists
        if Path::new(config_file).exists() {
            tracing::debug!(path = config_file, "reading configuration file");
            builder = builder.add_source(File::new(config_file, FileFormat::Toml));
        }

        // 3. Add environment variables with FRELIA_ prefix
        builder = builder.add_source(env);

        // 4. Override with CLI arguments (highest priority)
        for key in ["source", "output", "templates"] {
            if let Some(value) = args.try_get_one::<String>(key).ok().flatten() {
                builder = builder.set_override(format!("build.{key}"), value.as_str())?;
            }
        }

        // Not through `#[serde(flatten)]`, which loses string-to-bool coercion for env values.
        let config = builder.build()?;
        Ok(Self {
            build: config.get("build")?,
            pipeline: config.try_deserialize()?,
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix("FRELIA")
        .prefix_separator("_")
        .separator("__") // Use double underscore for nested keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};
    use frelia_core::config::TransformSpec;

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("templates").long("templates").value_name("GLOB"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
    }

    #[test]
    fn test_default_config() {
        let config = FreliaConfig::default();
        assert_eq!(config.build.source, "./site");
        assert_eq!(config.build.output, "./out");
        assert_eq!(config.build.templates, "./templates/**/*.html");
        assert_eq!(config.pipeline.default_template, "base.html");
    }

    #[test]
    fn test_cli_args_override() {
        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--source", "/custom/source",
                "--output", "/custom/output",
                "--config", "/nonexistent/frelia.toml",
            ])
            .unwrap();

        let config = FreliaConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "/custom/source");
        assert_eq!(config.build.output, "/custom/output");
        // Should still have defaults for non-overridden values
        assert_eq!(config.build.templates, "./templates/**/*.html");
        assert!(config.pipeline.transforms.is_empty());
    }

    #[test]
    fn test_config_file_and_cli_precedence() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("frelia.toml");
        std::fs::write(
            &path,
            r#"
            default_template = "page.html"

            [build]
            source = "./content"
            output = "./public"

            [[transforms]]
            kind = "strip_extension"
            "#,
        )
        .unwrap();

        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--config", path.to_str().unwrap(),
                "--output", "./dist",
            ])
            .unwrap();

        let config = FreliaConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "./content");
        assert_eq!(config.build.output, "./dist");
        assert_eq!(config.pipeline.default_template, "page.html");
        assert_eq!(config.pipeline.transforms, [TransformSpec::StripExtension]);
    }

    #[test]
    fn test_env_vars_are_coerced() {
        let vars = config::Map::from([
            ("FRELIA_AUTOESCAPE".to_string(), "true".to_string()),
            ("FRELIA_DEFAULT_TEMPLATE".to_string(), "post.html".to_string()),
            ("FRELIA_BUILD__OUTPUT".to_string(), "2024".to_string()),
        ]);
        let matches = command()
            .try_get_matches_from(vec!["test", "--config", "/nonexistent/frelia.toml"])
            .unwrap();

        let config = FreliaConfig::load_with_env(&matches, environment().source(Some(vars))).unwrap();
        assert!(config.pipeline.autoescape);
        assert_eq!(config.pipeline.default_template, "post.html");
        assert_eq!(config.build.output, "2024");
        assert_eq!(config.build.source, "./site");
    }

    #[test]
    fn test_env_vars_override_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("frelia.toml");
        std::fs::write(&path, "autoescape = true\n[build]\nsource = \"./content\"\n").unwrap();

        let vars = config::Map::from([
            ("FRELIA_AUTOESCAPE".to_string(), "false".to_string()),
            ("FRELIA_BUILD__SOURCE".to_string(), "./docs".to_string()),
        ]);
        let matches = command()
            .try_get_matches_from(vec!["test", "--config", path.to_str().unwrap()])
            .unwrap();

        let config = FreliaConfig::load_with_env(&matches, environment().source(Some(vars))).unwrap();
        assert!(!config.pipeline.autoescape);
        assert_eq!(config.build.source, "./docs");
    }
}
