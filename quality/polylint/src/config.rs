//! Configuration
//!
//! Reads configuration from:
//! - `.polylintrc.yaml` / `.polylintrc.yml` / `.polylintrc.json` (project-level)
//! - the same names in the home directory (user-level)

use crate::diagnostic::Severity;
use code_detector::Language;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched by [`Config::load_default`], in order
pub const CONFIG_FILE_NAMES: [&str; 3] = [".polylintrc.yaml", ".polylintrc.yml", ".polylintrc.json"];

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lint files in parallel
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Show summary statistics
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            statistics: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Compact,
    /// One display string per input
    Plain,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            "plain" => Ok(OutputFormat::Plain),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/vendor/**".to_string(),
                "**/*.min.js".to_string(),
            ],
        }
    }
}

/// Rule configuration
///
/// Rule ids may be plain (`magic-number`) or qualified with a language
/// (`java/magic-number`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Disabled rules
    pub disabled: Vec<String>,

    /// Severity overrides (rule_id -> severity)
    pub severity: HashMap<String, Severity>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// File handling settings
    pub files: FilesConfig,

    /// Rule configuration
    pub rules: RulesConfig,

    /// Skip detection and lint everything as this language
    pub language: Option<Language>,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from default locations: built-in defaults, then
    /// the home directory file, then the working directory file
    pub fn load_default() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        Self::load_layered(dirs::home_dir().as_deref(), &cwd)
    }

    /// Layer the first config file found in `home` and then in `project`
    /// over the defaults. Later layers take precedence.
    pub fn load_layered(home: Option<&Path>, project: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let mut dirs = Vec::new();
        if let Some(home) = home {
            dirs.push(home);
        }
        if home != Some(project) {
            dirs.push(project);
        }

        for dir in dirs {
            if let Some(path) = Self::find_in(dir) {
                config.merge(Self::load(&path)?);
            }
        }
        Ok(config)
    }

    /// First config file present in `dir`
    fn find_in(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.files.exclude {
            Glob::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("bad exclude pattern '{}': {}", pattern, e))
            })?;
        }
        if self.language == Some(Language::Unknown) {
            return Err(ConfigError::Invalid(
                "language cannot be 'unknown'".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence where it
    /// differs from the defaults)
    pub fn merge(&mut self, other: Self) {
        if other.engine.jobs != 0 {
            self.engine.jobs = other.engine.jobs;
        }
        if !other.engine.parallel {
            self.engine.parallel = false;
        }

        if other.output.format != OutputFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.color != ColorMode::Auto {
            self.output.color = other.output.color;
        }
        if !other.output.statistics {
            self.output.statistics = false;
        }

        for pattern in other.files.exclude {
            if !self.files.exclude.contains(&pattern) {
                self.files.exclude.push(pattern);
            }
        }

        self.rules.disabled.extend(other.rules.disabled);
        self.rules.severity.extend(other.rules.severity);

        if other.language.is_some() {
            self.language = other.language;
        }
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        color: Option<ColorMode>,
        jobs: Option<usize>,
        disabled_rules: Option<Vec<String>>,
        language: Option<Language>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(c) = color {
            self.output.color = c;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disabled) = disabled_rules {
            self.rules.disabled.extend(disabled);
        }
        if language.is_some() {
            self.language = language;
        }
    }

    /// Compiled exclude patterns; invalid patterns are skipped
    pub fn exclude_set(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.files.exclude {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => log::warn!("Skipping exclude pattern '{}': {}", pattern, e),
            }
        }
        builder.build().unwrap_or_else(|_| GlobSet::empty())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.language.is_none());
        assert!(config.rules.disabled.is_empty());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(ColorMode::Never),
            Some(4),
            Some(vec!["magic-number".to_string()]),
            Some(Language::Go),
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.color, ColorMode::Never);
        assert_eq!(config.engine.jobs, 4);
        assert!(config.rules.disabled.contains(&"magic-number".to_string()));
        assert_eq!(config.language, Some(Language::Go));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = Config::new();
        base.rules.disabled.push("no-var".to_string());

        let mut other = Config::new();
        other.engine.parallel = false;
        other.output.format = OutputFormat::Compact;
        other.rules.disabled.push("eqeqeq".to_string());
        other.rules.severity.insert("no-eval".to_string(), Severity::Info);

        base.merge(other);
        assert!(!base.engine.parallel);
        assert_eq!(base.output.format, OutputFormat::Compact);
        assert_eq!(base.rules.disabled, vec!["no-var", "eqeqeq"]);
        assert_eq!(base.rules.severity.get("no-eval"), Some(&Severity::Info));
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
output:
  format: json
rules:
  disabled:
    - magic-number
    - php/echo-output
  severity:
    no-console: error
language: typescript
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.rules.disabled.len(), 2);
        assert_eq!(config.rules.severity.get("no-console"), Some(&Severity::Error));
        assert_eq!(config.language, Some(Language::TypeScript));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"output": {{"format": "plain"}}, "rules": {{"disabled": ["no-var"]}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Plain);
        assert_eq!(config.rules.disabled, vec!["no-var"]);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = NamedTempFile::with_suffix(".toml").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_bad_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "engine: [not, a, map").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_rejects_bad_exclude_glob() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "files:\n  exclude:\n    - \"src/[unclosed\"").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_exclude_set() {
        let excludes = Config::new().exclude_set();
        assert!(excludes.is_match(Path::new("web/node_modules/lib/index.js")));
        assert!(excludes.is_match(Path::new("dist/app.min.js")));
        assert!(!excludes.is_match(Path::new("src/app.js")));
    }

    #[test]
    fn test_load_layered_project_over_home() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            home.path().join(".polylintrc.yaml"),
            "engine:\n  jobs: 2\noutput:\n  format: compact\nrules:\n  disabled:\n    - no-var\n",
        )
        .unwrap();
        fs::write(
            project.path().join(".polylintrc.json"),
            r#"{"output": {"format": "json"}, "rules": {"disabled": ["eqeqeq"]}, "files": {"exclude": ["build/**"]}}"#,
        )
        .unwrap();

        let config = Config::load_layered(Some(home.path()), project.path()).unwrap();
        assert_eq!(config.engine.jobs, 2);
        assert!(config.engine.parallel);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.rules.disabled, vec!["no-var", "eqeqeq"]);
        assert!(config.files.exclude.contains(&"build/**".to_string()));
        let node_modules = config
            .files
            .exclude
            .iter()
            .filter(|p| p.contains("node_modules"))
            .count();
        assert_eq!(node_modules, 1);
    }

    #[test]
    fn test_load_layered_without_files() {
        let home = TempDir::new().unwrap();
        let config = Config::load_layered(Some(home.path()), home.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.rules.disabled.is_empty());
    }

    #[test]
    fn test_load_layered_propagates_errors() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".polylintrc.yml"), "engine: [oops").unwrap();
        assert!(matches!(
            Config::load_layered(None, project.path()),
            Err(ConfigError::Yaml(_))
        ));
    }
}
