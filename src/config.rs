//! Configuration management for rulefmt.
//!
//! This module provides the [`Config`] struct which holds everything a run
//! needs besides its inputs. Configuration can be loaded from:
//! - TOML files (`.rulefmt.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching parent directories from the
//! first input up to the filesystem root, plus the user's home directory.
//!
//! ```toml
//! extensions = ["swift"]
//! exclude = ["Generated", "*.pb.swift"]
//! symlinks = "ignore"
//! disable = ["semicolons"]
//!
//! [options]
//! indent = 2
//! allman = false
//! maxblanklines = 1
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use glob::Pattern;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::options::{FileOptions, FormatOptions, OptionField};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &[".rulefmt.toml"];

/// Get the user's home directory
pub(crate) fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

/// How symbolic links met during traversal are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkMode {
    Follow,
    Ignore,
}

impl SymlinkMode {
    /// Parse the `--symlinks` argument
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "follow" => Ok(SymlinkMode::Follow),
            "ignore" => Ok(SymlinkMode::Ignore),
            other => bail!("Unsupported --symlinks value '{other}', expected follow|ignore"),
        }
    }
}

/// Run configuration, before per-run inputs are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub options: FormatOptions,
    /// Eligible file extensions, without the dot
    pub extensions: BTreeSet<String>,
    /// Glob patterns for files and directories to skip
    pub exclude: Vec<String>,
    pub symlinks: SymlinkMode,
    /// Explicit rule list; `None` runs the default catalog
    pub rules: Option<Vec<String>>,
    /// Rules removed from the selection
    pub disable: Vec<String>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    symlinks: Option<SymlinkMode>,
    rules: Option<Vec<String>>,
    disable: Option<Vec<String>>,
    #[serde(default)]
    options: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            options: FormatOptions::default(),
            extensions: FileOptions::default().supported_extensions,
            exclude: Vec::new(),
            symlinks: SymlinkMode::Ignore,
            rules: None,
            disable: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config
            .apply_file(path)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        self.apply_partial(&partial)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) -> Result<()> {
        if let Some(v) = &partial.extensions {
            self.extensions = v
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();
        }
        if let Some(v) = &partial.exclude {
            self.exclude.clone_from(v);
        }
        if let Some(v) = partial.symlinks {
            self.symlinks = v;
        }
        if let Some(v) = &partial.rules {
            self.rules = Some(v.clone());
        }
        if let Some(v) = &partial.disable {
            self.disable.clone_from(v);
        }
        for (key, value) in &partial.options {
            let field =
                OptionField::from_name(key).ok_or_else(|| anyhow!("unknown option '{key}'"))?;
            let text = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            field.apply(&mut self.options, &text)?;
        }
        Ok(())
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the path's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root to current: less specific to more specific
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Unreadable or invalid files are skipped with a warning.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in Self::discover_config_files(start_path) {
            debug!(path = %path.display(), "loading config file");
            let mut merged = config.clone();
            match merged.apply_file(&path) {
                Ok(()) => config = merged,
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }
        config
    }

    /// Traversal options for this configuration
    pub fn file_options(&self, concurrently: bool) -> Result<FileOptions> {
        let excluded = self
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .with_context(|| format!("invalid exclude pattern '{pattern}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FileOptions {
            follow_symlinks: self.symlinks == SymlinkMode::Follow,
            supported_extensions: self.extensions.clone(),
            concurrently,
            excluded,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::options::Indent;

    fn parse(text: &str) -> Result<Config> {
        let partial: PartialConfig = toml::from_str(text)?;
        let mut config = Config::default();
        config.apply_partial(&partial)?;
        Ok(config)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.options, FormatOptions::default());
        assert!(config.extensions.contains("swift"));
        assert_eq!(config.symlinks, SymlinkMode::Ignore);
        assert!(config.rules.is_none());
    }

    #[test]
    fn test_options_table() {
        let config = parse(
            r#"
            [options]
            indent = 2
            allman = true
            linebreaks = "crlf"
            "#,
        )
        .unwrap();
        assert_eq!(config.options.indent, Indent::Spaces(2));
        assert!(config.options.allman);
        assert_eq!(config.options.linebreak.as_str(), "\r\n");
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = parse("[options]\nwidth = 80\n").unwrap_err();
        assert_eq!(err.to_string(), "unknown option 'width'");
    }

    #[test]
    fn test_invalid_option_value_rejected() {
        let err = parse("[options]\nlinebreaks = \"nl\"\n").unwrap_err();
        assert!(err.to_string().contains("--linebreaks"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse("colour = true\n").is_err());
    }

    #[test]
    fn test_file_settings() {
        let config = parse(
            r#"
            extensions = [".kt", "kts"]
            exclude = ["build"]
            symlinks = "follow"
            rules = ["indent"]
            disable = ["semicolons"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.extensions,
            BTreeSet::from(["kt".to_string(), "kts".to_string()])
        );
        assert_eq!(config.symlinks, SymlinkMode::Follow);
        assert_eq!(config.rules, Some(vec!["indent".to_string()]));
        assert_eq!(config.disable, vec!["semicolons".to_string()]);

        let file_options = config.file_options(false).unwrap();
        assert!(file_options.follow_symlinks);
        assert!(!file_options.concurrently);
        assert!(file_options.is_excluded(Path::new("build")));
    }

    #[test]
    fn test_apply_partial_preserves_unset() {
        let mut base = Config::default();
        base.options.indent = Indent::Tab;
        base.exclude = vec!["vendor".to_string()];

        let partial: PartialConfig = toml::from_str("[options]\nallman = true\n").unwrap();
        base.apply_partial(&partial).unwrap();
        assert_eq!(base.options.indent, Indent::Tab);
        assert!(base.options.allman);
        assert_eq!(base.exclude, vec!["vendor".to_string()]);
    }

    #[test]
    fn test_bad_exclude_pattern() {
        let config = Config {
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.file_options(true).is_err());
    }

    #[test]
    fn test_discovery_order_and_merge() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(outer.join(".rulefmt.toml"), "[options]\nindent = 2\nallman = true\n").unwrap();
        fs::write(inner.join(".rulefmt.toml"), "[options]\nindent = 8\n").unwrap();

        let found: Vec<_> = Config::discover_config_files(&inner)
            .into_iter()
            .filter(|path| path.starts_with(tmp.path()))
            .collect();
        assert_eq!(
            found,
            vec![outer.join(".rulefmt.toml"), inner.join(".rulefmt.toml")]
        );

        let config = Config::from_discovered_files(&inner);
        assert_eq!(config.options.indent, Indent::Spaces(8));
        assert!(config.options.allman);
    }

    #[test]
    fn test_invalid_discovered_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".rulefmt.toml"), "[options]\nindent = \"wide\"\n").unwrap();
        let config = Config::from_discovered_files(tmp.path());
        assert_eq!(config.options.indent, Indent::Spaces(4));
    }

    #[test]
    fn test_explicit_file_error_names_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "symlinks = \"sometimes\"\n").unwrap();
        let err = Config::from_toml_file(&path).unwrap_err();
        assert!(err.to_string().contains("custom.toml"));
    }

    #[test]
    fn test_symlink_mode_from_name() {
        assert_eq!(SymlinkMode::from_name("follow").unwrap(), SymlinkMode::Follow);
        assert!(SymlinkMode::from_name("maybe").is_err());
    }
}
