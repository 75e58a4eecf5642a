use crate::similarity::Tolerance;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub uninstall: UninstallConfig,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GeneralConfig {
    /// List hotfixes and other updates alongside programs.
    #[serde(default)]
    pub include_updates: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MatchingConfig {
    #[serde(default)]
    pub tolerance: Tolerance,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UninstallConfig {
    #[serde(default = "default_installer")]
    pub installer: String,
    #[serde(default = "default_true")]
    pub prompt_restart: bool,
}

fn default_installer() -> String { "msiexec.exe".to_string() }
fn default_true() -> bool { true }

impl Default for UninstallConfig {
    fn default() -> Self {
        Self {
            installer: default_installer(),
            prompt_restart: true,
        }
    }
}

pub fn config_path() -> PathBuf {
    match ProjectDirs::from("org", "bye", "bye") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn load_config() -> Result<Config> {
    let config_path = config_path();
    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config {}", config_path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(!config.general.include_updates);
        assert_eq!(config.matching.tolerance, Tolerance::Strong);
        assert_eq!(config.uninstall.installer, "msiexec.exe");
        assert!(config.uninstall.prompt_restart);
    }

    #[test]
    fn reads_all_sections() {
        let config = parse_config(
            r#"
            [general]
            include_updates = true

            [matching]
            tolerance = "weak"

            [uninstall]
            installer = 'C:\Windows\System32\msiexec.exe'
            prompt_restart = false
            "#,
        )
        .unwrap();
        assert!(config.general.include_updates);
        assert_eq!(config.matching.tolerance, Tolerance::Weak);
        assert_eq!(config.uninstall.installer, r"C:\Windows\System32\msiexec.exe");
        assert!(!config.uninstall.prompt_restart);
    }

    #[test]
    fn rejects_unknown_tolerance() {
        assert!(parse_config("[matching]\ntolerance = \"fuzzy\"").is_err());
    }
}
