// ============================================================================
// Configuration
// ============================================================================
// Sources, de la plus faible à la plus forte :
//   1. valeurs par défaut
//   2. fichier TOML (--config, sinon ~/.config/stakedash/config.toml)
//   3. variables d'environnement (et fichier .env via dotenvy)
//   4. arguments de la ligne de commande (appliqués dans main)
//
// Aucune valeur n'est obligatoire : l'absence de configuration ne doit
// jamais empêcher le démarrage.
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::DEFAULT_API_BASE;

/// Variable d'environnement : URL du backend
pub const ENV_API_BASE: &str = "STAKEDASH_API_BASE";

/// Variable d'environnement : adresse de wallet préconfigurée
pub const ENV_ADDRESS: &str = "STAKEDASH_ADDRESS";

/// Variable d'environnement : intervalle de rafraîchissement (secondes)
pub const ENV_REFRESH_SECS: &str = "STAKEDASH_REFRESH_SECS";

/// Configuration de l'application
///
/// CONCEPT RUST : #[serde(default)]
/// - Tout champ absent du fichier prend la valeur de Config::default()
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL de base du backend de staking
    pub api_base: String,

    /// Adresse proposée par le connector "Configured address"
    pub address: Option<String>,

    /// Rafraîchissement automatique du dashboard (0 = désactivé)
    pub refresh_interval_secs: u64,

    /// Carnet d'adresses : adresse → nom affiché
    pub aliases: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            address: None,
            refresh_interval_secs: 0,
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Charge la configuration (défauts → fichier → environnement)
    ///
    /// Un chemin explicite qui n'existe pas est une erreur ; le fichier par
    /// défaut est simplement ignoré s'il est absent.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // .env optionnel
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No configuration file, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Lit un fichier TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
        info!(path = %path.display(), "Configuration file loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Échec du parsing TOML")
    }

    /// Applique les variables d'environnement
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - `lookup` remplace std::env::var, ce qui rend la fonction testable
    /// - Une valeur vide est ignorée (comme une variable absente)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(api_base) = get(ENV_API_BASE) {
            self.api_base = api_base;
        }

        if let Some(address) = get(ENV_ADDRESS) {
            self.address = Some(address);
        }

        if let Some(raw) = get(ENV_REFRESH_SECS) {
            match raw.parse() {
                Ok(secs) => self.refresh_interval_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_REFRESH_SECS),
            }
        }
    }

    /// Intervalle de rafraîchissement, None si désactivé
    pub fn refresh_interval(&self) -> Option<std::time::Duration> {
        match self.refresh_interval_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}

/// ~/.config/stakedash/config.toml (selon la plateforme)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stakedash").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://localhost:8080");
        assert!(config.address.is_none());
        assert!(config.refresh_interval().is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
            api_base = "https://staking.example.com"

            [aliases]
            "0x1234567890abcdef1234567890abcdef12345678" = "cold wallet"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base, "https://staking.example.com");
        assert_eq!(config.refresh_interval_secs, 0);
        assert_eq!(config.aliases.len(), 1);
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("api_base = ").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml(r#"api_base = "http://file:1""#).unwrap();
        config.apply_env(env(&[
            (ENV_API_BASE, "http://env:2"),
            (ENV_ADDRESS, "0xabc"),
            (ENV_REFRESH_SECS, "30"),
        ]));

        assert_eq!(config.api_base, "http://env:2");
        assert_eq!(config.address.as_deref(), Some("0xabc"));
        assert_eq!(config.refresh_interval(), Some(std::time::Duration::from_secs(30)));
    }

    #[test]
    fn test_blank_or_invalid_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_API_BASE, "   "), (ENV_REFRESH_SECS, "soon")]));

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::from_file(Path::new("/nonexistent/stakedash.toml"));
        assert!(result.is_err());
    }
}
