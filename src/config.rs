// ============================================================================
// Configuration
// ============================================================================
// Flags de la ligne de commande, chacun doublé d'une variable d'environnement
// (un fichier .env est chargé avant le parsing, voir main.rs)
//
// CONCEPT RUST : clap derive
// - #[derive(Parser)] génère le parser à partir de la struct
// - env = "..." : la variable d'environnement sert de valeur par défaut
// - Args (brut) → Config (validé) : les URLs sont vérifiées une seule fois
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::api::{Endpoints, DEFAULT_CHART_URL, DEFAULT_METADATA_URL};

/// Arguments bruts de la ligne de commande
#[derive(Debug, Clone, Parser)]
#[command(name = "coinview", version, about = "Crypto listing and coin detail viewer")]
pub struct Args {
    /// Base URL of the coin metadata service
    #[arg(long, env = "COINVIEW_METADATA_URL", default_value = DEFAULT_METADATA_URL)]
    pub metadata_url: String,

    /// Base URL of the price history service
    #[arg(long, env = "COINVIEW_CHART_URL", default_value = DEFAULT_CHART_URL)]
    pub chart_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "COINVIEW_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Directory for the rolling log files
    #[arg(long, env = "COINVIEW_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Open this coin's detail view on startup
    #[arg(long, env = "COINVIEW_COIN")]
    pub coin: Option<String>,
}

/// Configuration validée de l'application
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    pub timeout: Duration,
    pub log_dir: PathBuf,
    pub initial_coin: Option<String>,
}

impl Config {
    /// Valide les arguments
    ///
    /// Une URL invalide est une erreur fatale (avant de passer en raw mode)
    pub fn from_args(args: Args) -> Result<Self> {
        let endpoints = Endpoints::new(&args.metadata_url, &args.chart_url)
            .context("Configuration des endpoints invalide")?;

        if args.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs doit être strictement positif");
        }

        // Une chaîne vide (ex: COINVIEW_COIN= dans .env) équivaut à absent
        let initial_coin = args
            .coin
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Self {
            endpoints,
            timeout: Duration::from_secs(args.timeout_secs),
            log_dir: args.log_dir.unwrap_or_else(default_log_dir),
            initial_coin,
        })
    }
}

/// Répertoire de logs par défaut
///
/// - Linux : ~/.local/share/coinview/logs
/// - macOS : ~/Library/Application Support/coinview/logs
/// - Sinon : ./logs
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("coinview").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let args = Args::parse_from([
            "coinview",
            "--metadata-url",
            "https://meta.example.com/api",
            "--chart-url",
            "https://charts.example.com",
            "--timeout-secs",
            "3",
            "--log-dir",
            "/tmp/coinview-logs",
            "--coin",
            "ethereum",
        ]);
        let config = Config::from_args(args).unwrap();

        assert_eq!(
            config.endpoints.coin_url("ethereum").unwrap().as_str(),
            "https://meta.example.com/api/coins/ethereum"
        );
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/coinview-logs"));
        assert_eq!(config.initial_coin.as_deref(), Some("ethereum"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let args = Args::parse_from(["coinview", "--metadata-url", "localhost:3005"]);
        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let args = Args::parse_from(["coinview", "--timeout-secs", "0"]);
        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_blank_coin_means_none() {
        let args = Args::parse_from(["coinview", "--coin", "  "]);
        let config = Config::from_args(args).unwrap();
        assert!(config.initial_coin.is_none());
    }

    #[test]
    fn test_default_log_dir_ends_with_logs() {
        assert!(default_log_dir().ends_with("logs"));
    }
}
