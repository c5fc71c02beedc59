// ============================================================================
// Background Worker
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui possède un runtime tokio
// - Reçoit des FetchCommand via un channel (command_rx)
// - Chaque commande devient une tâche tokio : plusieurs fetches peuvent
//   être en vol en même temps (un ancien fetch n'est jamais annulé)
// - Renvoie des FetchResult via un autre channel (result_tx)
// - L'état de l'application n'est modifié QUE par le thread UI
// ============================================================================

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::api::{ApiError, CoinSource};
use crate::models::{CoinDetail, CoinSummary, PricePoint};

/// Numéro de requête : seule la réponse à la dernière requête est appliquée
pub type Generation = u64;

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCommand {
    /// Charger la liste des coins
    LoadListing { generation: Generation },

    /// Phase A : détail d'un coin
    LoadDetail { id: String, generation: Generation },

    /// Phase B : historique de prix d'un coin
    LoadChart { id: String, generation: Generation },
}

/// Résultats renvoyés par le worker thread
///
/// CONCEPT : Un résultat par commande, succès OU erreur
/// - Le thread UI reçoit toujours une réponse et peut clore l'état Loading
#[derive(Debug)]
pub enum FetchResult {
    ListingLoaded {
        generation: Generation,
        result: Result<Vec<CoinSummary>, ApiError>,
    },

    DetailLoaded {
        generation: Generation,
        result: Result<CoinDetail, ApiError>,
    },

    ChartLoaded {
        generation: Generation,
        result: Result<Vec<PricePoint>, ApiError>,
    },
}

/// Exécute une commande et produit son résultat
///
/// CONCEPT RUST : async fn + trait object
/// - source : &dyn CoinSource (vrai backend ou source de test)
pub async fn execute(source: &dyn CoinSource, command: FetchCommand) -> FetchResult {
    match command {
        FetchCommand::LoadListing { generation } => FetchResult::ListingLoaded {
            generation,
            result: source.list_coins().await,
        },
        FetchCommand::LoadDetail { id, generation } => FetchResult::DetailLoaded {
            generation,
            result: source.coin_detail(&id).await,
        },
        FetchCommand::LoadChart { id, generation } => FetchResult::ChartLoaded {
            generation,
            result: source.price_history(&id).await,
        },
    }
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - Le thread s'arrête quand command_tx est droppé (channel fermé)
///
/// # Arguments
/// * `source` - Source de données partagée entre les tâches
/// * `command_rx` - Receiver pour recevoir les commandes
/// * `result_tx` - Sender pour envoyer les résultats
pub fn spawn_worker(
    source: Arc<dyn CoinSource>,
    command_rx: mpsc::Receiver<FetchCommand>,
    result_tx: mpsc::Sender<FetchResult>,
) -> Result<JoinHandle<()>> {
    // Crée le runtime avant de lancer le thread pour remonter l'erreur
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let handle = std::thread::Builder::new()
        .name("fetch-worker".to_string())
        .spawn(move || {
            // Boucle de traitement des commandes
            // - recv() bloque le worker (pas l'UI)
            // - chaque commande est exécutée dans sa propre tâche
            while let Ok(command) = command_rx.recv() {
                info!(?command, "Worker received command");

                let source = source.clone();
                let result_tx = result_tx.clone();
                runtime.spawn(async move {
                    let result = execute(source.as_ref(), command).await;
                    if result_tx.send(result).is_err() {
                        // L'UI est fermée : le résultat n'a plus de destinataire
                        debug!("Result channel closed, dropping fetch result");
                    }
                });
            }

            // Channel fermé, on quitte
            info!("Worker thread exiting (channel closed)");
            runtime.shutdown_background();
        })
        .context("Échec du lancement du worker thread")?;

    Ok(handle)
}

/// Log un échec de fetch de manière uniforme
pub(crate) fn log_failure(what: &str, id: Option<&str>, err: &ApiError) {
    // Concatène la chaîne des causes (reqwest, serde_json, ...)
    let mut chain = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }

    error!(what, coin = id.unwrap_or("-"), malformed = err.is_malformed(), error = %chain, "Fetch failed");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::models::MarketData;

    /// Source en mémoire : "bitcoin" existe, le reste renvoie une erreur
    struct FakeSource;

    fn not_found(id: &str) -> ApiError {
        ApiError::Status {
            url: format!("http://localhost:3005/coins/{}", id),
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }

    #[async_trait]
    impl CoinSource for FakeSource {
        async fn list_coins(&self) -> Result<Vec<CoinSummary>, ApiError> {
            Ok(vec![CoinSummary {
                id: "bitcoin".to_string(),
                name: "Bitcoin".to_string(),
                symbol: "btc".to_string(),
                current_price: Some(67000.5),
                image: String::new(),
            }])
        }

        async fn coin_detail(&self, id: &str) -> Result<CoinDetail, ApiError> {
            if id != "bitcoin" {
                return Err(not_found(id));
            }
            Ok(CoinDetail {
                id: id.to_string(),
                name: "Bitcoin".to_string(),
                symbol: "btc".to_string(),
                image: String::new(),
                description: String::new(),
                market: MarketData {
                    current_price: 67000.5,
                    market_cap: None,
                    change_percent_24h: None,
                },
            })
        }

        async fn price_history(&self, id: &str) -> Result<Vec<PricePoint>, ApiError> {
            if id != "bitcoin" {
                return Err(not_found(id));
            }
            Ok(vec![PricePoint::new(DateTime::from_timestamp(0, 0).unwrap(), 1.0)])
        }
    }

    #[tokio::test]
    async fn test_execute_detail_keeps_generation() {
        let result = execute(
            &FakeSource,
            FetchCommand::LoadDetail {
                id: "bitcoin".to_string(),
                generation: 3,
            },
        )
        .await;

        match result {
            FetchResult::DetailLoaded { generation, result } => {
                assert_eq!(generation, 3);
                assert_eq!(result.unwrap().market.current_price, 67000.5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_errors_as_results() {
        let result = execute(
            &FakeSource,
            FetchCommand::LoadChart {
                id: "dogecoin".to_string(),
                generation: 1,
            },
        )
        .await;

        assert!(matches!(result, FetchResult::ChartLoaded { result: Err(_), .. }));
    }

    #[test]
    fn test_worker_round_trip() {
        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(FakeSource), command_rx, result_tx).unwrap();

        command_tx.send(FetchCommand::LoadListing { generation: 1 }).unwrap();
        let result = result_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match result {
            FetchResult::ListingLoaded { generation, result } => {
                assert_eq!(generation, 1);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // Fermer le channel arrête le worker
        drop(command_tx);
        handle.join().unwrap();
    }
}
