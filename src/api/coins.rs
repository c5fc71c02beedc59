// ============================================================================
// API Client : backend CoinView
// ============================================================================
// Récupère la liste des coins, le détail d'un coin et son historique de prix
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Erreurs typées : ApiError distingue réseau / statut / JSON
// 3. Serde : désérialisation JSON automatique
// 4. async_trait : implémentation du trait CoinSource
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::api::{ApiError, CoinSource, Endpoints};
use crate::models::{CoinDetail, CoinSummary, MarketData, PricePoint};

// ============================================================================
// Structures pour parser les réponses JSON du backend
// ============================================================================
// On définit des structures qui matchent exactement le JSON pour que serde
// puisse désérialiser automatiquement, puis on convertit vers nos modèles.
//
// CONCEPT RUST : #[serde(default)]
// - Un champ absent prend sa valeur par défaut au lieu de faire échouer
//   tout le payload (image, description, market_cap, ...)
// ============================================================================

/// Entrée de GET /coins
#[derive(Debug, Deserialize)]
struct ListingEntry {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    image: Option<String>,
}

/// Réponse de GET /coins/{id}
#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    image: Option<ImageRefs>,
    #[serde(default)]
    description: Option<Localized>,
    market_data: MarketDataWire,
}

#[derive(Debug, Deserialize)]
struct ImageRefs {
    #[serde(default)]
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Localized {
    #[serde(default)]
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketDataWire {
    current_price: UsdValue,
    #[serde(default)]
    market_cap: Option<OptionalUsd>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

/// Prix obligatoire : sans lui le payload est considéré comme invalide
#[derive(Debug, Deserialize)]
struct UsdValue {
    usd: f64,
}

#[derive(Debug, Deserialize)]
struct OptionalUsd {
    #[serde(default)]
    usd: Option<f64>,
}

/// Réponse de GET /coins/{id}/chart
#[derive(Debug, Deserialize)]
struct ChartResponse {
    /// Paires [timestampMillis, prix]
    prices: Vec<(f64, f64)>,
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client du backend (un seul reqwest::Client réutilisé pour toutes les requêtes)
///
/// CONCEPT RUST : reqwest::Client est Clone + Send + Sync
/// - Il contient un pool de connexions partagé (Arc interne)
/// - On peut le partager entre tâches tokio sans Mutex
#[derive(Debug, Clone)]
pub struct CoinApi {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl CoinApi {
    /// Crée le client avec un timeout global par requête
    pub fn new(endpoints: Endpoints, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        debug!(?timeout, "Creating HTTP client");
        let client = reqwest::Client::builder()
            .user_agent(concat!("coinview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self { client, endpoints })
    }

    /// GET + vérification du statut + lecture du corps
    ///
    /// CONCEPT : Séparer les erreurs
    /// - send() / bytes() échouent → Transport
    /// - statut non-2xx → Status
    /// - le parsing est fait par l'appelant → Decode
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, ApiError> {
        debug!(url = %url, "Sending HTTP request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, url = %url, "Backend returned error status");
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let body = self.get_bytes(url).await?;
        decode(url, &body)
    }
}

#[async_trait]
impl CoinSource for CoinApi {
    #[instrument(skip(self))]
    async fn list_coins(&self) -> Result<Vec<CoinSummary>, ApiError> {
        let url = self.endpoints.coins_url()?;
        let entries: Vec<ListingEntry> = self.get_json(&url).await?;
        let coins = listing_from_wire(entries);

        info!(coins = coins.len(), "Successfully fetched coin list");
        Ok(coins)
    }

    #[instrument(skip(self))]
    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, ApiError> {
        let url = self.endpoints.coin_url(id)?;
        let response: DetailResponse = self.get_json(&url).await?;
        let detail = detail_from_wire(response);

        info!(coin = %detail.id, price = detail.market.current_price, "Successfully fetched coin detail");
        Ok(detail)
    }

    #[instrument(skip(self))]
    async fn price_history(&self, id: &str) -> Result<Vec<PricePoint>, ApiError> {
        let url = self.endpoints.chart_url(id)?;
        let response: ChartResponse = self.get_json(&url).await?;
        let points = history_from_wire(response);

        info!(points = points.len(), "Successfully fetched price history");
        Ok(points)
    }
}

// ============================================================================
// Conversion JSON → modèles
// ============================================================================

fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|source| {
        warn!(url = %url, error = %source, "Malformed JSON payload");
        ApiError::Decode {
            url: url.to_string(),
            source,
        }
    })
}

/// Convertit la liste ; un coin sans prix reste listé (prix "N/A")
fn listing_from_wire(entries: Vec<ListingEntry>) -> Vec<CoinSummary> {
    let coins: Vec<CoinSummary> = entries
        .into_iter()
        .map(|entry| CoinSummary {
            id: entry.id,
            name: entry.name,
            symbol: entry.symbol,
            current_price: entry.current_price,
            image: entry.image.unwrap_or_default(),
        })
        .collect();

    let unpriced = coins.iter().filter(|coin| coin.current_price.is_none()).count();
    if unpriced > 0 {
        debug!(unpriced, total = coins.len(), "Listing contains coins without a price");
    }

    coins
}

fn detail_from_wire(response: DetailResponse) -> CoinDetail {
    let market = response.market_data;

    CoinDetail {
        id: response.id,
        name: response.name,
        symbol: response.symbol,
        image: response.image.and_then(|img| img.large).unwrap_or_default(),
        description: response.description.and_then(|d| d.en).unwrap_or_default(),
        market: MarketData {
            current_price: market.current_price.usd,
            market_cap: market.market_cap.and_then(|cap| cap.usd),
            change_percent_24h: market.price_change_percentage_24h,
        },
    }
}

/// Convertit les paires [ms, prix] en PricePoint, ordre de réception conservé
fn history_from_wire(response: ChartResponse) -> Vec<PricePoint> {
    let total = response.prices.len();
    let mut skipped_count = 0;
    let mut points = Vec::with_capacity(total);

    for (millis, price) in response.prices {
        // Timestamp hors de la plage de chrono : on ignore le point
        match DateTime::from_timestamp_millis(millis as i64) {
            Some(timestamp) if price.is_finite() => points.push(PricePoint::new(timestamp, price)),
            _ => skipped_count += 1,
        }
    }

    if skipped_count > 0 {
        warn!(skipped = skipped_count, total, "Skipped price points with invalid data");
    }

    points
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("http://localhost:3005/coins/bitcoin").unwrap()
    }

    const BITCOIN: &str = r#"{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "btc",
        "image": { "large": "https://img.example/btc.png" },
        "description": { "en": "Bitcoin is <b>digital</b> money. More text." },
        "market_data": {
            "current_price": { "usd": 67012.345678 },
            "market_cap": { "usd": 1320000000000 },
            "price_change_percentage_24h": 2.5
        }
    }"#;

    #[test]
    fn test_decode_detail() {
        let response: DetailResponse = decode(&url(), BITCOIN.as_bytes()).unwrap();
        let detail = detail_from_wire(response);

        assert_eq!(detail.id, "bitcoin");
        assert_eq!(detail.market.current_price, 67012.345678);
        assert_eq!(detail.market.market_cap, Some(1_320_000_000_000.0));
        assert_eq!(detail.market.change_percent_24h, Some(2.5));
        assert_eq!(detail.image, "https://img.example/btc.png");
        assert_eq!(detail.price_label(), "$67012.345678");
    }

    #[test]
    fn test_decode_detail_optional_fields() {
        let json = r#"{
            "id": "tiny", "name": "Tiny", "symbol": "tny",
            "market_data": { "current_price": { "usd": 0.5 } }
        }"#;
        let detail = detail_from_wire(decode(&url(), json.as_bytes()).unwrap());

        assert_eq!(detail.image, "");
        assert_eq!(detail.description, "");
        assert_eq!(detail.market.market_cap, None);
        assert_eq!(detail.market.change_percent_24h, None);
    }

    #[test]
    fn test_decode_detail_without_price_is_malformed() {
        let json = r#"{ "id": "x", "name": "X", "symbol": "x", "market_data": {} }"#;
        let err = decode::<DetailResponse>(&url(), json.as_bytes()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_decode_not_json() {
        let err = decode::<DetailResponse>(&url(), b"<html>502</html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn test_listing_keeps_coin_without_price() {
        let json = r#"[
            { "id": "bitcoin", "name": "Bitcoin", "symbol": "btc", "current_price": 67000.5, "image": "b.png" },
            { "id": "ghost", "name": "Ghost", "symbol": "gst", "current_price": null },
            { "id": "shadow", "name": "Shadow", "symbol": "shd" }
        ]"#;
        let entries: Vec<ListingEntry> = decode(&url(), json.as_bytes()).unwrap();
        let coins = listing_from_wire(entries);

        assert_eq!(coins.len(), 3);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[0].current_price, Some(67000.5));
        assert_eq!(coins[0].image, "b.png");
        assert_eq!(coins[1].id, "ghost");
        assert_eq!(coins[1].current_price, None);
        assert_eq!(coins[2].image, "");
    }

    #[test]
    fn test_history_keeps_order() {
        let json = r#"{ "prices": [[1086400000, 101.2], [1000000, 100.005]] }"#;
        let points = history_from_wire(decode(&url(), json.as_bytes()).unwrap());

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.timestamp_millis(), 1_086_400_000);
        assert_eq!(points[1].price, 100.005);
    }

    #[test]
    fn test_history_skips_out_of_range_timestamps() {
        let json = r#"{ "prices": [[1e300, 1.0], [1000, 2.0]] }"#;
        let points = history_from_wire(decode(&url(), json.as_bytes()).unwrap());

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 2.0);
    }

    // ========================================================================
    // Backend local : un TcpListener qui répond une seule fois
    // ========================================================================
    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Le serveur tourne dans une tâche spawnée sur le même runtime
    // ========================================================================

    /// Lance un serveur sur un port libre
    ///
    /// - Some(réponse) : lit la requête puis renvoie la réponse brute
    /// - None : ferme la connexion sans répondre
    async fn serve_once(response: Option<&'static str>) -> Endpoints {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                if let Some(response) = response {
                    let mut request = [0u8; 2048];
                    let _ = socket.read(&mut request).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            }
        });

        Endpoints::new(&base, &base).unwrap()
    }

    fn client(endpoints: Endpoints) -> CoinApi {
        CoinApi::new(endpoints, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let endpoints =
            serve_once(Some("HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")).await;

        let err = client(endpoints).coin_detail("bitcoin").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_malformed());
    }

    #[tokio::test]
    async fn test_closed_connection_is_transport_error() {
        let endpoints = serve_once(None).await;

        let err = client(endpoints).price_history("bitcoin").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert!(!err.is_malformed());
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let endpoints = serve_once(Some(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops",
        ))
        .await;

        let err = client(endpoints).list_coins().await.unwrap_err();
        assert!(err.is_malformed());
    }
}
