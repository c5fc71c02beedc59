// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client du backend (métadonnées + historique) et le
// trait CoinSource qui l'abstrait pour le worker et les tests
// ============================================================================

pub mod coins;     // Client HTTP reqwest
pub mod endpoints; // URLs de base et construction des chemins
pub mod error;     // ApiError

// Re-export des types principaux
pub use coins::CoinApi;
pub use endpoints::{Endpoints, DEFAULT_CHART_URL, DEFAULT_METADATA_URL};
pub use error::ApiError;

use async_trait::async_trait;

use crate::models::{CoinDetail, CoinSummary, PricePoint};

/// Source de données des coins
///
/// CONCEPT RUST : Trait object + async_trait
/// - Le worker manipule un Arc<dyn CoinSource>
/// - CoinApi parle au vrai backend, les tests fournissent une source en mémoire
/// - Send + Sync : la source est partagée entre tâches tokio
#[async_trait]
pub trait CoinSource: Send + Sync {
    /// GET {metadata}/coins
    async fn list_coins(&self) -> Result<Vec<CoinSummary>, ApiError>;

    /// GET {metadata}/coins/{id}
    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, ApiError>;

    /// GET {chart}/coins/{id}/chart
    async fn price_history(&self, id: &str) -> Result<Vec<PricePoint>, ApiError>;
}
