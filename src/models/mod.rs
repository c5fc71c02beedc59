// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod coin;        // CoinSummary, CoinDetail, nettoyage de la description
pub mod price_point; // PricePoint, ChartPoint, formatage à 2 décimales

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use coinview::models::coin::CoinDetail;
// On peut faire : use coinview::models::CoinDetail;
pub use coin::{sanitize_description, CoinDetail, CoinSummary, MarketData};
pub use price_point::{format_price, to_chart_points, ChartPoint, PricePoint};
