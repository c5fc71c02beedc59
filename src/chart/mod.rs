// ============================================================================
// Module : chart
// ============================================================================
// Contrat consommé par le contrôleur de détail pour dessiner un graphique :
//
//   construct(target, series, axes) → handle
//   destroy(handle)
//
// CONCEPTS RUST :
// 1. Trait avec type associé : chaque surface choisit son type de handle
// 2. Ownership : destroy() consomme le handle, impossible de le réutiliser
// 3. Un seul handle vivant par cible, vérifié par la surface
// ============================================================================

pub mod terminal; // Surface ratatui (graphique retenu, dessiné à chaque frame)

pub use terminal::{TerminalChart, TerminalSurface};

use thiserror::Error;

use crate::models::ChartPoint;

/// Libellé de l'unique série du graphique de prix
pub const PRICE_SERIES_LABEL: &str = "Price (USD)";

/// Titre de l'axe X
pub const DATE_AXIS_TITLE: &str = "Date";

/// Titre de l'axe Y
pub const PRICE_AXIS_TITLE: &str = "Price in USD";

/// Lissage de la courbe (0 = segments droits)
pub const SMOOTHING_TENSION: f64 = 0.3;

// ============================================================================
// Cible de rendu
// ============================================================================

/// Zone de l'écran dans laquelle un graphique est dessiné
///
/// CONCEPT : Jeton de montage
/// - Chaque montage de la vue détail crée une nouvelle cible (id unique)
/// - Un handle est lié à UNE cible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    id: u64,
}

impl RenderTarget {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// ============================================================================
// Configuration du graphique
// ============================================================================

/// Unité de l'axe temporel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
}

impl TimeUnit {
    /// Durée de l'unité en secondes
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Day => 24 * 60 * 60,
        }
    }

    /// Format chrono des labels de l'axe
    pub fn label_format(&self) -> &'static str {
        match self {
            TimeUnit::Day => "%d %b",
        }
    }
}

/// Axe X temporel
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub title: String,
    pub unit: TimeUnit,
}

/// Axe Y linéaire
#[derive(Debug, Clone, PartialEq)]
pub struct LinearAxis {
    pub title: String,
}

/// Configuration des deux axes
#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub x: TimeAxis,
    pub y: LinearAxis,
}

impl AxisConfig {
    /// Axes du graphique de prix : temps par jour / prix en USD
    pub fn price_history() -> Self {
        Self {
            x: TimeAxis {
                title: DATE_AXIS_TITLE.to_string(),
                unit: TimeUnit::Day,
            },
            y: LinearAxis {
                title: PRICE_AXIS_TITLE.to_string(),
            },
        }
    }
}

/// Série de données à tracer
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,

    /// Lissage visuel uniquement, les points d'origine ne changent pas
    pub tension: f64,
}

impl ChartSeries {
    /// Série "Price (USD)" avec le lissage par défaut
    pub fn price_usd(points: Vec<ChartPoint>) -> Self {
        Self {
            label: PRICE_SERIES_LABEL.to_string(),
            points,
            tension: SMOOTHING_TENSION,
        }
    }
}

// ============================================================================
// Trait ChartSurface
// ============================================================================

/// Erreurs de la surface de rendu
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    /// Un graphique est déjà lié à cette cible (il faut le détruire avant)
    #[error("la cible {0} porte déjà un graphique")]
    TargetBusy(u64),
}

/// Capacité de dessin de graphiques
///
/// CONCEPT RUST : Type associé
/// - Handle : ressource possédée exclusivement par l'appelant
/// - destroy() prend le handle par valeur (move) : après l'appel,
///   le compilateur interdit toute utilisation du handle
pub trait ChartSurface {
    type Handle;

    /// Construit un graphique lié à `target`
    fn construct(
        &mut self,
        target: RenderTarget,
        series: ChartSeries,
        axes: AxisConfig,
    ) -> Result<Self::Handle, ChartError>;

    /// Libère un graphique (la cible redevient disponible)
    fn destroy(&mut self, handle: Self::Handle);
}
