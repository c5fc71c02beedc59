// ============================================================================
// Contrôleur de la vue Détail
// ============================================================================
// Possède tout le cycle de vie d'une vue détail :
//   Phase A : fetch du détail du coin
//   Phase B : fetch de l'historique puis (re)construction du graphique
//
// Machine à états (par vue montée) :
//   Idle → Loading → {LoadedEmpty | Loaded}
//        → [si Loaded] LoadingChart → {ChartReady | ChartSkipped}
//
// CONCEPTS RUST :
// 1. Enum pour state machine : DetailPhase
// 2. Générique sur ChartSurface : le vrai rendu ou une surface de test
// 3. Option::take() : sortir le handle du graphique pour le détruire
// 4. Générations : seule la réponse à la DERNIÈRE requête est appliquée
// ============================================================================

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::chart::{AxisConfig, ChartSeries, ChartSurface, RenderTarget};
use crate::models::{to_chart_points, CoinDetail, PricePoint};
use crate::worker::{log_failure, FetchCommand, Generation};

/// Message affiché pendant le chargement du détail
pub const LOADING_MESSAGE: &str = "Loading coin details...";

/// Message affiché quand le détail n'a pas pu être chargé
pub const NOT_FOUND_MESSAGE: &str = "Coin not found";

pub const CHART_LOADING_MESSAGE: &str = "Loading chart...";

pub const CHART_UNAVAILABLE_MESSAGE: &str = "Chart unavailable";

/// Raison pour laquelle aucun graphique n'est affiché
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSkip {
    /// La cible de rendu a disparu avant la réponse
    NoTarget,

    /// Le fetch de l'historique a échoué
    FetchFailed,

    /// La surface a refusé la construction
    Rejected,
}

/// État de la vue détail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    /// Aucune vue montée
    Idle,

    /// Phase A en cours
    Loading,

    /// Phase A échouée : "Coin not found"
    LoadedEmpty,

    /// Détail chargé, graphique pas encore demandé (pas de cible)
    Loaded,

    /// Phase B en cours
    LoadingChart,

    /// Graphique construit
    ChartReady,

    /// Graphique non construit
    ChartSkipped(ChartSkip),
}

/// Contrôleur de la vue détail
///
/// CONCEPT : État explicite
/// - Tous les champs sont privés
/// - Ils ne changent qu'à travers les transitions ci-dessous
/// - Le rendu (ui::detail) n'est qu'une projection de cet état
pub struct DetailController<S: ChartSurface> {
    surface: S,
    coin_id: Option<String>,
    phase: DetailPhase,
    detail: Option<CoinDetail>,
    target: Option<RenderTarget>,
    chart: Option<S::Handle>,
    detail_generation: Generation,
    chart_generation: Generation,
    next_target_id: u64,
}

impl<S: ChartSurface> DetailController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            coin_id: None,
            phase: DetailPhase::Idle,
            detail: None,
            target: None,
            chart: None,
            detail_generation: 0,
            chart_generation: 0,
            next_target_id: 0,
        }
    }

    // ========================================================================
    // Accesseurs (lecture seule)
    // ========================================================================

    pub fn phase(&self) -> DetailPhase {
        self.phase
    }

    pub fn coin_id(&self) -> Option<&str> {
        self.coin_id.as_deref()
    }

    pub fn detail(&self) -> Option<&CoinDetail> {
        self.detail.as_ref()
    }

    pub fn target(&self) -> Option<RenderTarget> {
        self.target
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Graphique à dessiner (seulement quand il correspond au détail affiché)
    pub fn chart(&self) -> Option<&S::Handle> {
        match self.phase {
            DetailPhase::ChartReady => self.chart.as_ref(),
            _ => None,
        }
    }

    /// Phase A en vol
    pub fn is_loading(&self) -> bool {
        self.phase == DetailPhase::Loading
    }

    /// Message à afficher à la place du détail, s'il y en a un
    pub fn status_message(&self) -> Option<&'static str> {
        match self.phase {
            DetailPhase::Loading => Some(LOADING_MESSAGE),
            DetailPhase::LoadedEmpty => Some(NOT_FOUND_MESSAGE),
            _ => None,
        }
    }

    /// Message à afficher à la place du graphique
    pub fn chart_message(&self) -> Option<&'static str> {
        match self.phase {
            DetailPhase::LoadingChart => Some(CHART_LOADING_MESSAGE),
            DetailPhase::ChartSkipped(ChartSkip::FetchFailed | ChartSkip::Rejected) => {
                Some(CHART_UNAVAILABLE_MESSAGE)
            }
            _ => None,
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Monte la vue pour `id`
    ///
    /// Phase A démarre si l'identifiant change (ou si la vue était fermée).
    /// Retourne la commande à envoyer au worker.
    pub fn open(&mut self, id: &str) -> Option<FetchCommand> {
        if self.coin_id.as_deref() == Some(id) && self.phase != DetailPhase::Idle {
            return self.mount_target();
        }

        info!(coin = %id, "Opening coin detail");
        self.coin_id = Some(id.to_string());
        self.ensure_target();
        self.start_detail_fetch()
    }

    /// Relance Phase A pour l'identifiant courant
    pub fn reload(&mut self) -> Option<FetchCommand> {
        if self.phase == DetailPhase::Idle {
            return None;
        }
        info!(coin = ?self.coin_id, "Reloading coin detail");
        self.start_detail_fetch()
    }

    /// Démonte la vue : graphique détruit, réponses en vol ignorées
    pub fn close(&mut self) {
        debug!(coin = ?self.coin_id, "Closing coin detail");
        self.release_chart();
        self.target = None;
        self.coin_id = None;
        self.detail = None;
        self.phase = DetailPhase::Idle;
        self.detail_generation += 1;
        self.chart_generation += 1;
    }

    /// (Re)crée la cible de rendu
    ///
    /// Si le détail est déjà chargé, Phase B démarre maintenant.
    pub fn mount_target(&mut self) -> Option<FetchCommand> {
        if self.target.is_some() || self.phase == DetailPhase::Idle {
            return None;
        }

        self.ensure_target();
        match self.phase {
            DetailPhase::Loaded | DetailPhase::LoadingChart | DetailPhase::ChartSkipped(ChartSkip::NoTarget) => {
                self.request_chart()
            }
            _ => None,
        }
    }

    /// Supprime la cible de rendu (le graphique lié est détruit)
    pub fn unmount_target(&mut self) {
        if self.target.take().is_none() {
            return;
        }

        debug!("Render target unmounted");
        self.release_chart();
        if self.phase == DetailPhase::ChartReady {
            self.phase = DetailPhase::ChartSkipped(ChartSkip::NoTarget);
        }
    }

    /// Applique la réponse de Phase A
    ///
    /// CONCEPT : Clôture du Loading
    /// - Succès ET échec sortent de l'état Loading, une seule fois par requête
    /// - Une réponse d'une génération ancienne est ignorée
    pub fn apply_detail(
        &mut self,
        generation: Generation,
        result: Result<CoinDetail, ApiError>,
    ) -> Option<FetchCommand> {
        if generation != self.detail_generation || self.phase != DetailPhase::Loading {
            debug!(generation, current = self.detail_generation, "Discarding stale detail response");
            return None;
        }

        match result {
            Ok(detail) => {
                info!(coin = %detail.id, "Coin detail loaded");
                self.detail = Some(detail);
                self.phase = DetailPhase::Loaded;
                self.request_chart()
            }
            Err(err) => {
                log_failure("detail", self.coin_id.as_deref(), &err);
                self.detail = None;
                self.release_chart();
                self.phase = DetailPhase::LoadedEmpty;
                None
            }
        }
    }

    /// Applique la réponse de Phase B
    ///
    /// Ordre garanti : l'ancien graphique est détruit AVANT la construction
    /// du nouveau, jamais deux graphiques sur la même cible.
    pub fn apply_chart(&mut self, generation: Generation, result: Result<Vec<PricePoint>, ApiError>) {
        if generation != self.chart_generation || self.phase != DetailPhase::LoadingChart {
            debug!(generation, current = self.chart_generation, "Discarding stale chart response");
            return;
        }

        let points = match result {
            Ok(points) => points,
            Err(err) => {
                log_failure("chart", self.coin_id.as_deref(), &err);
                self.release_chart();
                self.phase = DetailPhase::ChartSkipped(ChartSkip::FetchFailed);
                return;
            }
        };

        // La cible a disparu pendant le fetch : rien n'est construit
        let target = match self.target {
            Some(target) => target,
            None => {
                debug!("Render target gone, skipping chart");
                self.phase = DetailPhase::ChartSkipped(ChartSkip::NoTarget);
                return;
            }
        };

        let series = ChartSeries::price_usd(to_chart_points(&points));

        self.release_chart();
        match self.surface.construct(target, series, AxisConfig::price_history()) {
            Ok(handle) => {
                info!(coin = ?self.coin_id, points = points.len(), "Chart ready");
                self.chart = Some(handle);
                self.phase = DetailPhase::ChartReady;
            }
            Err(err) => {
                warn!(error = %err, "Chart surface rejected construction");
                self.phase = DetailPhase::ChartSkipped(ChartSkip::Rejected);
            }
        }
    }

    // ========================================================================
    // Helpers privés
    // ========================================================================

    fn ensure_target(&mut self) {
        if self.target.is_none() {
            self.next_target_id += 1;
            self.target = Some(RenderTarget::new(self.next_target_id));
        }
    }

    /// Phase A : nouvelle génération, pas de données partielles affichées
    fn start_detail_fetch(&mut self) -> Option<FetchCommand> {
        let id = self.coin_id.clone()?;

        self.detail_generation += 1;
        // Une Phase B en vol appartient à l'ancien détail
        self.chart_generation += 1;
        self.detail = None;
        self.phase = DetailPhase::Loading;

        Some(FetchCommand::LoadDetail {
            id,
            generation: self.detail_generation,
        })
    }

    /// Phase B : nécessite identifiant + détail + cible
    fn request_chart(&mut self) -> Option<FetchCommand> {
        let id = self.coin_id.clone()?;
        self.detail.as_ref()?;

        if self.target.is_none() {
            debug!("No render target, chart fetch deferred");
            return None;
        }

        self.chart_generation += 1;
        self.phase = DetailPhase::LoadingChart;

        Some(FetchCommand::LoadChart {
            id,
            generation: self.chart_generation,
        })
    }

    fn release_chart(&mut self) {
        if let Some(handle) = self.chart.take() {
            self.surface.destroy(handle);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
