// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Les transitions retournent les commandes à envoyer au worker
//    (App ne connaît pas les channels, elle reste testable)
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Seul le thread UI possède App (pas de Mutex)
// ============================================================================

use tracing::{debug, info};

use crate::chart::TerminalSurface;
use crate::detail::DetailController;
use crate::models::CoinSummary;
use crate::worker::{log_failure, FetchCommand, FetchResult, Generation};

/// Hauteur minimale du terminal pour afficher le graphique
///
/// En dessous, la cible de rendu est démontée (le graphique est détruit).
pub const MIN_CHART_HEIGHT: u16 = 20;

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : liste des coins
    Listing,

    /// Vue détail : coin sélectionné + graphique
    Detail,
}

/// État de la liste des coins
#[derive(Debug, Clone, PartialEq)]
pub enum ListingState {
    Loading,
    Loaded(Vec<CoinSummary>),
    Failed(String),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Liste des coins
    pub listing: ListingState,

    /// Index du coin sélectionné dans la liste
    pub selected_index: usize,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    /// Contrôleur de la vue détail (possède le graphique)
    pub detail: DetailController<TerminalSurface>,

    listing_generation: Generation,

    /// Le terminal est assez grand pour le graphique
    chart_fits: bool,
}

impl App {
    /// Crée une App sur l'écran Listing (rien n'est encore demandé)
    pub fn new() -> Self {
        Self {
            running: true,
            current_screen: Screen::Listing,
            listing: ListingState::Loading,
            selected_index: 0,
            confirm_quit: false,
            detail: DetailController::new(TerminalSurface::new()),
            listing_generation: 0,
            chart_fits: true,
        }
    }

    /// Commandes initiales : la liste, puis le détail si un coin est donné
    pub fn start(&mut self, initial_coin: Option<&str>) -> Vec<FetchCommand> {
        let mut commands = vec![self.refresh_listing()];
        if let Some(id) = initial_coin {
            commands.extend(self.open_detail(id));
        }
        commands
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Relance le chargement de la liste
    pub fn refresh_listing(&mut self) -> FetchCommand {
        self.listing_generation += 1;
        self.listing = ListingState::Loading;
        info!(generation = self.listing_generation, "Loading coin listing");
        FetchCommand::LoadListing {
            generation: self.listing_generation,
        }
    }

    /// Coins chargés (vide tant que la liste n'est pas chargée)
    pub fn coins(&self) -> &[CoinSummary] {
        match &self.listing {
            ListingState::Loaded(coins) => coins,
            _ => &[],
        }
    }

    /// Retourne le coin sélectionné
    ///
    /// CONCEPT RUST : Option<&T>
    /// - None si la liste est vide ou pas encore chargée
    pub fn selected_coin(&self) -> Option<&CoinSummary> {
        self.coins().get(self.selected_index)
    }

    /// Navigue vers le haut dans la liste
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() : soustrait mais ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas dans la liste
    pub fn navigate_down(&mut self) {
        let max_index = self.coins().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    // ========================================================================
    // Détail
    // ========================================================================

    /// Ouvre la vue détail du coin sélectionné
    pub fn open_selected(&mut self) -> Option<FetchCommand> {
        let id = self.selected_coin()?.id.clone();
        self.open_detail(&id)
    }

    /// Ouvre la vue détail pour un identifiant
    ///
    /// CONCEPT : State transition Listing → Detail
    pub fn open_detail(&mut self, id: &str) -> Option<FetchCommand> {
        self.current_screen = Screen::Detail;
        let command = self.detail.open(id);
        if !self.chart_fits {
            self.detail.unmount_target();
        }
        command
    }

    /// Retour à la liste : la vue détail est démontée
    pub fn back_to_listing(&mut self) {
        self.detail.close();
        self.current_screen = Screen::Listing;
    }

    /// Recharge le détail affiché (nouvelle Phase A)
    pub fn reload_detail(&mut self) -> Option<FetchCommand> {
        self.detail.reload()
    }

    /// Le terminal a changé de taille
    ///
    /// Trop petit : la cible du graphique disparaît. Assez grand à nouveau :
    /// elle est recréée et le graphique redemandé si le détail est chargé.
    pub fn resize(&mut self, height: u16) -> Option<FetchCommand> {
        let fits = height >= MIN_CHART_HEIGHT;
        if fits == self.chart_fits {
            return None;
        }
        self.chart_fits = fits;

        debug!(height, fits, "Terminal resized");
        if fits {
            self.detail.mount_target()
        } else {
            self.detail.unmount_target();
            None
        }
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Applique un résultat du worker
    ///
    /// Retourne la commande suivante éventuelle (Phase B après Phase A).
    pub fn apply(&mut self, result: FetchResult) -> Option<FetchCommand> {
        match result {
            FetchResult::ListingLoaded { generation, result } => {
                self.apply_listing(generation, result);
                None
            }
            FetchResult::DetailLoaded { generation, result } => self.detail.apply_detail(generation, result),
            FetchResult::ChartLoaded { generation, result } => {
                self.detail.apply_chart(generation, result);
                None
            }
        }
    }

    fn apply_listing(
        &mut self,
        generation: Generation,
        result: Result<Vec<CoinSummary>, crate::api::ApiError>,
    ) {
        if generation != self.listing_generation {
            debug!(generation, current = self.listing_generation, "Discarding stale listing response");
            return;
        }

        match result {
            Ok(coins) => {
                info!(count = coins.len(), "Coin listing loaded");
                // Une liste plus courte ne doit pas laisser la sélection hors bornes
                self.selected_index = self.selected_index.min(coins.len().saturating_sub(1));
                self.listing = ListingState::Loaded(coins);
            }
            Err(err) => {
                log_failure("listing", None, &err);
                self.listing = ListingState::Failed(format!("Failed to load coins: {}", err));
            }
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Vérifie si on est sur la liste
    pub fn is_on_listing(&self) -> bool {
        self.current_screen == Screen::Listing
    }

    /// Vérifie si on est sur la vue détail
    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Appelé lors de la première pression de 'q'
    /// - Active l'état confirm_quit pour attendre une seconde pression
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::api::ApiError;
    use crate::detail::DetailPhase;
    use crate::models::{CoinDetail, MarketData, PricePoint};

    fn summary(id: &str, price: f64) -> CoinSummary {
        CoinSummary {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id[..3].to_string(),
            current_price: Some(price),
            image: String::new(),
        }
    }

    fn loaded_app(ids: &[&str]) -> App {
        let mut app = App::new();
        let generation = match app.refresh_listing() {
            FetchCommand::LoadListing { generation } => generation,
            other => panic!("unexpected command: {:?}", other),
        };
        app.apply(FetchResult::ListingLoaded {
            generation,
            result: Ok(ids.iter().map(|id| summary(id, 1.0)).collect()),
        });
        app
    }

    fn detail(id: &str) -> CoinDetail {
        CoinDetail {
            id: id.to_string(),
            name: "Bitcoin".to_string(),
            symbol: "btc".to_string(),
            image: String::new(),
            description: String::new(),
            market: MarketData {
                current_price: 67000.0,
                market_cap: None,
                change_percent_24h: None,
            },
        }
    }

    fn status_error() -> ApiError {
        ApiError::Status {
            url: "http://localhost:3005/coins".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.is_on_listing());
        assert!(app.coins().is_empty());
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_start_with_initial_coin() {
        let mut app = App::new();
        let commands = app.start(Some("bitcoin"));

        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], FetchCommand::LoadListing { .. }));
        assert!(matches!(commands[1], FetchCommand::LoadDetail { ref id, .. } if id == "bitcoin"));
        assert!(app.is_on_detail());
    }

    #[test]
    fn test_navigation() {
        let mut app = loaded_app(&["bitcoin", "ethereum", "solana"]);

        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        // Navigate down au max : reste à 2
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        app.navigate_up();
        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_listing_failure_is_reported() {
        let mut app = App::new();
        app.refresh_listing();
        app.apply(FetchResult::ListingLoaded {
            generation: 1,
            result: Err(status_error()),
        });

        assert!(matches!(app.listing, ListingState::Failed(ref msg) if msg.starts_with("Failed to load coins")));
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        let mut app = App::new();
        app.refresh_listing();
        app.refresh_listing();

        app.apply(FetchResult::ListingLoaded {
            generation: 1,
            result: Ok(vec![summary("bitcoin", 1.0)]),
        });
        assert_eq!(app.listing, ListingState::Loading);

        app.apply(FetchResult::ListingLoaded {
            generation: 2,
            result: Ok(vec![summary("ethereum", 2.0)]),
        });
        assert_eq!(app.coins()[0].id, "ethereum");
    }

    #[test]
    fn test_refresh_clamps_selection() {
        let mut app = loaded_app(&["bitcoin", "ethereum", "solana"]);
        app.navigate_down();
        app.navigate_down();

        app.refresh_listing();
        app.apply(FetchResult::ListingLoaded {
            generation: 2,
            result: Ok(vec![summary("bitcoin", 1.0)]),
        });
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_open_selected_and_back() {
        let mut app = loaded_app(&["bitcoin", "ethereum"]);
        app.navigate_down();

        let command = app.open_selected();
        assert!(matches!(command, Some(FetchCommand::LoadDetail { ref id, .. }) if id == "ethereum"));
        assert!(app.is_on_detail());

        app.back_to_listing();
        assert!(app.is_on_listing());
        assert_eq!(app.detail.phase(), DetailPhase::Idle);
    }

    #[test]
    fn test_open_selected_without_listing() {
        let mut app = App::new();
        assert!(app.open_selected().is_none());
        assert!(app.is_on_listing());
    }

    #[test]
    fn test_detail_then_chart_flow() {
        let mut app = App::new();
        let generation = match app.open_detail("bitcoin") {
            Some(FetchCommand::LoadDetail { generation, .. }) => generation,
            other => panic!("unexpected command: {:?}", other),
        };

        let next = app.apply(FetchResult::DetailLoaded {
            generation,
            result: Ok(detail("bitcoin")),
        });
        let generation = match next {
            Some(FetchCommand::LoadChart { generation, .. }) => generation,
            other => panic!("unexpected command: {:?}", other),
        };

        app.apply(FetchResult::ChartLoaded {
            generation,
            result: Ok(vec![PricePoint::new(DateTime::from_timestamp(0, 0).unwrap(), 1.0)]),
        });
        assert_eq!(app.detail.phase(), DetailPhase::ChartReady);
        assert_eq!(app.detail.surface().live_charts(), 1);

        app.back_to_listing();
        assert_eq!(app.detail.surface().live_charts(), 0);
    }

    #[test]
    fn test_small_terminal_unmounts_chart() {
        let mut app = App::new();
        let generation = match app.open_detail("bitcoin") {
            Some(FetchCommand::LoadDetail { generation, .. }) => generation,
            other => panic!("unexpected command: {:?}", other),
        };
        let next = app.apply(FetchResult::DetailLoaded {
            generation,
            result: Ok(detail("bitcoin")),
        });
        assert!(next.is_some());

        // Le terminal rétrécit pendant le fetch du graphique
        assert!(app.resize(10).is_none());
        assert!(app.detail.target().is_none());

        // Il grandit à nouveau : Phase B est relancée
        let command = app.resize(40);
        assert!(matches!(command, Some(FetchCommand::LoadChart { .. })));
    }
}
