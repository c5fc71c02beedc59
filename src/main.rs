// ============================================================================
// CoinView - Liste des cryptos et vue détail
// ============================================================================
// Programme TUI : liste des coins, puis détail + graphique du coin choisi
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui traite résultats, rendu et événements
// 3. Worker thread : les appels HTTP ne bloquent jamais l'UI
// 4. Channels : l'état (App) n'appartient qu'au thread UI
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use coinview::api::{CoinApi, CoinSource};
use coinview::app::App;
use coinview::config::{Args, Config};
use coinview::ui::events::{
    is_backspace_event, is_down_event, is_enter_event, is_escape_event, is_quit_event, is_reload_event, is_up_event,
};
use coinview::ui::{render, Event, EventHandler};
use coinview::worker::{spawn_worker, FetchCommand, FetchResult};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/coinview/logs/coinview.log.*
/// RUST_LOG=coinview=trace coinview
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "coinview.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // UI et worker dans le même fichier
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour coinview, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinview=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // .env optionnel : son absence n'est pas une erreur
    dotenv::dotenv().ok();

    // Configuration validée AVANT le raw mode : une erreur reste lisible
    let config = Config::from_args(Args::parse())?;

    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(endpoints = ?config.endpoints, timeout = ?config.timeout, "CoinView starting up");

    let source: Arc<dyn CoinSource> = Arc::new(CoinApi::new(config.endpoints.clone(), config.timeout)?);

    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : UI → worker
    // - result_tx/rx : worker → UI
    let (command_tx, command_rx) = mpsc::channel::<FetchCommand>();
    let (result_tx, result_rx) = mpsc::channel::<FetchResult>();

    info!("Spawning background worker thread");
    let worker = spawn_worker(source, command_rx, result_tx)?;

    let mut app = App::new();
    for command in app.start(config.initial_coin.as_deref()) {
        send(&command_tx, command);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // La taille initiale compte aussi (la cible du graphique en dépend)
    if let Ok(size) = terminal.size() {
        if let Some(command) = app.resize(size.height) {
            send(&command_tx, command);
        }
    }

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Fermer le channel arrête le worker
    drop(command_tx);
    if worker.join().is_err() {
        warn!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Envoie une commande au worker
fn send(command_tx: &mpsc::Sender<FetchCommand>, command: FetchCommand) {
    if command_tx.send(command).is_err() {
        error!("Worker thread disconnected, command dropped");
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats du worker (dans l'ordre d'arrivée)
//   1. Dessiner l'interface
//   2. Traiter un événement (ou un Tick après 250ms)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<FetchCommand>,
    result_rx: &mpsc::Receiver<FetchResult>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. RÉSULTATS : vide la file sans bloquer
        // ========================================
        loop {
            match result_rx.try_recv() {
                Ok(result) => {
                    if let Some(command) = app.apply(result) {
                        send(command_tx, command);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT
        // ========================================
        match events.next() {
            Ok(event) => {
                if let Some(command) = handle_event(app, event) {
                    send(command_tx, command);
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read terminal event");
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et retourne la commande éventuelle pour le worker
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Navigation contextuelle selon l'écran actuel
fn handle_event(app: &mut App, event: Event) -> Option<FetchCommand> {
    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step confirmation pour éviter les quits accidentels
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
            None
        }

        // ========================================
        // Listing
        // ========================================
        Event::Key(_) if is_up_event(&event) && app.is_on_listing() => {
            app.cancel_quit();
            app.navigate_up();
            None
        }

        Event::Key(_) if is_down_event(&event) && app.is_on_listing() => {
            app.cancel_quit();
            app.navigate_down();
            None
        }

        Event::Key(_) if is_enter_event(&event) && app.is_on_listing() => {
            app.cancel_quit();
            if let Some(coin) = app.selected_coin() {
                info!(coin = %coin.id, "User opened coin detail");
            }
            app.open_selected()
        }

        Event::Key(_) if is_reload_event(&event) && app.is_on_listing() => {
            app.cancel_quit();
            info!("User refreshed the listing");
            Some(app.refresh_listing())
        }

        // ========================================
        // Détail
        // ========================================
        Event::Key(_) if (is_escape_event(&event) || is_backspace_event(&event)) && app.is_on_detail() => {
            app.cancel_quit();
            debug!("User returned to listing");
            app.back_to_listing();
            None
        }

        Event::Key(_) if is_reload_event(&event) && app.is_on_detail() => {
            app.cancel_quit();
            info!("User reloaded coin detail");
            app.reload_detail()
        }

        Event::Resize(_, height) => app.resize(height),

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
            None
        }

        Event::Tick => None,
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Échec de l'entrée dans l'écran alternatif")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Échec de la création du terminal")?;

    Ok(terminal)
}

/// Restaure le terminal dans son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Échec de la désactivation du raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)
        .context("Échec de la sortie de l'écran alternatif")?;
    terminal.show_cursor().context("Échec de l'affichage du curseur")?;

    Ok(())
}
