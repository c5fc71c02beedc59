// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
//
// CONCEPT RUST : Routing avec match sur enum
// - render() choisit l'écran selon app.current_screen
// - Le compilateur garantit l'exhaustivité (tous les écrans gérés)
// ============================================================================

pub mod detail;  // Rendu de la vue détail + graphique
pub mod events;  // Gestion des événements clavier
pub mod listing; // Rendu de la liste des coins

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Listing => listing::render_listing(frame, app),
        Screen::Detail => detail::render_detail(frame, app),
    }
}

/// Layout commun : header (3), contenu, footer (3)
pub(crate) fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Raccourci clavier en gras
pub(crate) fn key_hint(key: &'static str, color: Color) -> Span<'static> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Footer : raccourcis, ou avertissement de confirmation de quit
pub(crate) fn render_footer(frame: &mut Frame, app: &App, area: Rect, shortcuts: Line<'static>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled("⚠  Press ", warning),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel ⚠", warning),
        ])
    } else {
        shortcuts
    };

    let paragraph = Paragraph::new(vec![line]).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
