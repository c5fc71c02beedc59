// ============================================================================
// Listing - Rendu de la liste des coins
// ============================================================================
// CONCEPTS RATATUI :
// 1. Layout : header / contenu / footer
// 2. List widget : une ligne par coin, la sélection en vidéo inverse
// 3. Paragraph : messages de chargement et d'erreur
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, ListingState};
use crate::ui::{create_layout, key_hint, render_footer};

/// Dessine l'écran Listing
pub fn render_listing(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_coins(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2], listing_shortcuts());
}

/// Dessine le header avec le titre
fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" CoinView ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(Span::styled(
        "Cryptocurrency Prices by Market Cap",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Dessine la liste des coins (ou le message d'état)
fn render_coins(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Coins ");

    let coins = match &app.listing {
        ListingState::Loading => {
            render_message(frame, block, area, "Loading coins...", Color::Gray);
            return;
        }
        ListingState::Failed(message) => {
            render_message(frame, block, area, message, Color::Red);
            return;
        }
        ListingState::Loaded(coins) if coins.is_empty() => {
            render_message(frame, block, area, "No coins available", Color::Gray);
            return;
        }
        ListingState::Loaded(coins) => coins,
    };

    // CONCEPT RUST : Iterator chaining
    // - .enumerate() : ajoute l'index pour repérer la sélection
    let items: Vec<ListItem> = coins
        .iter()
        .enumerate()
        .map(|(index, coin)| {
            let style = Style::default().fg(Color::White);
            let item = ListItem::new(format!(" {}", coin.display()));
            if index == app.selected_index {
                item.style(style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED))
            } else {
                item.style(style)
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_message(frame: &mut Frame, block: Block, area: Rect, message: &str, color: Color) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ];
    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn listing_shortcuts() -> Line<'static> {
    Line::from(vec![
        key_hint("[q]", Color::Yellow),
        Span::raw(" Quit  "),
        key_hint("[↑↓ / j k]", Color::Yellow),
        Span::raw(" Navigate  "),
        key_hint("[Enter]", Color::Yellow),
        Span::raw(" Details  "),
        key_hint("[r]", Color::Green),
        Span::raw(" Refresh"),
    ])
}
