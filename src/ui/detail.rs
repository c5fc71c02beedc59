// ============================================================================
// Detail - Rendu de la vue détail d'un coin
// ============================================================================
// Projection pure de DetailController : aucune transition ici
//
// CONCEPTS RUST :
// 1. Option handling : chaque partie peut être absente
// 2. Iterator chaining : labels String → Span
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne (marker Braille)
// 2. Dataset : la série "Price (USD)" lissée
// 3. Axis : bornes et labels calculés à la construction du graphique
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::chart::TerminalChart;
use crate::models::CoinDetail;
use crate::ui::{create_layout, key_hint, render_footer};

/// Dessine l'écran Détail
pub fn render_detail(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    // Loading / "Coin not found" : pas de données partielles
    match (app.detail.status_message(), app.detail.detail()) {
        (None, Some(detail)) => {
            render_header(frame, detail, chunks[0]);
            render_body(frame, app, detail, chunks[1]);
        }
        (message, _) => {
            let title = app.detail.coin_id().unwrap_or("");
            render_header_placeholder(frame, title, chunks[0]);
            render_message(frame, chunks[1], message.unwrap_or(""), Color::Gray);
        }
    }

    render_footer(frame, app, chunks[2], detail_shortcuts());
}

// ============================================================================
// Header : titre, prix, market cap, variation
// ============================================================================

fn render_header(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", detail.title()));

    let color = if detail.is_positive() { Color::Green } else { Color::Red };

    let text = vec![Line::from(vec![
        Span::raw("Price: "),
        Span::styled(detail.price_label(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   Market Cap: "),
        Span::raw(detail.market_cap_label()),
        Span::raw("   24h: "),
        Span::styled(detail.change_label(), Style::default().fg(color)),
    ])];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_header_placeholder(frame: &mut Frame, title: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title));
    frame.render_widget(block, area);
}

// ============================================================================
// Corps : description + graphique
// ============================================================================

fn render_body(frame: &mut Frame, app: &App, detail: &CoinDetail, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Description
            Constraint::Min(0),    // Graphique
        ])
        .split(area);

    render_about(frame, detail, chunks[0]);

    match app.detail.chart() {
        Some(chart) if chart.is_empty() => render_message(frame, chunks[1], "No price data", Color::Gray),
        Some(chart) => render_chart(frame, chart, detail, chunks[1]),
        None => {
            let message = app.detail.chart_message().or_else(|| {
                // Pas de cible : le terminal est trop petit
                app.detail.target().is_none().then_some("Terminal too small for the chart")
            });
            if let Some(message) = message {
                render_message(frame, chunks[1], message, Color::Gray);
            }
        }
    }
}

fn render_about(frame: &mut Frame, detail: &CoinDetail, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" About ");

    let mut text = Vec::new();
    if let Some(summary) = detail.summary() {
        text.push(Line::from(summary));
    }
    // Le terminal n'affiche pas d'images : la référence est montrée telle quelle
    if !detail.image.is_empty() {
        text.push(Line::from(Span::styled(
            format!("Image: {}", detail.image),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Dessine le graphique retenu
fn render_chart(frame: &mut Frame, chart: &TerminalChart, detail: &CoinDetail, area: Rect) {
    let color = if detail.is_positive() { Color::Green } else { Color::Red };

    // CONCEPT RATATUI : Marker Braille
    // - 2x4 points par cellule : la courbe lissée reste fine
    let datasets = vec![Dataset::default()
        .name(chart.label.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&chart.line)];

    let x_axis = Axis::default()
        .title(chart.x_title.as_str())
        .style(Style::default().fg(Color::Gray))
        .bounds(chart.x_bounds)
        .labels(spans(&chart.x_labels));

    let y_axis = Axis::default()
        .title(chart.y_title.as_str())
        .style(Style::default().fg(Color::Gray))
        .bounds(chart.y_bounds)
        .labels(spans(&chart.y_labels));

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Price History "),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(widget, area);
}

fn spans(labels: &[String]) -> Vec<Span<'_>> {
    labels.iter().map(|label| Span::raw(label.as_str())).collect()
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ];
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn detail_shortcuts() -> Line<'static> {
    Line::from(vec![
        key_hint("[q]", Color::Yellow),
        Span::raw(" Quit  "),
        key_hint("[Esc]", Color::Yellow),
        Span::raw(" Back  "),
        key_hint("[r]", Color::Green),
        Span::raw(" Reload"),
    ])
}
