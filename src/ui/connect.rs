// ============================================================================
// Connect - Écran de connexion du wallet
// ============================================================================
// Affiché tant qu'aucune adresse n'est connectée (et pour changer de compte)
//
// CONCEPT RATATUI : List widget
// - Une ligne par connector, la sélection en vidéo inverse
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::dashboard::{render_header, render_input_footer, render_quit_footer};

/// Invitation affichée quand aucun wallet n'est connecté
pub const CONNECT_PROMPT: &str = "Connect your wallet to view the dashboard.";

/// Dessine l'écran Connect (ou la saisie d'adresse)
pub fn render_connect(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Invitation
            Constraint::Min(0),    // Connectors
            Constraint::Length(4), // Footer
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);
    render_prompt(frame, app, chunks[1]);
    render_connectors(frame, app, chunks[2]);

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[3]);
    } else if app.is_awaiting_quit_confirmation() {
        render_quit_footer(frame, chunks[3]);
    } else {
        render_connect_footer(frame, app, chunks[3]);
    }
}

fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        CONNECT_PROMPT,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))];

    // Message ponctuel (connector refusé, adresse invalide)
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Red))));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// Liste des connectors
///
/// Pendant une connexion en attente, toutes les lignes affichent
/// "Connecting..." et aucune n'est activable.
fn render_connectors(frame: &mut Frame, app: &App, area: Rect) {
    let pending = app.wallet.is_pending();

    let items: Vec<ListItem> = app
        .wallet
        .connectors()
        .iter()
        .enumerate()
        .map(|(index, connector)| {
            let ready = connector.is_ready() && !pending;
            let (marker, style) = if ready {
                ("●", Style::default().fg(Color::Green))
            } else {
                ("○", Style::default().fg(Color::DarkGray))
            };

            let label = if pending {
                "Connecting...".to_string()
            } else {
                format!("Connect {}", connector.name())
            };

            let mut item = ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(label, style),
            ]));

            if index == app.selected_connector {
                item = item.style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
            }
            item
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Wallet "),
    );

    frame.render_widget(list, area);
}

fn render_connect_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled("[↑↓ / j k]", key),
        Span::raw(" Navigate  "),
        Span::styled("[Enter]", key),
        Span::raw(" Connect  "),
    ];
    if app.wallet.is_connected() {
        spans.push(Span::styled("[ESC]", key));
        spans.push(Span::raw(" Back  "));
    }
    spans.push(Span::styled("[q]", key));
    spans.push(Span::raw(" Quit"));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
