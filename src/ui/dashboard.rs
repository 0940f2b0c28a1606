// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Routage entre les écrans, et rendu de l'écran Dashboard :
//   header → résumé (wallet, rewards, mise à jour) → positions →
//   rendement | comparaison → footer
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones (vertical puis horizontal)
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::{total_rewards, LoadState, StakingPosition};
use crate::ui::chart::render_yield_chart;
use crate::ui::comparison::render_comparison;
use crate::ui::connect::render_connect;
use crate::ui::positions::render_positions;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit l'exhaustivité (tous les écrans gérés)
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Connect | Screen::AddressInput => render_connect(frame, app),
        Screen::Dashboard => render_dashboard(frame, app),
    }
}

fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Résumé
            Constraint::Length(5), // Positions
            Constraint::Min(8),    // Rendement | Comparaison
            Constraint::Length(4), // Footer
        ])
        .split(frame.size());

    let state = app.dashboard.state();

    render_header(frame, app, chunks[0]);
    render_summary(frame, app, chunks[1]);
    render_positions(frame, &state.positions, chunks[2]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);

    render_yield_chart(frame, &state.yields, bottom[0]);
    render_comparison(frame, &state.protocols, &state.positions, bottom[1]);

    if app.is_awaiting_quit_confirmation() {
        render_quit_footer(frame, chunks[4]);
    } else {
        render_dashboard_footer(frame, app, chunks[4]);
    }
}

// ============================================================================
// Header
// ============================================================================

/// Titre de l'application + wallet connecté
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Stakedash ")
        .title_alignment(Alignment::Center);

    let mut spans = vec![Span::styled(
        "Staking overview",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];
    if app.wallet.is_connected() {
        spans.push(Span::raw("  ·  "));
        spans.push(Span::styled(app.wallet.display_name(), Style::default().fg(Color::White)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Résumé : trois cartes
// ============================================================================

/// Total des rewards, formaté ; absent tant que les positions ne sont pas prêtes
pub fn total_rewards_label(positions: &LoadState<Vec<StakingPosition>>) -> String {
    match positions {
        LoadState::Ready(positions) => format!("{:.4} ETH", total_rewards(positions)),
        LoadState::Loading => "...".to_string(),
        LoadState::Failed(_) => "—".to_string(),
    }
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.dashboard.state();

    let last_updated = state
        .last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "—".to_string());

    let cards = [
        ("Connected Wallet", app.wallet.display_name()),
        ("Total Rewards", total_rewards_label(&state.positions)),
        ("Last Updated", last_updated),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for ((title, value), column) in cards.into_iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", title));

        let paragraph = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )))
        .block(block);

        frame.render_widget(paragraph, *column);
    }
}

// ============================================================================
// Footer : raccourcis + statut
// ============================================================================

/// Raccourcis et statut du chargement
///
/// En cas d'échec, la ligne de statut rappelle que [r] relance le cycle.
fn render_dashboard_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = Line::from(vec![
        Span::styled("[r]", key),
        Span::raw(" Refresh  "),
        Span::styled("[c]", key),
        Span::raw(" Switch account  "),
        Span::styled("[d]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Disconnect  "),
        Span::styled("[q]", key),
        Span::raw(" Quit"),
    ]);

    let state = app.dashboard.state();
    let status = if let Some(error) = state.error() {
        Line::from(vec![
            Span::styled(
                format!("⚠ {}  ", error),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("[r]", key),
            Span::styled(" Try again", Style::default().fg(Color::Red)),
        ])
    } else if state.is_loading() {
        Line::from(Span::styled("Loading...", Style::default().fg(Color::Gray)))
    } else {
        Line::from(Span::styled("Up to date", Style::default().fg(Color::Green)))
    };

    let paragraph = Paragraph::new(vec![shortcuts, status])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Confirmation de quit two-step
///
/// CONCEPT : Style avec BLINK pour attirer l'attention
pub fn render_quit_footer(frame: &mut Frame, area: Rect) {
    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled("⚠  Press ", warning),
        Span::styled(
            "[q]",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(" again to quit, any other key to cancel ⚠", warning),
    ]);

    let paragraph = Paragraph::new(vec![line])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie : prompt + buffer + curseur
///
/// CONCEPT : Modal input (Vim-like)
/// - ESC annule, Enter valide
pub fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green)); // Vert pour indiquer mode input

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Confirm  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
