// ============================================================================
// Positions - Une carte par protocole
// ============================================================================
// Fonction pure de LoadState<Vec<StakingPosition>> vers l'écran
//
// CONCEPTS RATATUI :
// 1. Layout horizontal avec Constraint::Ratio pour une grille de cartes
// 2. Paragraph multi-lignes dans chaque carte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{LoadState, StakingPosition};
use crate::ui::placeholder::{render_error_banner, render_skeleton};

const TITLE: &str = "Positions";

/// Dessine la section positions selon son état
pub fn render_positions(frame: &mut Frame, state: &LoadState<Vec<StakingPosition>>, area: Rect) {
    match state {
        LoadState::Loading => render_skeleton(frame, area, TITLE),
        LoadState::Failed(message) => render_error_banner(frame, area, TITLE, message),
        LoadState::Ready(positions) if positions.is_empty() => render_empty(frame, area),
        LoadState::Ready(positions) => render_cards(frame, positions, area),
    }
}

/// Grille de cartes, dans l'ordre renvoyé par le backend
///
/// CONCEPT RUST : Iterator zip
/// - zip() associe chaque position à sa zone
fn render_cards(frame: &mut Frame, positions: &[StakingPosition], area: Rect) {
    let count = positions.len() as u32;
    let constraints: Vec<Constraint> = positions.iter().map(|_| Constraint::Ratio(1, count)).collect();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (position, column) in positions.iter().zip(columns.iter()) {
        render_card(frame, position, *column);
    }
}

fn render_card(frame: &mut Frame, position: &StakingPosition, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", position.protocol.label()));

    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);

    let text = vec![
        Line::from(Span::styled(
            format!("{:.2} ETH", position.staked_amount),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Rewards: ", label),
            Span::styled(format!("{:.4} ETH", position.rewards), value),
        ]),
        Line::from(vec![
            Span::styled("Current Value: ", label),
            Span::styled(format!("{:.4} ETH", position.current_value), value),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", TITLE));

    let paragraph = Paragraph::new(Line::from(Span::styled(
        "No staking positions for this wallet",
        Style::default().fg(Color::Gray),
    )))
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
