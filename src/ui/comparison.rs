// ============================================================================
// Comparison - Tableau des protocoles
// ============================================================================
// Jointure ProtocolStats × StakingPosition par protocole : une ligne par
// ProtocolStats, la colonne "Your Stake" vient de la position si elle existe
// ============================================================================

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::models::{position_for, LoadState, ProtocolStats, StakingPosition};
use crate::ui::placeholder::{render_error_banner, render_skeleton};

const TITLE: &str = "Protocol Comparison";

/// Marqueur affiché quand le wallet n'a pas de position sur le protocole
pub const NO_POSITION: &str = "—";

/// Une ligne du tableau, déjà formatée
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub protocol: String,
    pub apy: String,
    pub tvl: String,
    pub stake: String,
}

/// Construit les lignes du tableau
///
/// CONCEPT RUST : Option::map_or_else
/// - Position trouvée → montant formaté
/// - Pas de position → marqueur explicite
pub fn comparison_rows(stats: &[ProtocolStats], positions: &[StakingPosition]) -> Vec<ComparisonRow> {
    stats
        .iter()
        .map(|stat| ComparisonRow {
            protocol: stat.protocol.label().to_string(),
            apy: format!("{:.2}%", stat.current_apy),
            tvl: format!("{} ETH", group_thousands(stat.tvl)),
            stake: position_for(positions, stat.protocol).map_or_else(
                || NO_POSITION.to_string(),
                |position| format!("{:.2} ETH", position.staked_amount),
            ),
        })
        .collect()
}

/// Séparateurs de milliers, au plus 3 décimales (zéros de fin retirés)
///
/// 1234567.5 → "1,234,567.5"
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.3}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Dessine le tableau de comparaison
///
/// L'état du tableau est celui des ProtocolStats ; les positions ne servent
/// qu'à la colonne "Your Stake" (vide tant qu'elles ne sont pas prêtes).
pub fn render_comparison(
    frame: &mut Frame,
    stats: &LoadState<Vec<ProtocolStats>>,
    positions: &LoadState<Vec<StakingPosition>>,
    area: Rect,
) {
    let stats = match stats {
        LoadState::Loading => return render_skeleton(frame, area, TITLE),
        LoadState::Failed(message) => return render_error_banner(frame, area, TITLE, message),
        LoadState::Ready(stats) => stats,
    };

    let positions = positions.data().map(Vec::as_slice).unwrap_or_default();

    let header = Row::new(vec!["Protocol", "APY", "TVL", "Your Stake"]).style(
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = comparison_rows(stats, positions)
        .into_iter()
        .map(|row| {
            let stake_style = if row.stake == NO_POSITION {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            };
            Row::new(vec![
                Cell::from(row.protocol),
                Cell::from(row.apy),
                Cell::from(row.tvl),
                Cell::from(row.stake).style(stake_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(25),
        Constraint::Percentage(15),
        Constraint::Percentage(35),
        Constraint::Percentage(25),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", TITLE)),
    );

    frame.render_widget(table, area);
}
