// ============================================================================
// Chart - Historique de rendement
// ============================================================================
// Une série par protocole : x = timestamp, y = rewards cumulés
//
// CONCEPTS RUST :
// 1. Iterator chaining : transformer les YieldPoint en points (x, y)
// 2. fold() : calculer min/max en un seul passage
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : une série de données par protocole
// 3. Axis : bornes et labels des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::{series_by_protocol, LoadState, Protocol, YieldPoint};
use crate::ui::placeholder::{render_error_banner, render_skeleton};

const TITLE: &str = "Yield Over Time";

/// Couleur de la série d'un protocole
pub fn protocol_color(protocol: Protocol) -> Color {
    match protocol {
        Protocol::EtherFi => Color::Magenta,
        Protocol::Lido => Color::Cyan,
        Protocol::RocketPool => Color::Yellow,
    }
}

/// Dessine la section rendement selon son état
pub fn render_yield_chart(frame: &mut Frame, state: &LoadState<Vec<YieldPoint>>, area: Rect) {
    match state {
        LoadState::Loading => render_skeleton(frame, area, TITLE),
        LoadState::Failed(message) => render_error_banner(frame, area, TITLE, message),
        LoadState::Ready(points) if points.is_empty() => render_no_history(frame, area),
        LoadState::Ready(points) => render_graph(frame, points, area),
    }
}

/// Bornes [min, max] d'une série de valeurs
///
/// Un intervalle nul est élargi pour que le Chart ait une étendue non vide.
fn bounds(values: impl Iterator<Item = f64>, pad: f64) -> [f64; 2] {
    let (min, max) = values.fold((f64::MAX, f64::MIN), |(min, max), v| (min.min(v), max.max(v)));
    if max > min {
        [min, max]
    } else {
        [min - pad, max + pad]
    }
}

/// Bornes de l'axe Y : marge de 5% de chaque côté
///
/// La borne basse reste à 0 pour une série positive ; une série qui descend
/// sous 0 garde sa marge pour ne pas inverser l'axe.
fn y_axis_bounds(y_min: f64, y_max: f64) -> [f64; 2] {
    let margin = (y_max - y_min) * 0.05;
    let low = y_min - margin;
    if y_min >= 0.0 {
        [low.max(0.0), y_max + margin]
    } else {
        [low, y_max + margin]
    }
}

fn render_graph(frame: &mut Frame, points: &[YieldPoint], area: Rect) {
    let series = series_by_protocol(points);

    let x_bounds = bounds(series.iter().flat_map(|(_, s)| s.iter().map(|&(x, _)| x)), 86_400.0);
    let [y_min, y_max] = bounds(series.iter().flat_map(|(_, s)| s.iter().map(|&(_, y)| y)), 1.0);
    let y_bounds = y_axis_bounds(y_min, y_max);

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(protocol, data)| {
            Dataset::default()
                .name(protocol.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(protocol_color(*protocol)))
                .data(data)
        })
        .collect();

    // Labels de dates depuis les timestamps d'origine
    let first = points.iter().map(|p| p.timestamp).min();
    let last = points.iter().map(|p| p.timestamp).max();
    let date_label = |t: Option<chrono::DateTime<chrono::Utc>>| {
        Span::raw(t.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_default())
    };

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds(x_bounds)
        .labels(vec![date_label(first), date_label(last)]);

    let y_axis = Axis::default()
        .title("ETH")
        .style(Style::default().fg(Color::Gray))
        .bounds(y_bounds)
        .labels(vec![
            Span::raw(format!("{:.3}", y_bounds[0])),
            Span::raw(format!("{:.3}", (y_bounds[0] + y_bounds[1]) / 2.0)),
            Span::raw(format!("{:.3}", y_bounds[1])),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", TITLE)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

fn render_no_history(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", TITLE));

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No yield history yet", Style::default().fg(Color::Gray))),
    ])
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(state: &LoadState<Vec<YieldPoint>>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal
            .draw(|frame| render_yield_chart(frame, state, frame.size()))
            .unwrap();
        buffer_text(terminal.backend())
    }

    #[test]
    fn test_bounds_widen_single_value() {
        assert_eq!(bounds([2.0].into_iter(), 1.0), [1.0, 3.0]);
        assert_eq!(bounds([1.0, 4.0, 2.0].into_iter(), 1.0), [1.0, 4.0]);
    }

    #[test]
    fn test_y_axis_bounds() {
        assert_eq!(y_axis_bounds(0.0, 20.0), [0.0, 21.0]);
        assert_eq!(y_axis_bounds(-10.0, 10.0), [-11.0, 11.0]);

        // Rewards tous négatifs : l'axe reste croissant
        let [low, high] = y_axis_bounds(-20.0, -10.0);
        assert_eq!([low, high], [-20.5, -9.5]);
        assert!(low < high);
    }

    #[test]
    fn test_chart_with_negative_rewards() {
        let points = vec![
            YieldPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                rewards: -0.4,
                protocol: Protocol::EtherFi,
            },
            YieldPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap(),
                rewards: -0.2,
                protocol: Protocol::EtherFi,
            },
        ];

        let text = draw(&LoadState::Ready(points));
        assert!(text.contains("-0.41"));
        assert!(text.contains("2024-05-08"));
    }

    #[test]
    fn test_chart_shows_date_range() {
        let points = vec![
            YieldPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                rewards: 0.1,
                protocol: Protocol::Lido,
            },
            YieldPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap(),
                rewards: 0.3,
                protocol: Protocol::Lido,
            },
        ];

        let text = draw(&LoadState::Ready(points));
        assert!(text.contains("Yield Over Time"));
        assert!(text.contains("2024-05-01"));
        assert!(text.contains("2024-05-08"));
    }

    #[test]
    fn test_empty_history() {
        assert!(draw(&LoadState::Ready(Vec::new())).contains("No yield history yet"));
    }

    #[test]
    fn test_failed_history() {
        assert!(draw(&LoadState::Failed("boom".to_string())).contains("boom"));
    }
}
