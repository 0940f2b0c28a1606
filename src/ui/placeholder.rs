// ============================================================================
// Placeholders : chargement et erreur
// ============================================================================
// Les trois sections du dashboard partagent le même rendu pour
// LoadState::Loading (squelette) et LoadState::Failed (bannière rouge)
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Caractère de remplissage des blocs squelettes
const SKELETON_FILL: &str = "░";

/// Bloc squelette (LoadState::Loading)
///
/// CONCEPT RATATUI : Block::inner()
/// - Donne la zone intérieure (sans bordures) pour dimensionner le remplissage
pub fn render_skeleton(frame: &mut Frame, area: Rect, title: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", title));

    let inner = block.inner(area);
    let row = SKELETON_FILL.repeat(inner.width.saturating_sub(2) as usize);
    let lines: Vec<Line> = (0..inner.height)
        .map(|_| Line::from(Span::styled(row.clone(), Style::default().fg(Color::DarkGray))))
        .collect();

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Bannière d'erreur (LoadState::Failed)
pub fn render_error_banner(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" ⚠ {} ", title));

    let text = vec![Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_skeleton_fills_block() {
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        terminal
            .draw(|frame| render_skeleton(frame, frame.size(), "Positions"))
            .unwrap();

        let text = buffer_text(terminal.backend());
        assert!(text.contains("Positions"));
        assert!(text.contains("░░░"));
    }

    #[test]
    fn test_error_banner_shows_message() {
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        terminal
            .draw(|frame| render_error_banner(frame, frame.size(), "Positions", "rate limited"))
            .unwrap();

        assert!(buffer_text(terminal.backend()).contains("rate limited"));
    }
}
