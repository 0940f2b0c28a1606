// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier (crossterm) et le traduit en actions du dashboard
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter les événements et les actions
// 2. Pattern matching : une seule fonction de traduction touche → action
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Délai d'attente d'un événement clavier avant de produire un Tick
///
/// Court pour que les résultats réseau soient affichés rapidement
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas d'entrée clavier pendant POLL_TIMEOUT
    Tick,

    /// Terminal redimensionné (redessin au prochain tour)
    Resize,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    timeout: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        Self { timeout: POLL_TIMEOUT }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - Si pas d'événement avant le timeout, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.timeout)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on garde Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            CrosstermEvent::Resize(_, _) => Ok(Event::Resize),
            _ => Ok(Event::Tick),
        }
    }
}

// ============================================================================
// Actions
// ============================================================================
// CONCEPT RUST : Séparer "quelle touche" de "que faire"
// - key_action() ne connaît que le clavier
// - main.rs décide selon l'écran courant
// ============================================================================

/// Action déclenchée par une touche (hors mode saisie)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Select,
    Back,
    Retry,
    Disconnect,
    SwitchAccount,
}

/// Traduit un événement en action de navigation
pub fn key_action(event: &Event) -> Option<Action> {
    let Event::Key(key) = event else {
        return None;
    };

    if is_force_quit_event(event) {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Some(Action::Down),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Retry),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Disconnect),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::SwitchAccount),
        _ => None,
    }
}

/// Ctrl+C : quitte toujours, y compris en mode saisie
pub fn is_force_quit_event(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(key) if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    )
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Esc)
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Enter)
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Backspace)
}

/// Caractère accepté dans une adresse (0x + hexadécimal)
///
/// La validation complète se fait à la soumission, ici on filtre juste
/// ce qui ne peut pas apparaître dans une adresse.
pub fn address_char(event: &Event) -> Option<char> {
    match event {
        Event::Key(key) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
        Event::Key(key) => match key.code {
            KeyCode::Char(c) if c.is_ascii_hexdigit() || c == 'x' || c == 'X' => Some(c),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(key_action(&key(KeyCode::Char('q'))), Some(Action::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(key_action(&ctrl_c), Some(Action::Quit));
        assert_eq!(key_action(&Event::Tick), None);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_action(&key(KeyCode::Up)), Some(Action::Up));
        assert_eq!(key_action(&key(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(key_action(&key(KeyCode::Enter)), Some(Action::Select));
        assert_eq!(key_action(&key(KeyCode::Esc)), Some(Action::Back));
    }

    #[test]
    fn test_dashboard_keys() {
        assert_eq!(key_action(&key(KeyCode::Char('r'))), Some(Action::Retry));
        assert_eq!(key_action(&key(KeyCode::Char('d'))), Some(Action::Disconnect));
        assert_eq!(key_action(&key(KeyCode::Char('c'))), Some(Action::SwitchAccount));
        assert_eq!(key_action(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_address_char_filter() {
        assert_eq!(address_char(&key(KeyCode::Char('0'))), Some('0'));
        assert_eq!(address_char(&key(KeyCode::Char('x'))), Some('x'));
        assert_eq!(address_char(&key(KeyCode::Char('F'))), Some('F'));
        assert_eq!(address_char(&key(KeyCode::Char('g'))), None);
        assert_eq!(address_char(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_ctrl_c_is_force_quit() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(is_force_quit_event(&ctrl_c));
        assert!(!is_force_quit_event(&key(KeyCode::Char('c'))));
        assert!(!is_force_quit_event(&key(KeyCode::Char('q'))));

        // Ctrl+C n'alimente pas le buffer d'adresse ('c' est hexadécimal)
        assert_eq!(address_char(&ctrl_c), None);
    }

    #[test]
    fn test_special_keys() {
        assert!(is_enter_event(&key(KeyCode::Enter)));
        assert!(is_escape_event(&key(KeyCode::Esc)));
        assert!(is_backspace_event(&key(KeyCode::Backspace)));
        assert!(!is_backspace_event(&Event::Resize));
    }
}
