// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Injection de dépendances : la session wallet et l'orchestrateur sont
//    construits dans main puis passés à App (pas d'état global)
// 3. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::orchestrator::Orchestrator;
use crate::wallet::{ConnectStep, WalletSession};

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Invitation à connecter un wallet + liste des connectors
    Connect,

    /// Saisie d'une adresse (connector watch-only)
    /// CONCEPT : Modal input mode (Vim-like)
    /// - Enter valide, ESC annule
    AddressInput,

    /// Vue principale : positions, rendement, comparaison
    Dashboard,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' → true, deuxième → quit
    pub confirm_quit: bool,

    /// Contexte "connexion" : adresse et connectors
    pub wallet: WalletSession,

    /// Contexte "données" : les trois LoadState et le cycle en cours
    pub dashboard: Orchestrator,

    /// Index du connector sélectionné sur l'écran Connect
    pub selected_connector: usize,

    /// Buffer de saisie pour le mode AddressInput
    pub input_buffer: String,

    /// Prompt affiché en mode AddressInput
    pub input_prompt: String,

    /// Message ponctuel pour l'utilisateur (connexion refusée, etc.)
    pub notice: Option<String>,

    /// Rafraîchissement automatique (None = désactivé)
    refresh_interval: Option<Duration>,

    /// Début du dernier cycle lancé par l'application
    last_refresh: Instant,
}

impl App {
    /// Crée l'application à partir de ses deux contextes
    pub fn new(wallet: WalletSession, dashboard: Orchestrator, refresh_interval: Option<Duration>) -> Self {
        let mut app = Self {
            running: true,
            current_screen: Screen::Connect,
            confirm_quit: false,
            wallet,
            dashboard,
            selected_connector: 0,
            input_buffer: String::new(),
            input_prompt: String::new(),
            notice: None,
            refresh_interval,
            last_refresh: Instant::now(),
        };
        app.sync_address();
        app
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// CONCEPT : Event Loop Pattern
    /// - Applique les résultats réseau arrivés depuis le dernier tick
    /// - Déclenche le rafraîchissement périodique si configuré
    pub fn tick(&mut self) {
        self.dashboard.poll();

        let Some(interval) = self.refresh_interval else {
            return;
        };

        if self.wallet.is_connected()
            && !self.dashboard.is_in_flight()
            && self.last_refresh.elapsed() >= interval
        {
            debug!(interval_secs = interval.as_secs(), "Periodic refresh");
            self.retry();
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_connect(&self) -> bool {
        self.current_screen == Screen::Connect
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::AddressInput
    }

    /// Ouvre l'écran Connect (changer de compte depuis le dashboard)
    pub fn show_connect(&mut self) {
        self.notice = None;
        self.current_screen = Screen::Connect;
    }

    /// Retourne au dashboard si un wallet est connecté
    pub fn show_dashboard(&mut self) {
        if self.wallet.is_connected() {
            self.current_screen = Screen::Dashboard;
        }
    }

    /// Connector précédent
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_connector = self.selected_connector.saturating_sub(1);
    }

    /// Connector suivant
    pub fn navigate_down(&mut self) {
        let max_index = self.wallet.connectors().len().saturating_sub(1);
        self.selected_connector = (self.selected_connector + 1).min(max_index);
    }

    // ========================================================================
    // Connexion wallet
    // ========================================================================

    /// Active le connector sélectionné
    pub fn connect_selected(&mut self) {
        match self.wallet.begin_connect(self.selected_connector) {
            Ok(ConnectStep::NeedsInput) => {
                self.notice = None;
                self.start_input("Wallet address: ".to_string());
            }
            Ok(ConnectStep::Connected(_)) => self.sync_address(),
            Err(e) => {
                info!(error = %e, "Connector refused");
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Déconnecte le wallet : retour à l'écran Connect, dashboard inactif
    pub fn disconnect(&mut self) {
        self.wallet.disconnect();
        self.sync_address();
    }

    /// Relance le chargement du dashboard (touche 'r', refresh périodique)
    pub fn retry(&mut self) {
        self.last_refresh = Instant::now();
        self.dashboard.refresh();
    }

    /// Propage l'adresse de la session vers l'orchestrateur
    ///
    /// L'orchestrateur ignore une adresse inchangée : appeler cette méthode
    /// plusieurs fois ne relance pas de cycle.
    fn sync_address(&mut self) {
        let address = self.wallet.address().map(str::to_string);
        if address.as_deref() != self.dashboard.address() {
            self.last_refresh = Instant::now();
        }
        self.dashboard.set_address(address);

        self.current_screen = if self.wallet.is_connected() {
            Screen::Dashboard
        } else {
            Screen::Connect
        };
    }

    // ========================================================================
    // Quit Confirmation Management
    // ========================================================================

    /// Première pression de 'q'
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// N'importe quelle autre touche annule
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode saisie avec un prompt donné
    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::AddressInput;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    /// Annule la saisie (et la connexion en attente)
    pub fn cancel_input(&mut self) {
        self.wallet.cancel_connect();
        self.input_buffer.clear();
        self.input_prompt.clear();
        self.current_screen = Screen::Connect;
    }

    /// Valide l'adresse saisie
    ///
    /// Adresse invalide : on reste en saisie avec le buffer intact et un
    /// message d'erreur.
    pub fn submit_input(&mut self) {
        let value = self.input_buffer.trim().to_string();
        match self.wallet.complete_connect(&value) {
            Ok(_) => {
                self.notice = None;
                self.input_buffer.clear();
                self.input_prompt.clear();
                self.sync_address();
            }
            Err(e) => {
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Ajoute un caractère au buffer d'input
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    /// Supprime le dernier caractère du buffer
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
