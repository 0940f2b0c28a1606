// ============================================================================
// Stakedash - Point d'entrée
// ============================================================================
// Dashboard TUI de liquid staking : connecte une adresse de wallet et affiche
// positions, historique de rendement et comparaison des protocoles
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour les appels réseau,
//    la boucle UI reste synchrone et lit les résultats à chaque tick
// 4. Injection de dépendances : WalletSession et Orchestrator sont créés
//    ici puis passés à App
// ============================================================================

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use stakedash::api::{ApiClient, StakingApi, HEALTH_TIMEOUT};
use stakedash::app::{App, Screen};
use stakedash::config::Config;
use stakedash::orchestrator::Orchestrator;
use stakedash::ui::events::{
    address_char, is_backspace_event, is_enter_event, is_escape_event, is_force_quit_event, key_action, Action,
    Event, EventHandler,
};
use stakedash::ui::render;
use stakedash::wallet::WalletSession;

// ============================================================================
// Ligne de commande
// ============================================================================
// CONCEPT RUST : clap derive
// - La structure décrit les arguments, clap génère le parsing et --help
// - Chaque argument présent écrase la valeur de la configuration
// ============================================================================

/// Terminal dashboard for liquid-staking positions
#[derive(Parser, Debug)]
#[command(name = "stakedash", version, about)]
struct Cli {
    /// Configuration file (default: ~/.config/stakedash/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the staking backend
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Wallet address offered by the "Configured address" connector
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Auto-refresh interval in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    refresh: Option<u64>,
}

impl Cli {
    /// Applique les arguments sur la configuration chargée
    fn apply(&self, config: &mut Config) {
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(address) = &self.address {
            config.address = Some(address.clone());
        }
        if let Some(refresh) = self.refresh {
            config.refresh_interval_secs = refresh;
        }
    }
}

// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/stakedash/logs
/// - macOS : ~/Library/Application Support/stakedash/logs
/// - Sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("stakedash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/stakedash/logs/stakedash.log.*
/// RUST_LOG=stakedash=trace stakedash
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stakedash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Les appels réseau tournent sur les workers tokio
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stakedash=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(version = env!("CARGO_PKG_VERSION"), "Stakedash starting up");

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    debug!(?config, "Effective configuration");

    // CONCEPT RUST : Runtime multi-thread créé une seule fois
    // - Les cycles de chargement y sont lancés via un Handle
    // - Le runtime vit jusqu'à la fin de main
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let client = ApiClient::new(&config.api_base)?;

    // Vérification non bloquante : un backend absent n'empêche pas le démarrage,
    // les vues afficheront l'erreur et proposeront [r]
    match runtime.block_on(client.health_within(HEALTH_TIMEOUT)) {
        Ok(()) => info!(api_base = %client.base_url(), "Backend reachable"),
        Err(e) => warn!(api_base = %client.base_url(), error = %e, "Backend health check failed"),
    }

    let api: Arc<dyn StakingApi> = Arc::new(client);

    install_panic_hook();

    // CONCEPT : Frontière d'erreur de dernier recours
    // - Une erreur (ou un panic) de la boucle restaure le terminal puis
    //   propose de relancer
    // - Relancer reconstruit tout l'état de l'application
    loop {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            run_session(&config, api.clone(), runtime.handle().clone())
        }))
        .unwrap_or_else(|payload| Err(anyhow::anyhow!("Unexpected crash: {}", panic_message(payload.as_ref()))));

        match outcome {
            Ok(()) => {
                info!("Application exited normally");
                return Ok(());
            }
            Err(e) => {
                error!(error = ?e, "Application exited with error");
                if !offer_retry(&e)? {
                    return Err(e);
                }
                info!("Restarting application after error");
            }
        }
    }
}

/// Construit l'état de l'application et exécute l'event loop
///
/// Le terminal est restauré même si la boucle échoue.
fn run_session(config: &Config, api: Arc<dyn StakingApi>, runtime: Handle) -> Result<()> {
    let wallet = WalletSession::with_defaults(config.address.clone(), &config.aliases);
    let dashboard = Orchestrator::new(api, runtime);
    let mut app = App::new(wallet, dashboard, config.refresh_interval());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    result
}

// ============================================================================
// CONCEPT RUST : Panic hook
// - Un panic pendant le rendu saute restore_terminal : le hook remet le
//   terminal en mode normal avant d'afficher le message
// - Seul le thread UI touche au terminal ; les panics des workers tokio
//   sont déjà récupérés par l'orchestrateur via JoinError
// ============================================================================

fn install_panic_hook() {
    let ui_thread = std::thread::current().id();
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        if std::thread::current().id() != ui_thread {
            error!(panic = %info, "Panic in background thread");
            return;
        }
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        error!(panic = %info, "Panic in UI thread");
        previous(info);
    }));
}

/// Texte d'un payload de panic (&str ou String, sinon générique)
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Affiche l'erreur et demande s'il faut relancer
fn offer_retry(error: &anyhow::Error) -> Result<bool> {
    eprintln!("Something went wrong: {:#}", error);
    eprint!("Try again? [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Échec de la lecture de la réponse")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

// ============================================================================
// Event Loop
// ============================================================================
// CONCEPT : Game loop pattern
// 1. Update : appliquer les résultats réseau (app.tick)
// 2. Render : dessiner l'état courant
// 3. Input : attendre un événement (timeout court, voir EventHandler)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        app.tick();

        terminal
            .draw(|frame| render(frame, app))
            .context("Échec du rendu")?;

        let event = events.next()?;
        handle_event(app, &event);
    }
    Ok(())
}

/// Traite un événement clavier selon l'écran courant
///
/// CONCEPT : Modal input
/// - En mode saisie, les touches alimentent le buffer
/// - Sinon, elles sont traduites en Action
fn handle_event(app: &mut App, event: &Event) {
    if !matches!(event, Event::Key(_)) {
        return;
    }

    // Ctrl+C quitte sans confirmation, quel que soit le mode
    if is_force_quit_event(event) {
        app.quit();
        return;
    }

    if app.is_in_input_mode() {
        if is_enter_event(event) {
            app.submit_input();
        } else if is_escape_event(event) {
            app.cancel_input();
        } else if is_backspace_event(event) {
            app.backspace();
        } else if let Some(c) = address_char(event) {
            app.append_char(c);
        }
        return;
    }

    let action = key_action(event);

    // Two-step quit : 'q' confirme, toute autre touche annule
    if app.is_awaiting_quit_confirmation() {
        if action == Some(Action::Quit) {
            app.quit();
        } else {
            app.cancel_quit();
        }
        return;
    }

    let Some(action) = action else {
        return;
    };

    match (app.current_screen.clone(), action) {
        (_, Action::Quit) => app.request_quit(),

        (Screen::Connect, Action::Up) => app.navigate_up(),
        (Screen::Connect, Action::Down) => app.navigate_down(),
        (Screen::Connect, Action::Select) => app.connect_selected(),
        (Screen::Connect, Action::Back) => app.show_dashboard(),

        (Screen::Dashboard, Action::Retry) => app.retry(),
        (Screen::Dashboard, Action::Disconnect) => app.disconnect(),
        (Screen::Dashboard, Action::SwitchAccount) => app.show_connect(),

        _ => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    Terminal::new(CrosstermBackend::new(stdout)).context("Échec de la création du terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use stakedash::error::ApiError;
    use stakedash::models::{ProtocolStats, StakingPosition, YieldPoint};
    use std::collections::HashMap;

    struct EmptyApi;

    #[async_trait]
    impl StakingApi for EmptyApi {
        async fn fetch_staking_positions(&self, _address: &str) -> Result<Vec<StakingPosition>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_yield_history(&self, _address: &str) -> Result<Vec<YieldPoint>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_protocol_stats(&self) -> Result<Vec<ProtocolStats>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn app() -> App {
        let wallet = WalletSession::with_defaults(None, &HashMap::new());
        let dashboard = Orchestrator::new(Arc::new(EmptyApi), Handle::current());
        App::new(wallet, dashboard, None)
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_address_input() {
        let mut app = app();
        app.start_input("Wallet address: ".to_string());
        handle_event(&mut app, &press(KeyCode::Char('0'), KeyModifiers::empty()));
        assert!(app.is_in_input_mode());

        handle_event(&mut app, &press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
        assert_eq!(app.input_buffer, "0");
    }

    #[tokio::test]
    async fn test_q_still_asks_for_confirmation() {
        let mut app = app();
        handle_event(&mut app, &press(KeyCode::Char('q'), KeyModifiers::empty()));
        assert!(app.is_running());
        assert!(app.is_awaiting_quit_confirmation());

        handle_event(&mut app, &press(KeyCode::Char('q'), KeyModifiers::empty()));
        assert!(!app.is_running());
    }

    #[test]
    fn test_panic_message_from_payload() {
        let payload = panic::catch_unwind(|| panic!("render blew up")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "render blew up");

        let index = 7;
        let payload = panic::catch_unwind(|| panic!("index {} out of range", index)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "index 7 out of range");

        let payload = panic::catch_unwind(|| panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
