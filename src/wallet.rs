// ============================================================================
// Session wallet
// ============================================================================
// Objet de contexte "connexion" : adresse connectée, statut, liste des
// connectors disponibles, connexion / déconnexion, nom lisible de l'adresse
//
// CONCEPTS RUST :
// 1. Trait objects : Vec<Box<dyn Connector>> pour des connectors hétérogènes
// 2. State machine : ConnectionStatus (Disconnected → Connecting → Connected)
// 3. Injection : la session est créée dans main et passée à App, aucun
//    état global
//
// La cryptographie wallet (signature, pairing) est hors périmètre : un
// connector se contente de fournir une adresse à surveiller.
// ============================================================================

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::WalletError;

// ============================================================================
// Adresses
// ============================================================================

/// Vérifie qu'une chaîne est une adresse Ethereum (0x + 40 hex)
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Adresse tronquée pour l'affichage : 6 premiers + "..." + 4 derniers
///
/// Une adresse trop courte pour être tronquée est rendue telle quelle.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

// ============================================================================
// Résolution de nom
// ============================================================================

/// Résout un nom lisible pour une adresse (usage opportuniste, affichage)
pub trait NameResolver: Send {
    fn resolve(&self, address: &str) -> Option<String>;
}

/// Carnet d'adresses issu de la configuration (adresse → nom)
///
/// Les adresses sont comparées sans tenir compte de la casse.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    names: HashMap<String, String>,
}

impl AddressBook {
    pub fn new(aliases: &HashMap<String, String>) -> Self {
        let names = aliases
            .iter()
            .map(|(address, name)| (address.to_lowercase(), name.clone()))
            .collect();
        Self { names }
    }
}

impl NameResolver for AddressBook {
    fn resolve(&self, address: &str) -> Option<String> {
        self.names.get(&address.to_lowercase()).cloned()
    }
}

// ============================================================================
// Connectors
// ============================================================================

/// Source d'une adresse de wallet
pub trait Connector: Send {
    /// Nom lisible (affiché dans la liste)
    fn name(&self) -> &str;

    /// Le connector est-il utilisable maintenant ?
    fn is_ready(&self) -> bool;

    /// Faut-il saisir une adresse avant de connecter ?
    fn needs_input(&self) -> bool;

    /// Produit l'adresse connectée
    fn connect(&self, input: Option<&str>) -> Result<String, WalletError>;
}

/// Adresse saisie par l'utilisateur (lecture seule)
#[derive(Debug, Clone, Default)]
pub struct WatchOnlyConnector;

impl Connector for WatchOnlyConnector {
    fn name(&self) -> &str {
        "Watch-only address"
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn needs_input(&self) -> bool {
        true
    }

    fn connect(&self, input: Option<&str>) -> Result<String, WalletError> {
        let address = input.unwrap_or_default().trim();
        if is_valid_address(address) {
            Ok(address.to_string())
        } else {
            Err(WalletError::InvalidAddress(address.to_string()))
        }
    }
}

/// Adresse fournie par la configuration (fichier, env, --address)
#[derive(Debug, Clone, Default)]
pub struct ConfiguredConnector {
    address: Option<String>,
}

impl ConfiguredConnector {
    pub fn new(address: Option<String>) -> Self {
        Self { address }
    }
}

impl Connector for ConfiguredConnector {
    fn name(&self) -> &str {
        "Configured address"
    }

    fn is_ready(&self) -> bool {
        self.address.is_some()
    }

    fn needs_input(&self) -> bool {
        false
    }

    fn connect(&self, _input: Option<&str>) -> Result<String, WalletError> {
        match &self.address {
            Some(address) if is_valid_address(address) => Ok(address.clone()),
            Some(address) => Err(WalletError::InvalidAddress(address.clone())),
            None => Err(WalletError::NotReady(self.name().to_string())),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Statut de la connexion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,

    /// Connexion en attente (saisie de l'adresse en cours)
    Connecting { connector: usize },

    Connected,
}

/// Résultat de begin_connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectStep {
    /// Le connector attend une saisie : appeler complete_connect
    NeedsInput,

    /// Connecté immédiatement à cette adresse
    Connected(String),
}

/// Session wallet : l'état de connexion de l'application
pub struct WalletSession {
    connectors: Vec<Box<dyn Connector>>,
    resolver: Box<dyn NameResolver>,
    status: ConnectionStatus,
    address: Option<String>,
}

impl WalletSession {
    pub fn new(connectors: Vec<Box<dyn Connector>>, resolver: Box<dyn NameResolver>) -> Self {
        Self {
            connectors,
            resolver,
            status: ConnectionStatus::Disconnected,
            address: None,
        }
    }

    /// Session standard : adresse configurée (si présente) + saisie manuelle
    pub fn with_defaults(configured: Option<String>, aliases: &HashMap<String, String>) -> Self {
        Self::new(
            vec![
                Box::new(ConfiguredConnector::new(configured)),
                Box::new(WatchOnlyConnector),
            ],
            Box::new(AddressBook::new(aliases)),
        )
    }

    pub fn connectors(&self) -> &[Box<dyn Connector>] {
        &self.connectors
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connecting { .. })
    }

    /// Commence une connexion avec le connector à cet index
    pub fn begin_connect(&mut self, index: usize) -> Result<ConnectStep, WalletError> {
        let connector = self
            .connectors
            .get(index)
            .ok_or(WalletError::UnknownConnector(index))?;

        if !connector.is_ready() {
            return Err(WalletError::NotReady(connector.name().to_string()));
        }

        if connector.needs_input() {
            debug!(connector = connector.name(), "Connector awaiting input");
            self.status = ConnectionStatus::Connecting { connector: index };
            return Ok(ConnectStep::NeedsInput);
        }

        let address = connector.connect(None)?;
        self.set_connected(address.clone());
        Ok(ConnectStep::Connected(address))
    }

    /// Termine une connexion en attente avec l'adresse saisie
    ///
    /// En cas d'adresse invalide, la session reste en Connecting pour
    /// permettre une nouvelle saisie.
    pub fn complete_connect(&mut self, input: &str) -> Result<String, WalletError> {
        let ConnectionStatus::Connecting { connector } = self.status else {
            return Err(WalletError::NotConnecting);
        };

        let connector = self
            .connectors
            .get(connector)
            .ok_or(WalletError::UnknownConnector(connector))?;

        match connector.connect(Some(input)) {
            Ok(address) => {
                self.set_connected(address.clone());
                Ok(address)
            }
            Err(e) => {
                warn!(error = %e, "Connection attempt rejected");
                Err(e)
            }
        }
    }

    /// Abandonne une connexion en attente
    pub fn cancel_connect(&mut self) {
        if self.is_pending() {
            self.status = if self.address.is_some() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            };
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(address) = self.address.take() {
            info!(address = %address, "Wallet disconnected");
        }
        self.status = ConnectionStatus::Disconnected;
    }

    /// Nom affiché : "nom (0x1234...abcd)" si résolu, sinon l'adresse tronquée
    pub fn display_name(&self) -> String {
        let Some(address) = self.address.as_deref() else {
            return String::new();
        };

        let short = short_address(address);
        match self.resolver.resolve(address) {
            Some(name) => format!("{} ({})", name, short),
            None => short,
        }
    }

    fn set_connected(&mut self, address: String) {
        info!(address = %address, "Wallet connected");
        self.address = Some(address);
        self.status = ConnectionStatus::Connected;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn session(configured: Option<&str>) -> WalletSession {
        WalletSession::with_defaults(configured.map(str::to_string), &HashMap::new())
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address(ADDRESS), "0x1234...5678");
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address(ADDRESS));
        assert!(is_valid_address("0xABCDEF7890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address("1234567890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("0xzz34567890abcdef1234567890abcdef12345678"));
    }

    #[test]
    fn test_configured_connector_ready_flag() {
        let without = session(None);
        assert!(!without.connectors()[0].is_ready());
        assert!(without.connectors()[1].is_ready());

        let with = session(Some(ADDRESS));
        assert!(with.connectors()[0].is_ready());
    }

    #[test]
    fn test_connect_configured_address() {
        let mut wallet = session(Some(ADDRESS));

        let step = wallet.begin_connect(0).unwrap();
        assert_eq!(step, ConnectStep::Connected(ADDRESS.to_string()));
        assert!(wallet.is_connected());
        assert_eq!(wallet.address(), Some(ADDRESS));
    }

    #[test]
    fn test_not_ready_connector_is_refused() {
        let mut wallet = session(None);
        assert_eq!(
            wallet.begin_connect(0),
            Err(WalletError::NotReady("Configured address".to_string()))
        );
        assert_eq!(wallet.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_watch_only_flow() {
        let mut wallet = session(None);

        assert_eq!(wallet.begin_connect(1).unwrap(), ConnectStep::NeedsInput);
        assert!(wallet.is_pending());

        // Adresse invalide : on reste en attente
        assert!(wallet.complete_connect("0xnope").is_err());
        assert!(wallet.is_pending());

        let address = wallet.complete_connect(&format!("  {}  ", ADDRESS)).unwrap();
        assert_eq!(address, ADDRESS);
        assert!(wallet.is_connected());
    }

    #[test]
    fn test_cancel_and_disconnect() {
        let mut wallet = session(None);
        wallet.begin_connect(1).unwrap();
        wallet.cancel_connect();
        assert_eq!(wallet.status(), ConnectionStatus::Disconnected);

        wallet.begin_connect(1).unwrap();
        wallet.complete_connect(ADDRESS).unwrap();
        wallet.disconnect();
        assert_eq!(wallet.status(), ConnectionStatus::Disconnected);
        assert!(wallet.address().is_none());
        assert_eq!(wallet.display_name(), "");
    }

    #[test]
    fn test_complete_without_pending_connection() {
        let mut wallet = session(None);
        assert_eq!(wallet.complete_connect(ADDRESS), Err(WalletError::NotConnecting));
    }

    #[test]
    fn test_display_name_uses_address_book() {
        let mut aliases = HashMap::new();
        aliases.insert(ADDRESS.to_uppercase().replace("0X", "0x"), "vault.eth".to_string());

        let mut wallet = WalletSession::with_defaults(Some(ADDRESS.to_string()), &aliases);
        wallet.begin_connect(0).unwrap();
        assert_eq!(wallet.display_name(), "vault.eth (0x1234...5678)");
    }

    #[test]
    fn test_display_name_falls_back_to_short_address() {
        let mut wallet = session(Some(ADDRESS));
        wallet.begin_connect(0).unwrap();
        assert_eq!(wallet.display_name(), "0x1234...5678");
    }
}
