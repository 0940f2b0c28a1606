// ============================================================================
// Erreurs typées
// ============================================================================
// CONCEPT RUST : thiserror
// - derive(Error) génère Display + std::error::Error
// - #[error("{0}")] : le message affiché est exactement le texte porté
//
// Le code applicatif (main, setup du terminal) reste sur anyhow ; ces enums
// couvrent les frontières dont l'appelant a besoin de connaître la forme.
// ============================================================================

use thiserror::Error;

/// Message par défaut quand le backend renvoie une erreur sans corps
pub const DEFAULT_REQUEST_FAILED: &str = "Request failed";

/// Message générique pour toute erreur inattendue (panic de tâche, etc.)
pub const GENERIC_LOAD_FAILURE: &str = "Failed to load data.";

/// Erreurs du client REST
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Statut non-2xx, JSON invalide ou erreur de transport
    #[error("{0}")]
    RequestFailed(String),

    /// Adresse vide : aucune requête n'est envoyée
    #[error("Wallet address must not be empty")]
    InvalidAddress,
}

impl ApiError {
    /// Construit l'erreur à partir du corps d'une réponse non-2xx
    ///
    /// Le message est le texte du corps, jamais le code HTTP seul.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            ApiError::RequestFailed(DEFAULT_REQUEST_FAILED.to_string())
        } else {
            ApiError::RequestFailed(body.to_string())
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::RequestFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::RequestFailed(err.to_string())
    }
}

/// Normalise une erreur en message affichable
///
/// Un message vide devient le message générique.
pub fn failure_message(err: &ApiError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_LOAD_FAILURE.to_string()
    } else {
        message
    }
}

/// Erreurs de la session wallet (connexion via un connector)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Connector {0} is not ready")]
    NotReady(String),

    #[error("No connector at index {0}")]
    UnknownConnector(usize),

    #[error("No connection in progress")]
    NotConnecting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_displays_body_verbatim() {
        let err = ApiError::from_body("rate limited");
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_empty_body_uses_default_message() {
        assert_eq!(ApiError::from_body("").to_string(), DEFAULT_REQUEST_FAILED);
        assert_eq!(ApiError::from_body("  \n").to_string(), DEFAULT_REQUEST_FAILED);
    }

    #[test]
    fn test_failure_message_normalizes_blank() {
        let blank = ApiError::RequestFailed(String::new());
        assert_eq!(failure_message(&blank), GENERIC_LOAD_FAILURE);

        let real = ApiError::RequestFailed("upstream down".to_string());
        assert_eq!(failure_message(&real), "upstream down");
    }

    #[test]
    fn test_json_error_becomes_request_failed() {
        let json_err = serde_json::from_str::<Vec<u32>>("{not json").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(matches!(err, ApiError::RequestFailed(_)));
    }
}
