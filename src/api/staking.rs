// ============================================================================
// API Client : backend de staking
// ============================================================================
// Récupère positions, historique de rendement et stats des protocoles depuis
// le backend HTTP (qui calcule APY, TVL et rewards)
//
// CONCEPTS RUST :
// 1. Trait async (async-trait) : le dashboard dépend de StakingApi, pas de
//    reqwest ; les tests injectent un faux client
// 2. Génériques : get_json::<T>() désérialise vers n'importe quel type serde
// 3. Erreurs typées : tout échec devient ApiError::RequestFailed(message)
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::ApiError;
use crate::models::{ProtocolStats, StakingPosition, YieldPoint};

/// URL du backend quand rien n'est configuré
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Délai maximal du health check au démarrage
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

// ============================================================================
// Trait StakingApi
// ============================================================================

/// Les trois ressources du dashboard
///
/// CONCEPT RUST : Send + Sync
/// - L'orchestrateur partage le client entre tâches tokio via Arc
#[async_trait]
pub trait StakingApi: Send + Sync {
    async fn fetch_staking_positions(&self, address: &str) -> Result<Vec<StakingPosition>, ApiError>;

    async fn fetch_yield_history(&self, address: &str) -> Result<Vec<YieldPoint>, ApiError>;

    async fn fetch_protocol_stats(&self) -> Result<Vec<ProtocolStats>, ApiError>;
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client REST vers le backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Crée un client pour l'URL de base donnée
    ///
    /// L'URL est validée ici : une valeur invalide est une erreur de
    /// configuration, pas une erreur de requête.
    pub fn new(base_url: &str) -> Result<Self> {
        // reqwest ne met rien en cache ; les en-têtes no-cache sont ajoutés
        // à chaque requête pour les proxys intermédiaires
        let http = reqwest::Client::builder()
            .user_agent(concat!("stakedash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Self::with_http_client(base_url, http)
    }

    /// Crée un client à partir d'un reqwest::Client déjà configuré
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("URL d'API invalide : {}", base_url))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("L'URL d'API doit être en http(s) : {}", base_url);
        }

        debug!(base_url = %base_url, "API client created");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Vérifie que le backend répond (GET /api/health)
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.get_json(&["api", "health"]).await?;
        info!("Backend is healthy");
        Ok(())
    }

    /// health() borné dans le temps
    ///
    /// Un backend qui accepte la connexion sans répondre ne doit pas bloquer
    /// le démarrage : au-delà de `limit`, la vérification échoue.
    pub async fn health_within(&self, limit: Duration) -> Result<(), ApiError> {
        match tokio::time::timeout(limit, self.health()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Backend health check timed out");
                Err(ApiError::RequestFailed(format!(
                    "Backend did not answer within {}ms",
                    limit.as_millis()
                )))
            }
        }
    }

    /// Construit l'URL d'un endpoint à partir de segments de chemin
    ///
    /// CONCEPT : Path segments
    /// - Chaque segment est encodé (une adresse ne peut pas injecter de "/")
    /// - Un éventuel préfixe de chemin dans l'URL de base est conservé
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestFailed(format!("Invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET + désérialisation JSON, sans cache
    ///
    /// Le corps est lu en texte d'abord : il sert de message d'erreur pour
    /// les statuts non-2xx, et de source JSON sinon.
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "Sending HTTP request");

        let response = self
            .http
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, bytes = body.len(), "Received HTTP response");

        if !status.is_success() {
            warn!(url = %url, status = %status, "Backend returned error status");
            return Err(ApiError::from_body(&body));
        }

        let parsed = serde_json::from_str(&body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse JSON response");
            ApiError::from(e)
        })?;
        Ok(parsed)
    }

    /// GET d'une liste : `null` (liste vide côté backend) vaut `[]`
    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, ApiError> {
        let list: Option<Vec<T>> = self.get_json(segments).await?;
        Ok(list.unwrap_or_default())
    }
}

/// Refuse une adresse vide avant toute requête
fn require_address(address: &str) -> Result<&str, ApiError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        Err(ApiError::InvalidAddress)
    } else {
        Ok(trimmed)
    }
}

#[async_trait]
impl StakingApi for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_staking_positions(&self, address: &str) -> Result<Vec<StakingPosition>, ApiError> {
        let address = require_address(address)?;
        let positions: Vec<StakingPosition> = self.get_list(&["api", "staking", address]).await?;
        info!(positions = positions.len(), "Fetched staking positions");
        Ok(positions)
    }

    #[instrument(skip(self))]
    async fn fetch_yield_history(&self, address: &str) -> Result<Vec<YieldPoint>, ApiError> {
        let address = require_address(address)?;
        let points: Vec<YieldPoint> = self.get_list(&["api", "yields", address]).await?;
        info!(points = points.len(), "Fetched yield history");
        Ok(points)
    }

    #[instrument(skip(self))]
    async fn fetch_protocol_stats(&self) -> Result<Vec<ProtocolStats>, ApiError> {
        let stats: Vec<ProtocolStats> = self.get_list(&["api", "protocols"]).await?;
        info!(protocols = stats.len(), "Fetched protocol stats");
        Ok(stats)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

    /// Mini serveur HTTP : accepte une connexion, renvoie la réponse donnée
    /// et retourne la requête brute reçue
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    /// Client sans proxy système : les tests parlent au serveur local
    fn test_client(base: &str) -> ApiClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        ApiClient::with_http_client(base, http).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_address_segment() {
        let client = ApiClient::new("http://localhost:8080").unwrap();
        let url = client.endpoint(&["api", "staking", ADDRESS]).unwrap();
        assert_eq!(url.as_str(), format!("http://localhost:8080/api/staking/{}", ADDRESS));

        let url = client.endpoint(&["api", "staking", "a/b"]).unwrap();
        assert_eq!(url.path(), "/api/staking/a%2Fb");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = ApiClient::new("https://example.com/backend/").unwrap();
        let url = client.endpoint(&["api", "protocols"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/backend/api/protocols");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:someone@example.com").is_err());
    }

    #[tokio::test]
    async fn test_positions_request_path_and_no_cache_headers() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"protocol":"ether.fi","stakedAmount":3.0,"rewards":1.5,"currentValue":4.5}]"#,
        )
        .await;
        let client = test_client(&base);

        let positions = client.fetch_staking_positions(ADDRESS).await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert!(request.starts_with(&format!("get /api/staking/{} http/1.1", ADDRESS.to_lowercase())));
        assert!(request.contains("cache-control: no-cache, no-store"));
        assert!(request.contains("pragma: no-cache"));

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].protocol, Protocol::EtherFi);
        assert_eq!(positions[0].rewards, 1.5);
    }

    #[tokio::test]
    async fn test_yields_request_path() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"timestamp":"2024-05-01T00:00:00Z","rewards":0.01,"protocol":"lido"}]"#,
        )
        .await;
        let client = test_client(&base);

        let points = client.fetch_yield_history(ADDRESS).await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert!(request.starts_with(&format!("get /api/yields/{} http/1.1", ADDRESS.to_lowercase())));
        assert!(request.contains("cache-control: no-cache, no-store"));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].protocol, Protocol::Lido);
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body_text() {
        let (base, _server) = serve_once("429 Too Many Requests", "rate limited").await;
        let client = test_client(&base);

        let err = client.fetch_protocol_stats().await.unwrap_err();
        assert_eq!(err, ApiError::RequestFailed("rate limited".to_string()));
        assert_eq!(err.to_string(), "rate limited");
    }

    #[tokio::test]
    async fn test_health_check_gives_up_on_silent_backend() {
        // Accepte la connexion mais ne répond jamais
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });
        let client = test_client(&format!("http://{}", addr));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.health_within(Duration::from_millis(200)),
        )
        .await
        .expect("health check was not bounded");

        assert_eq!(
            result,
            Err(ApiError::RequestFailed("Backend did not answer within 200ms".to_string()))
        );
    }

    #[tokio::test]
    async fn test_protocols_request_path_and_no_cache_headers() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"protocol":"rocketpool","currentApy":2.9,"tvl":512.0,"updatedAt":"2024-05-01T00:00:00Z"}]"#,
        )
        .await;
        let client = test_client(&base);

        let stats = client.fetch_protocol_stats().await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert!(request.starts_with("get /api/protocols http/1.1"));
        assert!(request.contains("cache-control: no-cache, no-store"));
        assert!(request.contains("pragma: no-cache"));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].protocol, Protocol::RocketPool);
    }

    #[tokio::test]
    async fn test_null_list_body_is_empty_list() {
        // Le backend encode une liste vide en `null`
        let (base, _server) = serve_once("200 OK", "null\n").await;
        let positions = test_client(&base).fetch_staking_positions(ADDRESS).await.unwrap();
        assert!(positions.is_empty());

        let (base, _server) = serve_once("200 OK", "null\n").await;
        let points = test_client(&base).fetch_yield_history(ADDRESS).await.unwrap();
        assert!(points.is_empty());

        let (base, _server) = serve_once("200 OK", "null").await;
        let stats = test_client(&base).fetch_protocol_stats().await.unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_with_empty_body_uses_default_message() {
        let (base, _server) = serve_once("502 Bad Gateway", "").await;
        let client = test_client(&base);

        let err = client.fetch_protocol_stats().await.unwrap_err();
        assert_eq!(err.to_string(), crate::error::DEFAULT_REQUEST_FAILED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_request_failed() {
        let (base, _server) = serve_once("200 OK", r#"[{"protocol":"lido""#).await;
        let client = test_client(&base);

        let err = client.fetch_protocol_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_address_sends_no_request() {
        // Port fermé : si une requête partait, on aurait une erreur de transport
        let client = test_client("http://127.0.0.1:9");

        let err = client.fetch_staking_positions("   ").await.unwrap_err();
        assert_eq!(err, ApiError::InvalidAddress);

        let err = client.fetch_yield_history("").await.unwrap_err();
        assert_eq!(err, ApiError::InvalidAddress);
    }

    #[tokio::test]
    async fn test_health() {
        let (base, server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let client = test_client(&base);

        client.health().await.unwrap();
        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/health http/1.1"));
    }
}
