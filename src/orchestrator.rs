// ============================================================================
// Orchestrateur du dashboard
// ============================================================================
// Réagit au changement d'adresse du wallet : lance le chargement conjoint des
// trois ressources, met à jour les trois LoadState, et ignore les résultats
// d'un cycle devenu obsolète
//
// CONCEPTS RUST :
// 1. tokio::try_join! : trois futures en parallèle, arrêt au premier échec
// 2. CancellationToken (tokio-util) : un token par cycle, annulé au
//    changement d'adresse, au refresh ou au Drop
// 3. Channels tokio (mpsc unbounded) : la tâche réseau renvoie son résultat
//    au thread UI, qui l'applique sans verrou
//
// MACHINE À ÉTATS (par identité d'adresse) :
//   Idle ──(adresse)──▶ Loading ──▶ Ready (3 ressources)
//                              └──▶ Failed (même message ×3)
//   Loading ──(nouvelle adresse)──▶ Loading (l'ancien cycle est ignoré)
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::StakingApi;
use crate::error::{failure_message, GENERIC_LOAD_FAILURE};
use crate::models::{LoadState, ProtocolStats, StakingPosition, YieldPoint};

// ============================================================================
// État exposé aux vues
// ============================================================================

/// Les trois ressources du dashboard et la date du dernier succès
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub positions: LoadState<Vec<StakingPosition>>,
    pub yields: LoadState<Vec<YieldPoint>>,
    pub protocols: LoadState<Vec<ProtocolStats>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardData {
    /// Remet les trois ressources en Loading
    fn reset_loading(&mut self) {
        self.positions = LoadState::Loading;
        self.yields = LoadState::Loading;
        self.protocols = LoadState::Loading;
    }

    /// Vrai si au moins une ressource est encore en chargement
    pub fn is_loading(&self) -> bool {
        self.positions.is_loading() || self.yields.is_loading() || self.protocols.is_loading()
    }

    /// Message d'erreur du dernier cycle (identique pour les trois ressources)
    pub fn error(&self) -> Option<&str> {
        self.positions
            .error()
            .or_else(|| self.yields.error())
            .or_else(|| self.protocols.error())
    }
}

// ============================================================================
// Cycle de chargement
// ============================================================================

/// Résultat joint des trois requêtes
#[derive(Debug, Clone)]
struct Snapshot {
    positions: Vec<StakingPosition>,
    yields: Vec<YieldPoint>,
    protocols: Vec<ProtocolStats>,
}

/// Résultat d'un cycle, renvoyé par la tâche réseau
#[derive(Debug)]
struct CycleOutcome {
    generation: u64,
    result: Result<Snapshot, String>,
}

/// Cycle en cours (un seul à la fois)
#[derive(Debug)]
struct Cycle {
    generation: u64,
    address: String,
    token: CancellationToken,
}

/// Orchestrateur : possède l'état du dashboard et le cycle courant
///
/// CONCEPT RUST : Arc<dyn Trait>
/// - Le client est partagé avec les tâches tokio (durée de vie 'static)
/// - dyn StakingApi : ApiClient en production, faux client dans les tests
pub struct Orchestrator {
    api: Arc<dyn StakingApi>,
    runtime: Handle,
    state: DashboardData,
    address: Option<String>,
    cycle: Option<Cycle>,
    next_generation: u64,
    outcome_tx: UnboundedSender<CycleOutcome>,
    outcome_rx: UnboundedReceiver<CycleOutcome>,
}

impl Orchestrator {
    /// Crée un orchestrateur inactif (pas d'adresse)
    ///
    /// `runtime` : handle du runtime tokio sur lequel lancer les requêtes
    pub fn new(api: Arc<dyn StakingApi>, runtime: Handle) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            api,
            runtime,
            state: DashboardData::default(),
            address: None,
            cycle: None,
            next_generation: 0,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn state(&self) -> &DashboardData {
        &self.state
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Pas d'adresse : les vues affichent l'invitation à connecter un wallet
    pub fn is_idle(&self) -> bool {
        self.address.is_none()
    }

    /// Vrai tant que le cycle courant n'a pas été appliqué
    pub fn is_in_flight(&self) -> bool {
        self.cycle.is_some()
    }

    /// Change l'identité du wallet
    ///
    /// - même adresse : rien à faire
    /// - None : l'éventuel cycle en cours est abandonné, retour à Idle
    /// - nouvelle adresse : nouveau cycle, l'ancien ne sera jamais appliqué
    pub fn set_address(&mut self, address: Option<String>) {
        if address == self.address {
            return;
        }

        self.cancel_cycle();
        self.address = address;

        match self.address.clone() {
            Some(address) => {
                info!(address = %address, "Wallet address changed, loading dashboard");
                self.start_cycle(address);
            }
            None => {
                info!("Wallet disconnected, dashboard idle");
                self.state = DashboardData::default();
            }
        }
    }

    /// Relance un cycle pour l'adresse courante (retry, refresh périodique)
    pub fn refresh(&mut self) {
        let Some(address) = self.address.clone() else {
            debug!("Refresh ignored: no wallet address");
            return;
        };

        self.cancel_cycle();
        info!(address = %address, "Refreshing dashboard");
        self.start_cycle(address);
    }

    /// Applique les résultats arrivés, sans bloquer (appelé à chaque tick UI)
    ///
    /// Retourne true si l'état a changé.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    /// Attend le prochain résultat et l'applique
    ///
    /// Retourne true si l'état a changé (false pour un résultat obsolète).
    pub async fn settle(&mut self) -> bool {
        match self.outcome_rx.recv().await {
            Some(outcome) => self.apply(outcome),
            // Impossible tant que self possède outcome_tx
            None => false,
        }
    }

    // ========================================================================
    // Interne
    // ========================================================================

    fn cancel_cycle(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            debug!(generation = cycle.generation, address = %cycle.address, "Cancelling in-flight cycle");
            cycle.token.cancel();
        }
    }

    /// Démarre un cycle : reset en Loading puis lance la tâche réseau
    fn start_cycle(&mut self, address: String) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let token = CancellationToken::new();

        self.state.reset_loading();

        debug!(generation, address = %address, "Starting fetch cycle");
        self.runtime.spawn(run_cycle(
            Arc::clone(&self.api),
            address.clone(),
            token.clone(),
            generation,
            self.outcome_tx.clone(),
        ));

        self.cycle = Some(Cycle {
            generation,
            address,
            token,
        });
    }

    /// Applique un résultat s'il appartient au cycle courant
    ///
    /// Les trois ressources changent ensemble : succès pour toutes, ou le
    /// même message d'échec pour toutes.
    fn apply(&mut self, outcome: CycleOutcome) -> bool {
        let is_current = matches!(
            &self.cycle,
            Some(cycle) if cycle.generation == outcome.generation && !cycle.token.is_cancelled()
        );
        if !is_current {
            debug!(generation = outcome.generation, "Discarding stale cycle outcome");
            return false;
        }

        self.cycle = None;

        match outcome.result {
            Ok(snapshot) => {
                info!(
                    generation = outcome.generation,
                    positions = snapshot.positions.len(),
                    yields = snapshot.yields.len(),
                    protocols = snapshot.protocols.len(),
                    "Dashboard loaded"
                );
                self.state.positions = LoadState::Ready(snapshot.positions);
                self.state.yields = LoadState::Ready(snapshot.yields);
                self.state.protocols = LoadState::Ready(snapshot.protocols);
                self.state.last_updated = Some(Utc::now());
            }
            Err(message) => {
                warn!(generation = outcome.generation, error = %message, "Dashboard failed to load");
                self.state.positions = LoadState::Failed(message.clone());
                self.state.yields = LoadState::Failed(message.clone());
                self.state.protocols = LoadState::Failed(message);
            }
        }
        true
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.cancel_cycle();
    }
}

// ============================================================================
// Tâche réseau
// ============================================================================

/// Les trois requêtes en parallèle ; la première erreur l'emporte
async fn fetch_all(api: Arc<dyn StakingApi>, address: String) -> Result<Snapshot, String> {
    let (positions, yields, protocols) = tokio::try_join!(
        api.fetch_staking_positions(&address),
        api.fetch_yield_history(&address),
        api.fetch_protocol_stats(),
    )
    .map_err(|e| failure_message(&e))?;

    Ok(Snapshot {
        positions,
        yields,
        protocols,
    })
}

/// Exécute un cycle et publie son résultat, sauf s'il a été annulé
///
/// Le fetch tourne dans sa propre tâche : un panic y est récupéré via le
/// JoinError et devient le message générique.
async fn run_cycle(
    api: Arc<dyn StakingApi>,
    address: String,
    token: CancellationToken,
    generation: u64,
    outcome_tx: UnboundedSender<CycleOutcome>,
) {
    let mut fetch = tokio::spawn(fetch_all(api, address));

    let joined = tokio::select! {
        _ = token.cancelled() => {
            debug!(generation, "Cycle cancelled before completion");
            fetch.abort();
            return;
        }
        joined = &mut fetch => joined,
    };

    let result = match joined {
        Ok(result) => result,
        Err(join_error) => {
            error!(generation, error = %join_error, "Fetch task failed");
            Err(GENERIC_LOAD_FAILURE.to_string())
        }
    };

    if token.is_cancelled() {
        debug!(generation, "Cycle cancelled, dropping result");
        return;
    }

    // Le receiver vit aussi longtemps que l'orchestrateur
    let _ = outcome_tx.send(CycleOutcome { generation, result });
}

// ============================================================================
// Tests unitaires
// ============================================================================
