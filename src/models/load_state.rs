// ============================================================================
// Enum : LoadState<T>
// ============================================================================
// État de chargement d'une ressource : en cours, en échec, ou prête
//
// CONCEPTS RUST :
// 1. Enum générique : un seul type pour les trois ressources du dashboard
// 2. Tagged union : "loading ET erreur" n'est pas représentable
// 3. Exhaustivité : les vues font un match, le compilateur vérifie les 3 cas
//
// Cycle de vie :
//   Loading ──(succès)──▶ Ready(data)
//   Loading ──(échec)───▶ Failed(message)
//   Ready / Failed ──(nouveau cycle)──▶ Loading
// ============================================================================

/// État de chargement d'une ressource
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Requête en cours (état initial)
    Loading,

    /// Le dernier cycle a échoué avec ce message
    Failed(String),

    /// Données du dernier cycle réussi
    Ready(T),
}

// Implémenté à la main : derive(Default) exigerait T: Default
impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// Message d'erreur si le dernier cycle a échoué
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Données si le dernier cycle a réussi
    ///
    /// CONCEPT RUST : Option<&T>
    /// - Emprunte les données sans les copier
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }
}
