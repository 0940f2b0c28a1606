// ============================================================================
// Structure : YieldPoint
// ============================================================================
// Un échantillon horodaté des rewards accumulés pour un protocole
//
// Une séquence de YieldPoint forme une série temporelle par protocole.
// L'ordre (croissant par timestamp) est garanti par le backend : on ne
// le vérifie pas et on ne retrie pas.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Protocol;

/// Point de l'historique de rendement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    /// Horodatage ISO-8601 (ex: "2024-05-01T00:00:00Z")
    pub timestamp: DateTime<Utc>,
    pub rewards: f64,
    pub protocol: Protocol,
}

/// Découpe l'historique en une série par protocole
///
/// CONCEPT RUST : Iterator filter + map
/// - Conserve l'ordre d'origine à l'intérieur de chaque série
/// - Les protocoles sans points sont omis
/// - Points (x, y) = (timestamp Unix en secondes, rewards) pour le Chart ratatui
pub fn series_by_protocol(points: &[YieldPoint]) -> Vec<(Protocol, Vec<(f64, f64)>)> {
    Protocol::ALL
        .iter()
        .map(|&protocol| {
            let series: Vec<(f64, f64)> = points
                .iter()
                .filter(|point| point.protocol == protocol)
                .map(|point| (point.timestamp.timestamp() as f64, point.rewards))
                .collect();
            (protocol, series)
        })
        .filter(|(_, series)| !series.is_empty())
        .collect()
}
