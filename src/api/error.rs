// ============================================================================
// Erreurs de l'API
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] définit le message Display
// - #[source] chaîne l'erreur sous-jacente (visible avec {:?} / anyhow)
//
// Taxonomie :
// - Transport / Status : le backend est injoignable ou répond en erreur
// - Decode : le JSON ne correspond pas au contrat attendu
// ============================================================================

use thiserror::Error;

/// Erreur renvoyée par un appel au backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// URL de base mal formée (configuration)
    #[error("URL invalide '{url}' : {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Erreur réseau (connexion refusée, timeout, ...)
    #[error("échec de la requête HTTP vers {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Le backend a répondu avec un statut non-2xx
    #[error("{url} a retourné HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Réponse JSON illisible ou de forme inattendue
    #[error("réponse JSON invalide de {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Retourne true si la réponse est arrivée mais n'était pas exploitable
    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}
