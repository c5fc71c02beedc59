// ============================================================================
// Endpoints du backend
// ============================================================================
// Deux services distincts :
// - metadata : liste des coins et détail d'un coin
// - chart : historique de prix d'un coin
//
// CONCEPT RUST : url::Url
// - Validation une seule fois à la construction
// - path_segments_mut() encode l'identifiant comme UN segment
//   ("a/b" devient "a%2Fb", pas de traversée de chemin)
// ============================================================================

use url::Url;

use crate::api::ApiError;

/// Adresse par défaut du service de métadonnées
pub const DEFAULT_METADATA_URL: &str = "http://localhost:3005";

/// Adresse par défaut du service d'historique
pub const DEFAULT_CHART_URL: &str = "http://localhost:3004";

/// URLs de base des deux services
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    metadata: Url,
    chart: Url,
}

impl Endpoints {
    /// Valide les deux URLs de base
    pub fn new(metadata: &str, chart: &str) -> Result<Self, ApiError> {
        Ok(Self {
            metadata: parse_base(metadata)?,
            chart: parse_base(chart)?,
        })
    }

    /// GET {metadata}/coins
    pub fn coins_url(&self) -> Result<Url, ApiError> {
        join(&self.metadata, &["coins"])
    }

    /// GET {metadata}/coins/{id}
    pub fn coin_url(&self, id: &str) -> Result<Url, ApiError> {
        check_id(id)?;
        join(&self.metadata, &["coins", id])
    }

    /// GET {chart}/coins/{id}/chart
    pub fn chart_url(&self, id: &str) -> Result<Url, ApiError> {
        check_id(id)?;
        join(&self.chart, &["coins", id, "chart"])
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: &str| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("schéma http ou https attendu"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL de base attendue"));
    }

    Ok(url)
}

/// "." et ".." seraient interprétés comme des segments de navigation
fn check_id(id: &str) -> Result<(), ApiError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ApiError::InvalidUrl {
            url: id.to_string(),
            reason: "identifiant de coin invalide".to_string(),
        });
    }
    Ok(())
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl {
            url: base.to_string(),
            reason: "URL de base attendue".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Endpoints {
        Endpoints::new(DEFAULT_METADATA_URL, DEFAULT_CHART_URL).unwrap()
    }

    #[test]
    fn test_default_urls() {
        let endpoints = defaults();
        assert_eq!(endpoints.coins_url().unwrap().as_str(), "http://localhost:3005/coins");
        assert_eq!(
            endpoints.coin_url("bitcoin").unwrap().as_str(),
            "http://localhost:3005/coins/bitcoin"
        );
        assert_eq!(
            endpoints.chart_url("bitcoin").unwrap().as_str(),
            "http://localhost:3004/coins/bitcoin/chart"
        );
    }

    #[test]
    fn test_base_with_path_prefix() {
        let endpoints = Endpoints::new("https://api.example.com/v1/", "https://charts.example.com/v2").unwrap();
        assert_eq!(
            endpoints.coin_url("ethereum").unwrap().as_str(),
            "https://api.example.com/v1/coins/ethereum"
        );
        assert_eq!(
            endpoints.chart_url("ethereum").unwrap().as_str(),
            "https://charts.example.com/v2/coins/ethereum/chart"
        );
    }

    #[test]
    fn test_id_is_a_single_segment() {
        let endpoints = defaults();
        let url = endpoints.coin_url("a/b").unwrap();
        assert_eq!(url.path(), "/coins/a%2Fb");
        assert!(endpoints.coin_url("..").is_err());
        assert!(endpoints.chart_url("").is_err());
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(matches!(
            Endpoints::new("not a url", DEFAULT_CHART_URL),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Endpoints::new(DEFAULT_METADATA_URL, "ftp://charts.example.com"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}
