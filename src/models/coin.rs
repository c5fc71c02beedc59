// ============================================================================
// Structures : CoinSummary et CoinDetail
// ============================================================================
// Représentent une crypto-monnaie telle que renvoyée par le backend
//
// CONCEPTS RUST :
// 1. Structures immuables : une mise à jour = remplacement complet
// 2. Option<T> : champs optionnels du backend (image, description)
// 3. Composition : CoinDetail contient un MarketData
// ============================================================================

/// Entrée de la liste des coins (écran Listing)
#[derive(Debug, Clone, PartialEq)]
pub struct CoinSummary {
    /// Identifiant unique (ex: "bitcoin")
    pub id: String,

    /// Nom affiché (ex: "Bitcoin")
    pub name: String,

    /// Ticker (ex: "btc")
    pub symbol: String,

    /// Prix actuel en USD (absent si le backend ne le connaît pas)
    pub current_price: Option<f64>,

    /// Référence de la miniature (URL), vide si absente
    pub image: String,
}

impl CoinSummary {
    /// Titre affiché : "Bitcoin (BTC)"
    pub fn title(&self) -> String {
        coin_title(&self.name, &self.symbol)
    }

    /// Formatte l'entrée pour la liste
    ///
    /// Format : "Bitcoin (BTC)              $67000.5"
    /// (prix inconnu : "N/A")
    ///
    /// Note : le titre est tronqué à 28 caractères pour éviter le débordement
    pub fn display(&self) -> String {
        let title = self.title();
        let truncated = if title.chars().count() <= 28 {
            title
        } else {
            let head: String = title.chars().take(27).collect();
            format!("{}…", head)
        };

        let price = match self.current_price {
            Some(price) => format!("${}", price),
            None => "N/A".to_string(),
        };

        format!("{:<28} {:>16}", truncated, price)
    }
}

/// Instantané des données de marché (tout en USD)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketData {
    /// Prix actuel
    pub current_price: f64,

    /// Capitalisation
    pub market_cap: Option<f64>,

    /// Variation sur 24h en pourcentage
    pub change_percent_24h: Option<f64>,
}

/// Détail d'un coin (écran Detail)
///
/// CONCEPT : Invariant
/// - N'existe qu'après un fetch de détail réussi
/// - Une seule instance vivante par vue montée (voir DetailController)
#[derive(Debug, Clone, PartialEq)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,

    /// Référence de l'image (URL), vide si absente
    pub image: String,

    /// Description brute (HTML) telle que reçue
    pub description: String,

    pub market: MarketData,
}

impl CoinDetail {
    /// Titre affiché : "Bitcoin (BTC)"
    pub fn title(&self) -> String {
        coin_title(&self.name, &self.symbol)
    }

    /// Prix affiché, valeur exacte reçue (aucun arrondi)
    pub fn price_label(&self) -> String {
        format!("${}", self.market.current_price)
    }

    /// Capitalisation affichée, "N/A" si absente
    pub fn market_cap_label(&self) -> String {
        match self.market.market_cap {
            Some(cap) => format!("${}", cap),
            None => "N/A".to_string(),
        }
    }

    /// Variation 24h affichée, "N/A" si absente
    pub fn change_label(&self) -> String {
        match self.market.change_percent_24h {
            Some(change) => format!("{}%", change),
            None => "N/A".to_string(),
        }
    }

    /// Retourne true si le coin est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.market.change_percent_24h.map(|c| c >= 0.0).unwrap_or(false)
    }

    /// Première phrase de la description, nettoyée du HTML
    ///
    /// CONCEPT : Le HTML du backend n'est jamais affiché tel quel
    /// - sanitize_description() retire balises et entités
    /// - on garde le texte jusqu'au premier ". " puis on remet le point
    pub fn summary(&self) -> Option<String> {
        let text = sanitize_description(&self.description);
        if text.is_empty() {
            return None;
        }

        let first = text.split(". ").next().unwrap_or(&text);
        let first = first.trim_end().trim_end_matches('.');
        Some(format!("{}.", first))
    }
}

fn coin_title(name: &str, symbol: &str) -> String {
    format!("{} ({})", name, symbol.to_uppercase())
}

// ============================================================================
// Nettoyage de la description HTML
// ============================================================================
// CONCEPT RUST : State machine sur un itérateur de chars
// - tag : contenu de la balise en cours (entre '<' et '>')
// - raw_text : dans <script> ou <style>, le texte n'est pas affiché
// - les entités (&amp; ...) sont décodées au fil de l'eau
// ============================================================================

/// Éléments dont le contenu n'est jamais du texte affichable
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Convertit un fragment HTML en texte brut affichable
///
/// - Supprime toutes les balises (<a href=...>, <br/>, ...)
/// - Supprime le contenu des <script> et <style>
/// - Un '<' qui n'ouvre pas de balise ("< 1 cent") reste du texte
/// - Décode les entités courantes et numériques
/// - Supprime les caractères de contrôle
/// - Réduit les espaces multiples à un seul
pub fn sanitize_description(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    let mut tag: Option<String> = None;
    let mut raw_text: Option<String> = None;

    while let Some(c) = chars.next() {
        if let Some(content) = tag.as_mut() {
            if c != '>' {
                content.push(c);
                continue;
            }

            let content = std::mem::take(content);
            tag = None;

            let closing = content.starts_with('/');
            let name = tag_name(&content);
            if raw_text.is_some() {
                if closing && raw_text.as_deref() == Some(name.as_str()) {
                    raw_text = None;
                    text.push(' ');
                }
            } else {
                if !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    raw_text = Some(name);
                }
                text.push(' ');
            }
            continue;
        }

        match c {
            // Dans <script>/<style>, seule une balise fermante compte
            '<' if chars
                .peek()
                .is_some_and(|&next| if raw_text.is_some() { next == '/' } else { opens_tag(next) }) =>
            {
                tag = Some(String::new())
            }
            _ if raw_text.is_some() => {}
            '&' => {
                // Lit l'entité jusqu'au ';' (max 10 caractères)
                let mut entity = String::new();
                while let Some(&next) = chars.peek() {
                    if next == ';' || entity.len() > 10 {
                        break;
                    }
                    if !(next.is_ascii_alphanumeric() || next == '#') {
                        break;
                    }
                    entity.push(next);
                    chars.next();
                }

                if chars.peek() == Some(&';') {
                    if let Some(decoded) = decode_entity(&entity) {
                        chars.next();
                        text.push(decoded);
                        continue;
                    }
                }
                text.push('&');
                text.push_str(&entity);
            }
            _ => text.push(c),
        }
    }

    // Retire les caractères de contrôle et réduit les espaces
    let mut cleaned = String::with_capacity(text.len());
    let mut prev_space = true;
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_space {
                cleaned.push(' ');
            }
            prev_space = true;
        } else if !c.is_control() {
            cleaned.push(c);
            prev_space = false;
        }
    }

    cleaned.trim_end().to_string()
}

/// '<' suivi d'une lettre, '/', '!' ou '?' ouvre une balise
fn opens_tag(next: char) -> bool {
    next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')
}

/// Nom de l'élément en minuscules ("/Script " → "script")
fn tag_name(content: &str) -> String {
    content
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value).filter(|c| !c.is_control() || c.is_whitespace())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
