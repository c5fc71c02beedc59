// ============================================================================
// Structures : PricePoint et ChartPoint
// ============================================================================
// Série historique de prix et points prêts à être donnés au graphique
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. Decimal : arrondi décimal exact (pas d'erreur binaire de f64)
// 3. Iterators : map + collect pour transformer la série
// ============================================================================

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Un point de la série historique (ordre de réception conservé)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Convertit en point de graphique (x = date, y = prix à 2 décimales)
    pub fn to_chart_point(&self) -> ChartPoint {
        ChartPoint {
            x: self.timestamp,
            y: format_price(self.price),
        }
    }
}

/// Point donné au graphique
///
/// CONCEPT : Valeur de présentation
/// - y est une chaîne formatée, pas le prix de référence
/// - le prix exact reste dans PricePoint / CoinDetail
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: DateTime<Utc>,
    pub y: String,
}

impl ChartPoint {
    /// Valeur numérique de y pour le tracé
    pub fn y_value(&self) -> Option<f64> {
        self.y.parse().ok()
    }
}

/// Transforme une série de PricePoint en points de graphique
///
/// L'ordre est conservé tel que reçu (pas de tri).
pub fn to_chart_points(points: &[PricePoint]) -> Vec<ChartPoint> {
    points.iter().map(PricePoint::to_chart_point).collect()
}

/// Formatte un prix avec exactement deux décimales
///
/// CONCEPT : Mode d'arrondi fixé
/// - On part de la représentation décimale la plus courte du f64
///   ("100.005" et non 100.00499999...)
/// - Arrondi "half away from zero" : 100.005 → "100.01", -0.125 → "-0.13"
/// - Si la valeur ne tient pas dans un Decimal, repli sur le formatage f64
pub fn format_price(price: f64) -> String {
    match Decimal::from_str(&price.to_string()) {
        Ok(value) => {
            let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.2}", rounded)
        }
        Err(_) => format!("{:.2}", price),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_rounding_mode() {
        assert_eq!(format_price(100.005), "100.01");
        assert_eq!(format_price(100.004), "100.00");
        assert_eq!(format_price(101.2), "101.20");
        assert_eq!(format_price(0.125), "0.13");
        assert_eq!(format_price(-0.125), "-0.13");
        assert_eq!(format_price(42.0), "42.00");
    }

    #[test]
    fn test_chart_points_from_millis() {
        let points = vec![
            PricePoint::new(DateTime::from_timestamp_millis(1_000_000).unwrap(), 100.005),
            PricePoint::new(DateTime::from_timestamp_millis(1_086_400_000).unwrap(), 101.2),
        ];

        let chart = to_chart_points(&points);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].y, "100.01");
        assert_eq!(chart[1].y, "101.20");
        assert_eq!(chart[0].x.to_rfc3339(), "1970-01-01T00:16:40+00:00");
        assert_eq!(chart[1].x.to_rfc3339(), "1970-01-13T13:46:40+00:00");
    }

    #[test]
    fn test_chart_points_keep_received_order() {
        let later = DateTime::from_timestamp(2_000, 0).unwrap();
        let earlier = DateTime::from_timestamp(1_000, 0).unwrap();
        let points = vec![PricePoint::new(later, 2.0), PricePoint::new(earlier, 1.0)];

        let chart = to_chart_points(&points);
        assert_eq!(chart[0].x, later);
        assert_eq!(chart[1].x, earlier);
    }

    #[test]
    fn test_y_value_parses_label() {
        let point = PricePoint::new(Utc::now(), 3.14159).to_chart_point();
        assert_eq!(point.y_value(), Some(3.14));
    }
}
