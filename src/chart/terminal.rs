// ============================================================================
// Surface de graphique pour le terminal
// ============================================================================
// ratatui dessine en mode immédiat (tout est redessiné à chaque frame).
// Pour respecter le contrat construct/destroy, le handle TerminalChart
// "retient" le graphique calculé une fois (points lissés, bornes, labels)
// et ui::detail le dessine à chaque frame.
//
// CONCEPTS RUST :
// 1. HashSet : cibles occupées (un seul graphique par cible)
// 2. Iterators : fold pour min/max, windows pour le lissage
// 3. Pas de Clone sur TerminalChart : possession exclusive
// ============================================================================

use std::collections::HashSet;

use chrono::DateTime;
use tracing::{debug, warn};

use crate::chart::{AxisConfig, ChartError, ChartSeries, ChartSurface, RenderTarget, TimeUnit};
use crate::models::format_price;

/// Nombre maximum d'intervalles sur l'axe X
const MAX_X_TICKS: i64 = 8;

/// Nombre de points intermédiaires ajoutés par segment lors du lissage
const SMOOTHING_STEPS: usize = 4;

// ============================================================================
// Handle : graphique retenu
// ============================================================================

/// Graphique construit, prêt à être dessiné par ratatui
#[derive(Debug)]
pub struct TerminalChart {
    target: RenderTarget,

    /// Libellé de la série ("Price (USD)")
    pub label: String,

    /// Titre de l'axe X
    pub x_title: String,

    /// Titre de l'axe Y
    pub y_title: String,

    /// Points d'origine (x = secondes Unix, y = prix formaté)
    pub points: Vec<(f64, f64)>,

    /// Points affichés (avec lissage)
    pub line: Vec<(f64, f64)>,

    pub x_bounds: [f64; 2],
    pub x_labels: Vec<String>,
    pub y_bounds: [f64; 2],
    pub y_labels: Vec<String>,
}

impl TerminalChart {
    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Calcule tout ce dont le rendu aura besoin
    fn build(target: RenderTarget, series: ChartSeries, axes: AxisConfig) -> Self {
        // Convertit les ChartPoint en (x, y) numériques
        // Un y illisible est ignoré (ne devrait pas arriver : format_price)
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .filter_map(|p| Some((p.x.timestamp() as f64, p.y_value()?)))
            .collect();

        if points.len() < series.points.len() {
            warn!(
                skipped = series.points.len() - points.len(),
                "Skipped chart points with unreadable values"
            );
        }

        let line = smooth(&points, series.tension, SMOOTHING_STEPS);

        let (x_bounds, x_labels) = time_ticks(&points, axes.x.unit);
        let (y_bounds, y_labels) = price_ticks(&line);

        Self {
            target,
            label: series.label,
            x_title: axes.x.title,
            y_title: axes.y.title,
            points,
            line,
            x_bounds,
            x_labels,
            y_bounds,
            y_labels,
        }
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Surface ratatui : suit les cibles occupées
#[derive(Debug, Default)]
pub struct TerminalSurface {
    bound: HashSet<RenderTarget>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nombre de graphiques vivants
    pub fn live_charts(&self) -> usize {
        self.bound.len()
    }
}

impl ChartSurface for TerminalSurface {
    type Handle = TerminalChart;

    fn construct(
        &mut self,
        target: RenderTarget,
        series: ChartSeries,
        axes: AxisConfig,
    ) -> Result<TerminalChart, ChartError> {
        if !self.bound.insert(target) {
            return Err(ChartError::TargetBusy(target.id()));
        }

        let chart = TerminalChart::build(target, series, axes);
        debug!(target_id = target.id(), points = chart.points.len(), "Chart constructed");
        Ok(chart)
    }

    fn destroy(&mut self, handle: TerminalChart) {
        self.bound.remove(&handle.target);
        debug!(target_id = handle.target.id(), "Chart destroyed");
    }
}

// ============================================================================
// Lissage de la courbe
// ============================================================================
// CONCEPT : Spline d'Hermite cubique (cardinal spline)
// - x est interpolé linéairement (l'axe du temps reste monotone)
// - y suit une courbe dont les tangentes valent tension * (y[i+1] - y[i-1])
// - Les points d'origine sont tous conservés dans le résultat
// ============================================================================

/// Ajoute `steps` points intermédiaires par segment
pub fn smooth(points: &[(f64, f64)], tension: f64, steps: usize) -> Vec<(f64, f64)> {
    if tension <= 0.0 || steps == 0 || points.len() < 3 {
        return points.to_vec();
    }

    let mut line = Vec::with_capacity(points.len() + (points.len() - 1) * steps);
    let last = points.len() - 1;

    for i in 0..last {
        let (x1, y1) = points[i];
        let (x2, y2) = points[i + 1];
        let y0 = if i == 0 { y1 } else { points[i - 1].1 };
        let y3 = if i + 1 == last { y2 } else { points[i + 2].1 };

        let m1 = tension * (y2 - y0);
        let m2 = tension * (y3 - y1);

        line.push((x1, y1));
        for step in 1..=steps {
            let t = step as f64 / (steps + 1) as f64;
            let t2 = t * t;
            let t3 = t2 * t;

            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;

            let x = x1 + (x2 - x1) * t;
            let y = h00 * y1 + h10 * m1 + h01 * y2 + h11 * m2;
            line.push((x, y));
        }
    }
    line.push(points[last]);

    line
}

// ============================================================================
// Axes
// ============================================================================

/// Bornes et labels de l'axe temporel, alignés sur l'unité
///
/// CONCEPT : Labels réguliers
/// - ratatui répartit les labels uniformément entre les bornes
/// - On aligne donc les bornes sur des multiples de l'unité (minuit pour Day)
///   pour que chaque label tombe exactement sur une frontière de jour
fn time_ticks(points: &[(f64, f64)], unit: TimeUnit) -> ([f64; 2], Vec<String>) {
    let step = unit.seconds();

    let (min_x, max_x) = match min_max(points.iter().map(|&(x, _)| x)) {
        Some(bounds) => bounds,
        None => return ([0.0, step as f64], Vec::new()),
    };

    let start = (min_x as i64).div_euclid(step) * step;
    let mut spans = ((max_x as i64) - start + step - 1).div_euclid(step).max(1);

    // Au-delà de MAX_X_TICKS intervalles, un label toutes les `stride` unités
    let stride = ((spans + MAX_X_TICKS - 1) / MAX_X_TICKS).max(1);
    spans = ((spans + stride - 1) / stride) * stride;
    let end = start + spans * step;

    let labels = (0..=spans / stride)
        .map(|i| {
            let t = start + i * stride * step;
            DateTime::from_timestamp(t, 0)
                .map(|d| d.format(unit.label_format()).to_string())
                .unwrap_or_default()
        })
        .collect();

    ([start as f64, end as f64], labels)
}

/// Bornes de l'axe Y avec 5% de marge et 3 labels
fn price_ticks(line: &[(f64, f64)]) -> ([f64; 2], Vec<String>) {
    let (min_price, max_price) = match min_max(line.iter().map(|&(_, y)| y)) {
        Some(bounds) => bounds,
        None => return ([0.0, 1.0], Vec::new()),
    };

    // Ajoute une marge de 5% pour que le graphique respire
    let mut margin = (max_price - min_price) * 0.05;
    if margin == 0.0 {
        margin = (max_price.abs() * 0.05).max(0.01);
    }
    let y_min = (min_price - margin).max(0.0); // Ne descend pas en dessous de 0
    let y_max = max_price + margin;

    let labels = [y_min, (y_min + y_max) / 2.0, y_max]
        .iter()
        .map(|&v| format!("${}", format_price(v)))
        .collect();

    ([y_min, y_max], labels)
}

/// Calcule (min, max) en un seul passage
fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;

    const DAY: i64 = 24 * 60 * 60;

    fn series(prices: &[(i64, f64)]) -> ChartSeries {
        let points = prices
            .iter()
            .map(|&(secs, price)| {
                PricePoint::new(DateTime::from_timestamp(secs, 0).unwrap(), price).to_chart_point()
            })
            .collect();
        ChartSeries::price_usd(points)
    }

    #[test]
    fn test_one_chart_per_target() {
        let mut surface = TerminalSurface::new();
        let target = RenderTarget::new(1);

        let chart = surface
            .construct(target, series(&[(0, 1.0)]), AxisConfig::price_history())
            .unwrap();
        assert_eq!(surface.live_charts(), 1);

        let busy = surface.construct(target, series(&[(0, 1.0)]), AxisConfig::price_history());
        assert_eq!(busy.unwrap_err(), ChartError::TargetBusy(1));

        surface.destroy(chart);
        assert_eq!(surface.live_charts(), 0);
        assert!(surface
            .construct(target, series(&[(0, 1.0)]), AxisConfig::price_history())
            .is_ok());
    }

    #[test]
    fn test_chart_uses_formatted_values() {
        let mut surface = TerminalSurface::new();
        let chart = surface
            .construct(
                RenderTarget::new(7),
                series(&[(1_000, 100.005), (1_086_400, 101.2)]),
                AxisConfig::price_history(),
            )
            .unwrap();

        assert_eq!(chart.label, "Price (USD)");
        assert_eq!(chart.y_title, "Price in USD");
        assert_eq!(chart.x_title, "Date");
        assert_eq!(chart.points, vec![(1_000.0, 100.01), (1_086_400.0, 101.2)]);
        assert_eq!(chart.target(), RenderTarget::new(7));
    }

    #[test]
    fn test_smooth_keeps_original_points() {
        let points = vec![(0.0, 1.0), (10.0, 5.0), (20.0, 2.0), (30.0, 4.0)];
        let line = smooth(&points, 0.3, 4);

        assert_eq!(line.len(), 4 + 3 * 4);
        for point in &points {
            assert!(line.contains(point));
        }
        // x reste croissant
        assert!(line.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_smooth_without_tension_is_identity() {
        let points = vec![(0.0, 1.0), (10.0, 5.0), (20.0, 2.0)];
        assert_eq!(smooth(&points, 0.0, 4), points);
    }

    #[test]
    fn test_price_history_axis_is_daily() {
        let axes = AxisConfig::price_history();
        assert_eq!(axes.x.unit, TimeUnit::Day);
        assert_eq!(axes.x.unit.seconds(), DAY);
        assert_eq!(axes.x.unit.label_format(), "%d %b");
    }

    #[test]
    fn test_time_ticks_align_on_days() {
        // Du jour 0 à 10h au jour 7 à 9h
        let points = vec![((10 * 3600) as f64, 1.0), ((7 * DAY + 9 * 3600) as f64, 2.0)];
        let (bounds, labels) = time_ticks(&points, TimeUnit::Day);

        assert_eq!(bounds, [0.0, (8 * DAY) as f64]);
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "01 Jan");
        assert_eq!(labels[8], "09 Jan");
    }

    #[test]
    fn test_time_ticks_stride_on_long_series() {
        let points = vec![(0.0, 1.0), ((30 * DAY) as f64, 2.0)];
        let (bounds, labels) = time_ticks(&points, TimeUnit::Day);

        // 30 jours → un label tous les 4 jours, borne étendue à 32 jours
        assert_eq!(bounds, [0.0, (32 * DAY) as f64]);
        assert_eq!(labels.len(), 9);
    }

    #[test]
    fn test_price_ticks_flat_series() {
        let (bounds, labels) = price_ticks(&[(0.0, 100.0), (1.0, 100.0)]);
        assert!(bounds[0] < 100.0 && bounds[1] > 100.0);
        assert_eq!(labels.len(), 3);
    }
}
