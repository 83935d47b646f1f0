//! Color-domain scaling, palettes and extrusion height for region fills.

use crate::api::{ColorDomain, MetricStats};
use crate::models::ViewMode;

/// Fill alpha for valued regions.
pub const FILL_ALPHA: u8 = 235;

/// Fill of regions outside the allow-list.
pub const OUT_OF_SCOPE_FILL: [u8; 4] = [120, 120, 120, 12];

/// Fill of allow-listed regions without a value in the current frame.
pub const NO_VALUE_FILL: [u8; 4] = [120, 120, 120, 30];

const TURBO_STOPS: [[f64; 3]; 11] = [
    [48.0, 18.0, 59.0],
    [50.0, 82.0, 166.0],
    [33.0, 145.0, 140.0],
    [36.0, 187.0, 112.0],
    [111.0, 216.0, 73.0],
    [191.0, 229.0, 64.0],
    [253.0, 231.0, 37.0],
    [248.0, 170.0, 45.0],
    [239.0, 107.0, 70.0],
    [215.0, 49.0, 90.0],
    [166.0, 1.0, 104.0],
];

pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

fn channel(a: f64, b: f64, t: f64) -> u8 {
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

impl ColorDomain {
    /// Domain used when the metric has no stats at all.
    pub const FALLBACK: ColorDomain = ColorDomain {
        lo: 0.0,
        hi: 1.0,
        mid: 0.5,
    };

    /// Robust domain `[p05, p95]`, widened so that `hi > lo`.
    pub fn from_stats(stats: Option<&MetricStats>) -> Self {
        let Some(s) = stats else {
            return Self::FALLBACK;
        };
        let lo = if s.p05.is_finite() { s.p05 } else { s.min };
        let hi = if s.p95.is_finite() { s.p95 } else { s.max };
        ColorDomain {
            lo,
            hi: hi.max(lo + 1e-9),
            mid: s.p50,
        }
    }

    /// Position of `value` inside the domain, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        clamp01((value - self.lo) / (self.hi - self.lo))
    }
}

/// 11-stop Turbo-like gradient with linear interpolation.
pub fn turbo_rgba(x01: f64, alpha: u8) -> [u8; 4] {
    let x = clamp01(x01);
    let n = TURBO_STOPS.len();
    let p = x * (n - 1) as f64;
    let i = p.floor() as usize;
    let t = p - i as f64;

    let a = TURBO_STOPS[i.min(n - 1)];
    let b = TURBO_STOPS[(i + 1).min(n - 1)];
    [
        channel(a[0], b[0], t),
        channel(a[1], b[1], t),
        channel(a[2], b[2], t),
        alpha,
    ]
}

/// Green -> yellow -> red ramp for error views.
pub fn error_rgba(x01: f64, alpha: u8) -> [u8; 4] {
    let x = clamp01(x01);
    if x <= 0.5 {
        let u = x / 0.5;
        [channel(60.0, 255.0, u), 220, channel(60.0, 40.0, u), alpha]
    } else {
        let u = (x - 0.5) / 0.5;
        [255, channel(220.0, 70.0, u), 40, alpha]
    }
}

/// Palette color of a value under a view mode.
pub fn value_color(domain: &ColorDomain, view: ViewMode, value: f64) -> [u8; 4] {
    let x01 = domain.normalize(value);
    match view {
        ViewMode::AbsError => error_rgba(x01, FILL_ALPHA),
        ViewMode::Actual | ViewMode::Forecast => turbo_rgba(x01, FILL_ALPHA),
    }
}

/// Fill of a region given its scope and current value.
pub fn region_color(
    domain: &ColorDomain,
    view: ViewMode,
    in_scope: bool,
    value: Option<f64>,
) -> [u8; 4] {
    match (in_scope, value) {
        (false, _) => OUT_OF_SCOPE_FILL,
        (true, None) => NO_VALUE_FILL,
        (true, Some(v)) => value_color(domain, view, v),
    }
}

/// Extrusion height: `amp * x01^0.6`, with a lower amplitude for error views.
pub fn elevation(domain: &ColorDomain, view: ViewMode, in_scope: bool, value: Option<f64>) -> f64 {
    let Some(v) = value.filter(|v| in_scope && v.is_finite()) else {
        return 0.0;
    };
    let amp = match view {
        ViewMode::AbsError => 12_000.0,
        ViewMode::Actual | ViewMode::Forecast => 24_000.0,
    };
    amp * domain.normalize(v).powf(0.6)
}
