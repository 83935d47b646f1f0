//! User-selectable parameters: view mode, forecasting model and playback speed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which quantity the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Actual,
    Forecast,
    AbsError,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Actual, ViewMode::Forecast, ViewMode::AbsError];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Actual => "actual",
            ViewMode::Forecast => "forecast",
            ViewMode::AbsError => "abs_error",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "actual" => Ok(ViewMode::Actual),
            "forecast" => Ok(ViewMode::Forecast),
            "abs_error" => Ok(ViewMode::AbsError),
            other => Err(format!(
                "Unknown view mode '{}'. Use actual, forecast or abs_error.",
                other
            )),
        }
    }
}

/// Forecasting model whose columns are read.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    #[default]
    Sarimax,
    Lgbm,
    Lstm,
}

impl ModelKey {
    pub const ALL: [ModelKey; 3] = [ModelKey::Sarimax, ModelKey::Lgbm, ModelKey::Lstm];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::Sarimax => "sarimax",
            ModelKey::Lgbm => "lgbm",
            ModelKey::Lstm => "lstm",
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sarimax" => Ok(ModelKey::Sarimax),
            "lgbm" => Ok(ModelKey::Lgbm),
            "lstm" => Ok(ModelKey::Lstm),
            other => Err(format!(
                "Unknown model '{}'. Use sarimax, lgbm or lstm.",
                other
            )),
        }
    }
}

/// Play-loop tick interval presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaySpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl PlaySpeed {
    pub fn interval(&self) -> Duration {
        match self {
            PlaySpeed::Slow => Duration::from_millis(700),
            PlaySpeed::Normal => Duration::from_millis(380),
            PlaySpeed::Fast => Duration::from_millis(180),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("actual".parse::<ViewMode>(), Ok(ViewMode::Actual));
        assert_eq!(" ABS_ERROR ".parse::<ViewMode>(), Ok(ViewMode::AbsError));
        assert!("error".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_model_key_roundtrip_str() {
        for model in ModelKey::ALL {
            assert_eq!(model.as_str().parse::<ModelKey>(), Ok(model));
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ViewMode::AbsError).unwrap(),
            "\"abs_error\""
        );
        assert_eq!(serde_json::to_string(&ModelKey::Lgbm).unwrap(), "\"lgbm\"");
        assert_eq!(serde_json::to_string(&PlaySpeed::Fast).unwrap(), "\"Fast\"");
    }

    #[test]
    fn test_play_speed_intervals() {
        assert_eq!(PlaySpeed::Slow.interval(), Duration::from_millis(700));
        assert_eq!(PlaySpeed::default().interval(), Duration::from_millis(380));
        assert_eq!(PlaySpeed::Fast.interval(), Duration::from_millis(180));
    }
}
