//! Optional feature-importance ranking produced by the offline pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::{DashboardConfig, FEATURE_IMPORTANCE_DATASET};
use crate::dashboard::escape_html;
use crate::error::DataUnavailable;

pub const UNAVAILABLE_NOTICE: &str = "Feature importance not available. Compute `sorted_features` in the offline pipeline and save it as CSV or JSON.";

// Blues colormap endpoints
const LIGHT: (f64, f64, f64) = (247.0, 251.0, 255.0);
const DARK: (f64, f64, f64) = (8.0, 48.0, 107.0);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureImportance {
    #[serde(alias = "Feature")]
    pub feature: String,
    #[serde(alias = "Importance")]
    pub importance: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFeature {
    Pair(String, f64),
    Named(FeatureImportance),
}

impl From<JsonFeature> for FeatureImportance {
    fn from(f: JsonFeature) -> Self {
        match f {
            JsonFeature::Pair(feature, importance) => FeatureImportance { feature, importance },
            JsonFeature::Named(named) => named,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureImportanceView {
    /// Ranked as produced, highest importance first
    Available(Vec<FeatureImportance>),
    /// Why the artifact could not be used
    Unavailable(String),
}

impl FeatureImportanceView {
    pub fn load(config: &DashboardConfig) -> Self {
        let result = match config.resolve(FEATURE_IMPORTANCE_DATASET) {
            Some(path) => load_feature_importance(&path),
            None => Err(DataUnavailable::NotConfigured {
                dataset: FEATURE_IMPORTANCE_DATASET.to_string(),
            }),
        };

        match result {
            Ok(features) => {
                info!("Loaded {} feature importances", features.len());
                FeatureImportanceView::Available(features)
            }
            Err(e) => {
                warn!("Feature importance unavailable: {}", e);
                FeatureImportanceView::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FeatureImportanceView::Available(_))
    }

    pub fn to_html(&self) -> String {
        match self {
            FeatureImportanceView::Available(features) => render_table(features),
            FeatureImportanceView::Unavailable(_) => {
                format!(r#"<div class="notice info">{}</div>"#, escape_html(UNAVAILABLE_NOTICE))
            }
        }
    }
}

/// Read a ranked list of (feature, importance) pairs. The format follows the
/// file extension: `.json` or `.csv`.
pub fn load_feature_importance(path: &Path) -> Result<Vec<FeatureImportance>, DataUnavailable> {
    let format_error = |reason: String| DataUnavailable::Format {
        dataset: FEATURE_IMPORTANCE_DATASET.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|source| DataUnavailable::Read {
        dataset: FEATURE_IMPORTANCE_DATASET.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let features: Vec<FeatureImportance> = match extension.as_deref() {
        Some("json") => serde_json::from_slice::<Vec<JsonFeature>>(&bytes)
            .map_err(|e| format_error(e.to_string()))?
            .into_iter()
            .map(FeatureImportance::from)
            .collect(),
        Some("csv") => csv::Reader::from_reader(bytes.as_slice())
            .deserialize::<FeatureImportance>()
            .collect::<Result<_, _>>()
            .map_err(|e: csv::Error| format_error(e.to_string()))?,
        other => {
            return Err(format_error(format!(
                "unsupported artifact format {:?}",
                other.unwrap_or("")
            )))
        }
    };

    if features.is_empty() {
        return Err(format_error("no features listed".to_string()));
    }
    if let Some(bad) = features.iter().find(|f| !f.importance.is_finite()) {
        return Err(format_error(format!("non-finite importance for {}", bad.feature)));
    }

    Ok(features)
}

/// Background and text colors for an importance within `[min, max]`.
pub fn shade(importance: f64, min: f64, max: f64) -> (String, &'static str) {
    let t = if max > min {
        ((importance - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    let background = format!(
        "#{:02x}{:02x}{:02x}",
        mix(LIGHT.0, DARK.0),
        mix(LIGHT.1, DARK.1),
        mix(LIGHT.2, DARK.2)
    );
    let text = if t > 0.5 { "#ffffff" } else { "#000000" };
    (background, text)
}

fn render_table(features: &[FeatureImportance]) -> String {
    let min = features.iter().map(|f| f.importance).fold(f64::INFINITY, f64::min);
    let max = features.iter().map(|f| f.importance).fold(f64::NEG_INFINITY, f64::max);

    let mut rows = String::new();
    for (i, f) in features.iter().enumerate() {
        let (background, text) = shade(f.importance, min, max);
        rows.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td style="background:{};color:{}">{:.6}</td></tr>
"#,
            i,
            escape_html(&f.feature),
            background,
            text,
            f.importance
        ));
    }

    format!(
        r#"<table class="data features"><thead><tr><th></th><th>Feature</th><th>Importance</th></tr></thead><tbody>
{}</tbody></table>"#,
        rows
    )
}
