//! Shared dashboard logic behind the HTML page and the JSON API.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::{DashboardConfig, FEATURE_IMPORTANCE_DATASET};
use crate::dashboard::{self, DashboardData, Interaction};
use crate::error::{DataUnavailable, FormError, MalformedUpload};
use crate::features::FeatureImportanceView;
use crate::kpi::Kpis;
use crate::models::{Dimension, MetricTable};
use crate::predict::{self, BatchPrediction, ManualOrderForm, ManualPrediction};

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub loaded_at: DateTime<Utc>,
    /// Dataset name to `None` when loaded, or the reason it is unavailable
    pub datasets: BTreeMap<String, Option<String>>,
}

impl HealthReport {
    pub fn all_loaded(&self) -> bool {
        self.datasets.values().all(Option::is_none)
    }
}

pub struct DashboardService {
    config: DashboardConfig,
    data: DashboardData,
}

impl DashboardService {
    /// Load every dataset once. Failures are kept and reported per section.
    pub fn initialize(config: DashboardConfig) -> Self {
        info!("Loading dashboard data from {}", config.data_dir.display());
        let data = DashboardData::load(&config);
        let service = Self { config, data };

        let health = service.health();
        if health.all_loaded() {
            info!("All datasets loaded");
        } else {
            let missing: Vec<&str> = health
                .datasets
                .iter()
                .filter(|(_, reason)| reason.is_some())
                .map(|(name, _)| name.as_str())
                .collect();
            warn!("Dashboard starting without: {}", missing.join(", "));
        }
        service
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn kpis(&self) -> Result<Kpis, &DataUnavailable> {
        self.data.kpis()
    }

    pub fn table(&self, dimension: Dimension) -> Result<&MetricTable, &DataUnavailable> {
        self.data.table(dimension)
    }

    pub fn features(&self) -> &FeatureImportanceView {
        &self.data.features
    }

    pub fn health(&self) -> HealthReport {
        let mut datasets: BTreeMap<String, Option<String>> = Dimension::ALL
            .iter()
            .map(|&d| {
                (
                    d.dataset_key().to_string(),
                    self.data.table(d).err().map(|e| e.to_string()),
                )
            })
            .collect();
        let features = match &self.data.features {
            FeatureImportanceView::Available(_) => None,
            FeatureImportanceView::Unavailable(reason) => Some(reason.clone()),
        };
        datasets.insert(FEATURE_IMPORTANCE_DATASET.to_string(), features);

        HealthReport {
            loaded_at: self.data.loaded_at,
            datasets,
        }
    }

    pub fn predict_upload(&self, bytes: &[u8]) -> Result<BatchPrediction, MalformedUpload> {
        let result = predict::predict_batch(bytes);
        if let Err(e) = &result {
            warn!("Rejected upload of {} bytes: {}", bytes.len(), e);
        }
        result
    }

    pub fn predict_manual(&self, form: &ManualOrderForm) -> Result<ManualPrediction, FormError> {
        let result = form.predict();
        match &result {
            Ok(p) => info!("Manual order {}: {}", p.order.order_id, p.verdict()),
            Err(e) => warn!("Rejected manual order: {}", e),
        }
        result
    }

    pub fn render(&self, interaction: &Interaction) -> String {
        dashboard::render_page(&self.data, interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_reports_each_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("late_per_region.csv"),
            "Order Region,Total_Orders,Total_Late,Late_Percent\nNorth,10,5,50.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("feature_importance.json"),
            r#"[["Days for shipment (scheduled)", 0.5]]"#,
        )
        .unwrap();

        let service = DashboardService::initialize(DashboardConfig::default().with_data_dir(dir.path()));
        let health = service.health();

        assert!(!health.all_loaded());
        assert_eq!(health.datasets.len(), 4);
        assert_eq!(health.datasets["late_per_region"], None);
        assert_eq!(health.datasets[FEATURE_IMPORTANCE_DATASET], None);
        assert!(health.datasets["late_per_category"].is_some());
        assert_eq!(service.kpis().unwrap().total_late, 5);
        assert!(service.features().is_available());
    }
}
