//! Loader for the precomputed late-delivery summary tables.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::error::DataUnavailable;
use crate::models::{Dimension, DimensionMetric, MetricRow, MetricTable};

pub const TOTAL_ORDERS: &str = "Total_Orders";
pub const TOTAL_LATE: &str = "Total_Late";
pub const LATE_PERCENT: &str = "Late_Percent";

/// Load the summary table for `dimension` from its configured location.
pub fn load_dimension(
    config: &DashboardConfig,
    dimension: Dimension,
) -> Result<MetricTable, DataUnavailable> {
    let dataset = dimension.dataset_key();
    let path = config
        .resolve(dataset)
        .ok_or_else(|| DataUnavailable::NotConfigured {
            dataset: dataset.to_string(),
        })?;

    match load_table(&path, dimension) {
        Ok(table) => {
            info!(
                "Loaded {} ({} rows) from {}",
                dataset,
                table.rows.len(),
                path.display()
            );
            Ok(table)
        }
        Err(e) => {
            warn!("{}", e);
            Err(e)
        }
    }
}

pub fn load_table(path: &Path, dimension: Dimension) -> Result<MetricTable, DataUnavailable> {
    let file = std::fs::File::open(path).map_err(|source| DataUnavailable::Read {
        dataset: dimension.dataset_key().to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(file, path, dimension)
}

/// Parse a summary table. `path` only labels errors.
pub fn parse_table<R: Read>(
    reader: R,
    path: &Path,
    dimension: Dimension,
) -> Result<MetricTable, DataUnavailable> {
    let dataset = dimension.dataset_key();
    let csv_error = |source: csv::Error| DataUnavailable::Csv {
        dataset: dataset.to_string(),
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let required = [dimension.label_column(), TOTAL_ORDERS, TOTAL_LATE, LATE_PERCENT];
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !columns.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataUnavailable::MissingColumns {
            dataset: dataset.to_string(),
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let index = |name: &str| columns.iter().position(|h| h == name).unwrap_or_default();
    let (label_idx, orders_idx, late_idx, pct_idx) = (
        index(dimension.label_column()),
        index(TOTAL_ORDERS),
        index(TOTAL_LATE),
        index(LATE_PERCENT),
    );

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        // header is line 1
        let row = i + 2;

        let invalid = |column: &str, value: &str| DataUnavailable::InvalidValue {
            dataset: dataset.to_string(),
            path: path.to_path_buf(),
            row,
            column: column.to_string(),
            value: value.to_string(),
        };

        let total_orders = field(&record, orders_idx)
            .parse::<u64>()
            .map_err(|_| invalid(TOTAL_ORDERS, field(&record, orders_idx)))?;
        let total_late = field(&record, late_idx)
            .parse::<u64>()
            .map_err(|_| invalid(TOTAL_LATE, field(&record, late_idx)))?;
        let late_percent = field(&record, pct_idx)
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| invalid(LATE_PERCENT, field(&record, pct_idx)))?;

        if total_late > total_orders {
            return Err(DataUnavailable::InconsistentCounts {
                dataset: dataset.to_string(),
                path: path.to_path_buf(),
                row,
                late: total_late,
                orders: total_orders,
            });
        }

        rows.push(MetricRow {
            metric: DimensionMetric {
                label: field(&record, label_idx).to_string(),
                total_orders,
                total_late,
                late_percent,
            },
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(MetricTable {
        dimension,
        columns,
        rows,
    })
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REGIONS: &str = "\
Order Region,Total_Orders,Total_Late,Late_Percent
North,200,110,55.0
South,100,40,40.0
East,50,30,60.0
";

    fn parse(text: &str, dimension: Dimension) -> Result<MetricTable, DataUnavailable> {
        parse_table(text.as_bytes(), Path::new("test.csv"), dimension)
    }

    #[test]
    fn test_parse_region_table() {
        let table = parse(REGIONS, Dimension::Region).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.columns.len(), 4);

        let north = &table.rows[0];
        assert_eq!(north.metric.label, "North");
        assert_eq!(north.metric.total_orders, 200);
        assert_eq!(north.metric.total_late, 110);
        assert_eq!(north.fields, vec!["North", "200", "110", "55.0"]);
    }

    #[test]
    fn test_late_never_exceeds_orders() {
        let table = parse(REGIONS, Dimension::Region).unwrap();
        let orders: u64 = table.metrics().map(|m| m.total_orders).sum();
        let late: u64 = table.metrics().map(|m| m.total_late).sum();
        assert!(late <= orders);
    }

    #[test]
    fn test_extra_columns_are_kept() {
        let text = ",Shipping Mode,Total_Orders,Total_Late,Late_Percent\n0,Standard Class,10,4,40.0\n";
        let table = parse(text, Dimension::Shipping).unwrap();
        assert_eq!(table.columns[0], "");
        assert_eq!(table.rows[0].metric.label, "Standard Class");
        assert_eq!(table.rows[0].fields.len(), 5);
    }

    #[test]
    fn test_missing_column() {
        let err = parse(REGIONS, Dimension::Category).unwrap_err();
        match err {
            DataUnavailable::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Category Name".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_count() {
        let text = "Order Region,Total_Orders,Total_Late,Late_Percent\nNorth,lots,1,1.0\n";
        let err = parse(text, Dimension::Region).unwrap_err();
        assert!(matches!(
            err,
            DataUnavailable::InvalidValue { row: 2, ref column, .. } if column == TOTAL_ORDERS
        ));
    }

    #[test]
    fn test_late_above_orders_rejected() {
        let text = "Order Region,Total_Orders,Total_Late,Late_Percent\nNorth,5,6,120.0\n";
        let err = parse(text, Dimension::Region).unwrap_err();
        assert!(matches!(err, DataUnavailable::InconsistentCounts { late: 6, orders: 5, .. }));
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("late_per_region.csv")).unwrap();
        file.write_all(REGIONS.as_bytes()).unwrap();

        let config = DashboardConfig::default().with_data_dir(dir.path());
        let table = load_dimension(&config, Dimension::Region).unwrap();
        assert_eq!(table.rows.len(), 3);

        let err = load_dimension(&config, Dimension::Category).unwrap_err();
        assert!(matches!(err, DataUnavailable::Read { .. }));
    }

    #[test]
    fn test_unconfigured_dataset() {
        let mut config = DashboardConfig::default();
        config.datasets.remove("late_per_shipping");
        let err = load_dimension(&config, Dimension::Shipping).unwrap_err();
        assert!(matches!(err, DataUnavailable::NotConfigured { .. }));
    }
}
