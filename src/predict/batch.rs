//! Classification of uploaded order files.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;
use std::io::Write;
use tracing::info;

use super::{predict_late_raw, PREDICTED_LATE_COLUMN, PREDICTED_STATUS_COLUMN, REAL_COLUMN, SCHEDULED_COLUMN};
use crate::error::MalformedUpload;
use crate::kpi::Kpis;
use crate::models::DeliveryStatus;

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Order ID",
    "Customer Fname",
    "Customer Lname",
    "Category Name",
    "Order Region",
    "Shipping Mode",
    SCHEDULED_COLUMN,
    REAL_COLUMN,
];

#[derive(Debug, Clone)]
pub struct AnnotatedOrder {
    /// Raw values aligned with `BatchPrediction::columns`
    pub fields: Vec<String>,
    /// `None` for a blank cell
    pub days_scheduled: Option<f64>,
    pub days_real: Option<f64>,
    pub status: DeliveryStatus,
}

impl AnnotatedOrder {
    pub fn predicted_late(&self) -> bool {
        self.status.is_late()
    }
}

/// Uploaded orders with their predictions and KPIs
#[derive(Debug, Clone)]
pub struct BatchPrediction {
    pub columns: Vec<String>,
    pub orders: Vec<AnnotatedOrder>,
    pub kpis: Kpis,
}

impl BatchPrediction {
    /// Upload columns followed by the two derived columns
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns = self.columns.clone();
        columns.push(PREDICTED_LATE_COLUMN.to_string());
        columns.push(PREDICTED_STATUS_COLUMN.to_string());
        columns
    }

    pub fn output_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.orders.iter().map(|o| {
            let mut row = o.fields.clone();
            row.push(u8::from(o.predicted_late()).to_string());
            row.push(o.status.label().to_string());
            row
        })
    }

    pub fn statuses(&self) -> Vec<DeliveryStatus> {
        self.orders.iter().map(|o| o.status).collect()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Uploaded Data Metrics: Total Orders: {}, Late: {}, Late %: {}, On-Time %: {}",
            self.kpis.total_orders,
            self.kpis.total_late,
            self.kpis.late_percent_display(),
            self.kpis.on_time_percent_display()
        )
    }

    /// Write the annotated table as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.output_columns())?;
        for row in self.output_rows() {
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Decode upload bytes. Valid UTF-8 is used as-is; anything else is read as
/// Latin-1, which maps every byte to a char and never fails.
pub fn decode_upload(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Classify every order of an uploaded CSV file.
pub fn predict_batch(bytes: &[u8]) -> Result<BatchPrediction, MalformedUpload> {
    let text = decode_upload(bytes);
    if text.trim().is_empty() {
        return Err(MalformedUpload::Empty);
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MalformedUpload::MissingColumns(missing));
    }

    let index: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|c| columns.iter().position(|h| h == c))
        .collect();

    let mut orders = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 2;
        let days_scheduled = parse_days(&record, index[6], row, SCHEDULED_COLUMN)?;
        let days_real = parse_days(&record, index[7], row, REAL_COLUMN)?;
        let status = DeliveryStatus::from_late(predict_late_raw(days_scheduled, days_real));

        orders.push(AnnotatedOrder {
            fields: record.iter().map(str::to_string).collect(),
            days_scheduled,
            days_real,
            status,
        });
    }

    let kpis = Kpis::from_flags(orders.iter().map(AnnotatedOrder::predicted_late));
    info!(
        "Classified {} uploaded orders: {} late ({})",
        kpis.total_orders,
        kpis.total_late,
        kpis.late_percent_display()
    );

    Ok(BatchPrediction {
        columns,
        orders,
        kpis,
    })
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

/// Day counts are compared numerically, so `3.0` and `4.5` are accepted.
/// A blank cell is a missing value; only non-numeric text is rejected.
fn parse_days(
    record: &StringRecord,
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<Option<f64>, MalformedUpload> {
    let raw = field(record, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| MalformedUpload::InvalidDays {
            row,
            column,
            value: raw.to_string(),
        })
}
