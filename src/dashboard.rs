//! Dashboard state and page assembly.
//!
//! `DashboardData::load` is the one-time initialization step: it reads the
//! summary tables and the feature-importance artifact. Every request then
//! renders the whole page from that data plus the outcome of the request's
//! own interaction, if any.

use chrono::{DateTime, Utc};

use crate::chart::BarChart;
use crate::config::DashboardConfig;
use crate::error::{DataUnavailable, FormError, MalformedUpload};
use crate::features::FeatureImportanceView;
use crate::kpi::Kpis;
use crate::metrics;
use crate::models::{Category, Dimension, MetricTable, Region, ShippingMode};
use crate::predict::batch::REQUIRED_COLUMNS;
use crate::predict::manual::MIN_DAYS;
use crate::predict::{
    demo_orders, BatchPrediction, ManualOrderForm, ManualPrediction, PREDICTED_LATE_COLUMN,
};

const TITLE: &str = "Supply Chain Late Delivery Dashboard";

/// Read-only data shared by every request
#[derive(Debug)]
pub struct DashboardData {
    pub region: Result<MetricTable, DataUnavailable>,
    pub category: Result<MetricTable, DataUnavailable>,
    pub shipping: Result<MetricTable, DataUnavailable>,
    pub features: FeatureImportanceView,
    pub loaded_at: DateTime<Utc>,
}

impl DashboardData {
    pub fn load(config: &DashboardConfig) -> Self {
        Self {
            region: metrics::load_dimension(config, Dimension::Region),
            category: metrics::load_dimension(config, Dimension::Category),
            shipping: metrics::load_dimension(config, Dimension::Shipping),
            features: FeatureImportanceView::load(config),
            loaded_at: Utc::now(),
        }
    }

    pub fn table(&self, dimension: Dimension) -> Result<&MetricTable, &DataUnavailable> {
        match dimension {
            Dimension::Region => self.region.as_ref(),
            Dimension::Category => self.category.as_ref(),
            Dimension::Shipping => self.shipping.as_ref(),
        }
    }

    /// Overall KPIs, aggregated from the per-region table.
    pub fn kpis(&self) -> Result<Kpis, &DataUnavailable> {
        self.table(Dimension::Region)
            .map(|table| Kpis::from_metrics(table.metrics()))
    }
}

/// What the current request asked the page to do besides displaying it
#[derive(Debug)]
pub enum Interaction {
    View,
    Upload(Result<BatchPrediction, MalformedUpload>),
    Manual {
        form: ManualOrderForm,
        outcome: Result<ManualPrediction, FormError>,
    },
}

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_page(data: &DashboardData, interaction: &Interaction) -> String {
    let (upload_result, manual_form, manual_result) = match interaction {
        Interaction::View => (None, ManualOrderForm::default(), None),
        Interaction::Upload(outcome) => (Some(outcome), ManualOrderForm::default(), None),
        Interaction::Manual { form, outcome } => (None, form.clone(), Some(outcome)),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
<main>
    <h1 style="color:#0D47A1">{title}</h1>
    <hr style="border:2px solid #87CEEB">
    {kpis}
    {charts}
    <h2>Feature Importance</h2>
    {features}
    {demo}
    {upload}
    {manual}
    <footer>Summary data loaded {loaded_at}</footer>
</main>
</body>
</html>"#,
        title = TITLE,
        css = inline_css(),
        kpis = render_kpis(data),
        charts = render_charts(data),
        features = data.features.to_html(),
        demo = render_demo(),
        upload = render_upload(upload_result),
        manual = render_manual(&manual_form, manual_result),
        loaded_at = data.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn render_kpis(data: &DashboardData) -> String {
    let body = match data.kpis() {
        Ok(kpis) => format!(
            r#"<div class="kpis">
        <div class="kpi"><span class="label">Total Orders</span><span class="value">{}</span></div>
        <div class="kpi"><span class="label">Total Late Deliveries</span><span class="value">{}</span></div>
        <div class="kpi"><span class="label">Late %</span><span class="value">{}</span></div>
        <div class="kpi"><span class="label">On-Time %</span><span class="value">{}</span></div>
    </div>"#,
            kpis.total_orders,
            kpis.total_late,
            kpis.late_percent_display(),
            kpis.on_time_percent_display()
        ),
        Err(e) => unavailable_notice(e),
    };
    format!("<h2>Overall Delivery Metrics</h2>\n    {}", body)
}

fn render_charts(data: &DashboardData) -> String {
    Dimension::ALL
        .iter()
        .map(|&dimension| {
            let body = match data.table(dimension) {
                Ok(table) => match BarChart::for_table(table, "Chart", dimension.bar_color()) {
                    Ok(chart) => chart.to_svg(),
                    Err(e) => format!(
                        r#"<div class="notice error">Chart unavailable: {}</div>"#,
                        escape_html(&e.to_string())
                    ),
                },
                Err(e) => unavailable_notice(e),
            };
            format!(
                "<h2>{}</h2>\n    <div class=\"chart\">{}</div>",
                dimension.heading(),
                body
            )
        })
        .collect::<Vec<_>>()
        .join("\n    ")
}

fn unavailable_notice(e: &DataUnavailable) -> String {
    format!(
        r#"<div class="notice error">Data unavailable: {}</div>"#,
        escape_html(&e.to_string())
    )
}

fn render_table(columns: &[String], rows: impl Iterator<Item = Vec<String>>) -> String {
    let head: String = columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let body: String = rows
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|v| format!("<td>{}</td>", escape_html(v)))
                .collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();
    format!(
        r#"<div class="table-wrap"><table class="data"><thead><tr>{}</tr></thead><tbody>
{}</tbody></table></div>"#,
        head, body
    )
}

fn render_demo() -> String {
    let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.push(PREDICTED_LATE_COLUMN.to_string());

    let rows = demo_orders().into_iter().map(|o| {
        vec![
            o.order_id.clone(),
            o.customer_fname.clone(),
            o.customer_lname.clone(),
            o.category_name.clone(),
            o.order_region.clone(),
            o.shipping_mode.clone(),
            o.days_scheduled.to_string(),
            o.days_real.to_string(),
            u8::from(o.predicted_late()).to_string(),
        ]
    });

    format!(
        "<h2>Sample Orders with Late Delivery Prediction</h2>\n    <h3>Sample Demo Predictions</h3>\n    {}",
        render_table(&columns, rows)
    )
}

fn render_upload(result: Option<&Result<BatchPrediction, MalformedUpload>>) -> String {
    let column_list: String = REQUIRED_COLUMNS
        .iter()
        .map(|c| format!("<li>{}</li>", escape_html(c)))
        .collect();

    let outcome = match result {
        None => String::new(),
        Some(Ok(batch)) => format!(
            "<h3>Uploaded Orders Predictions</h3>\n    {}\n    <p class=\"summary\"><strong>{}</strong></p>",
            render_table(&batch.output_columns(), batch.output_rows()),
            escape_html(&batch.summary_line())
        ),
        Some(Err(e)) => format!(
            r#"<div class="notice error">Error reading uploaded file: {}</div>"#,
            escape_html(&e.to_string())
        ),
    };

    format!(
        r#"<h2>Upload Your Orders to Predict Late Delivery</h2>
    <p>Upload a CSV with the following columns:</p>
    <ul>{column_list}</ul>
    <form action="/upload" method="post" enctype="multipart/form-data">
        <input type="file" name="file" accept=".csv,text/csv" required>
        <button type="submit">Upload CSV of orders</button>
    </form>
    {outcome}"#,
        column_list = column_list,
        outcome = outcome,
    )
}

fn select<T: Copy + PartialEq + std::fmt::Display>(name: &str, options: &[T], selected: T) -> String {
    let opts: String = options
        .iter()
        .map(|o| {
            format!(
                r#"<option value="{v}"{sel}>{v}</option>"#,
                v = o,
                sel = if *o == selected { " selected" } else { "" }
            )
        })
        .collect();
    format!(r#"<select id="{name}" name="{name}">{opts}</select>"#)
}

fn render_manual(
    form: &ManualOrderForm,
    result: Option<&Result<ManualPrediction, FormError>>,
) -> String {
    let outcome = match result {
        None => String::new(),
        Some(Ok(prediction)) => format!(
            r#"<p class="prediction"><strong>Prediction:</strong> {}</p>"#,
            prediction.verdict()
        ),
        Some(Err(e)) => format!(
            r#"<div class="notice error">{}</div>"#,
            escape_html(&e.to_string())
        ),
    };

    format!(
        r#"<h2>Manual Input to Predict Late Delivery</h2>
    <form action="/predict" method="post" class="manual">
        <label for="order_id">Order ID</label><input id="order_id" name="order_id" value="{order_id}">
        <label for="customer_fname">Customer Fname</label><input id="customer_fname" name="customer_fname" value="{fname}">
        <label for="customer_lname">Customer Lname</label><input id="customer_lname" name="customer_lname" value="{lname}">
        <label for="category">Category Name</label>{category}
        <label for="region">Order Region</label>{region}
        <label for="shipping_mode">Shipping Mode</label>{shipping}
        <label for="days_scheduled">Days for shipment (scheduled)</label><input id="days_scheduled" name="days_scheduled" type="number" min="{min}" step="1" value="{scheduled}">
        <label for="days_real">Days for shipping (real)</label><input id="days_real" name="days_real" type="number" min="{min}" step="1" value="{real}">
        <button type="submit">Predict Late Delivery</button>
    </form>
    {outcome}"#,
        order_id = escape_html(&form.order_id),
        fname = escape_html(&form.customer_fname),
        lname = escape_html(&form.customer_lname),
        category = select("category", Category::ALL, form.category),
        region = select("region", Region::ALL, form.region),
        shipping = select("shipping_mode", ShippingMode::ALL, form.shipping_mode),
        min = MIN_DAYS,
        scheduled = form.days_scheduled,
        real = form.days_real,
        outcome = outcome,
    )
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f8fafc; color: #1f2937; }
main { max-width: 1200px; margin: 0 auto; padding: 24px; }
h2 { color: #0D47A1; margin-top: 32px; }
.kpis { display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; }
.kpi { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
.kpi .label { display: block; font-size: 13px; color: #6b7280; }
.kpi .value { display: block; font-size: 28px; font-weight: 600; }
.chart { background: #fff; border-radius: 8px; padding: 8px; }
.bar:hover rect { opacity: 0.8; }
.table-wrap { overflow-x: auto; }
table.data { border-collapse: collapse; background: #fff; font-size: 13px; }
table.data th, table.data td { border: 1px solid #e5e7eb; padding: 4px 8px; text-align: left; }
.notice { padding: 12px 16px; border-radius: 6px; margin: 8px 0; }
.notice.info { background: #e0f2fe; color: #075985; }
.notice.error { background: #fee2e2; color: #991b1b; }
form.manual { display: grid; grid-template-columns: 260px 1fr; gap: 8px; max-width: 640px; }
form.manual button { grid-column: 2; justify-self: start; }
footer { margin-top: 48px; font-size: 12px; color: #9ca3af; }
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::predict_batch;

    fn write_fixtures(dir: &std::path::Path) {
        std::fs::write(
            dir.join("late_per_region.csv"),
            "Order Region,Total_Orders,Total_Late,Late_Percent\nNorth,100,50,50.0\nSouth,100,30,30.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("late_per_category.csv"),
            "Category Name,Total_Orders,Total_Late,Late_Percent\nCleats,40,10,25.0\nGolf,10,9,90.0\n",
        )
        .unwrap();
    }

    fn data() -> (tempfile::TempDir, DashboardData) {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let config = DashboardConfig::default().with_data_dir(dir.path());
        let data = DashboardData::load(&config);
        (dir, data)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_kpis_from_region_table() {
        let (_dir, data) = data();
        let kpis = data.kpis().unwrap();
        assert_eq!(kpis.total_orders, 200);
        assert_eq!(kpis.total_late, 80);
        assert_eq!(kpis.late_percent_display(), "40.00%");
    }

    #[test]
    fn test_missing_table_does_not_abort_page() {
        let (_dir, data) = data();
        assert!(data.table(Dimension::Shipping).is_err());

        let html = render_page(&data, &Interaction::View);
        assert!(html.contains("Late Deliveries by Region"));
        assert!(html.contains("Data unavailable: failed to read late_per_shipping"));
        assert!(html.contains("Feature importance not available"));
        assert!(html.contains("Sample Demo Predictions"));
        assert!(html.contains("Manual Input to Predict Late Delivery"));
    }

    #[test]
    fn test_missing_region_table_replaces_kpis() {
        let dir = tempfile::tempdir().unwrap();
        let data = DashboardData::load(&DashboardConfig::default().with_data_dir(dir.path()));
        assert!(data.kpis().is_err());

        let html = render_page(&data, &Interaction::View);
        assert!(!html.contains("Total Late Deliveries"));
        assert!(html.contains("Data unavailable: failed to read late_per_region"));
    }

    #[test]
    fn test_upload_outcomes_render_inline() {
        let (_dir, data) = data();

        let ok = predict_batch(
            b"Order ID,Customer Fname,Customer Lname,Category Name,Order Region,Shipping Mode,Days for shipment (scheduled),Days for shipping (real)\n1,A,B,C,D,E,3,4\n",
        );
        let html = render_page(&data, &Interaction::Upload(ok));
        assert!(html.contains("Uploaded Orders Predictions"));
        assert!(html.contains("Uploaded Data Metrics: Total Orders: 1, Late: 1, Late %: 100.00%, On-Time %: 0.00%"));

        let err = predict_batch(b"Order ID\n1\n");
        let html = render_page(&data, &Interaction::Upload(err));
        assert!(html.contains("Error reading uploaded file: missing required column(s)"));
        assert!(html.contains("Days for shipping (real)"));
    }

    #[test]
    fn test_manual_outcome_keeps_form_values() {
        let (_dir, data) = data();
        let form = ManualOrderForm {
            customer_fname: "<Jane>".to_string(),
            region: Region::East,
            days_scheduled: 2,
            days_real: 4,
            ..ManualOrderForm::default()
        };
        let outcome = form.predict();
        let html = render_page(&data, &Interaction::Manual { form, outcome });
        assert!(html.contains("<strong>Prediction:</strong> Late Delivery"));
        assert!(html.contains(r#"value="&lt;Jane&gt;""#));
        assert!(html.contains(r#"<option value="East" selected>East</option>"#));
    }

    #[test]
    fn test_demo_table_flags() {
        let html = render_demo();
        assert!(html.contains("<td>101</td>"));
        assert!(html.contains("<th>Predicted_Late</th>"));
    }
}
