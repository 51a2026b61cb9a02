//! Bar charts for the summary tables, rendered as inline SVG.

use crate::dashboard::escape_html;
use crate::error::ChartError;
use crate::metrics::LATE_PERCENT;
use crate::models::MetricTable;

const WIDTH_PER_BAR: f64 = 64.0;
const MIN_WIDTH: f64 = 480.0;
const HEIGHT: f64 = 320.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 96.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Every (column, value) pair of the source row
    pub tooltip: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub color: String,
    pub x_column: String,
    pub y_column: String,
    /// Sorted by value, highest first
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Build a chart from raw tabular data. Bars are ordered by `y_column`
    /// descending; equal values keep their input order.
    pub fn from_columns(
        columns: &[String],
        rows: &[Vec<String>],
        x_column: &str,
        y_column: &str,
        title: &str,
        color: &str,
    ) -> Result<Self, ChartError> {
        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ChartError::MissingColumn(name.to_string()))
        };
        let x_idx = position(x_column)?;
        let y_idx = position(y_column)?;

        let mut bars = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let raw = row.get(y_idx).map(|v| v.trim()).unwrap_or("");
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ChartError::InvalidValue {
                    row: i,
                    column: y_column.to_string(),
                    value: raw.to_string(),
                })?;
            bars.push(Bar {
                label: row.get(x_idx).map(|v| v.trim().to_string()).unwrap_or_default(),
                value,
                tooltip: columns.iter().cloned().zip(row.iter().cloned()).collect(),
            });
        }

        Ok(Self::sorted(title, color, x_column, y_column, bars))
    }

    /// Late percentage by dimension label for a loaded summary table.
    pub fn for_table(table: &MetricTable, title: &str, color: &str) -> Result<Self, ChartError> {
        let rows: Vec<Vec<String>> = table.rows.iter().map(|row| row.fields.clone()).collect();
        Self::from_columns(
            &table.columns,
            &rows,
            table.dimension.label_column(),
            LATE_PERCENT,
            title,
            color,
        )
    }

    fn sorted(title: &str, color: &str, x_column: &str, y_column: &str, mut bars: Vec<Bar>) -> Self {
        bars.sort_by(|a, b| b.value.total_cmp(&a.value));
        Self {
            title: title.to_string(),
            color: color.to_string(),
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            bars,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.bars.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn to_svg(&self) -> String {
        let width = (self.bars.len() as f64 * WIDTH_PER_BAR + MARGIN_LEFT + MARGIN_RIGHT).max(MIN_WIDTH);
        let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_height;

        let max_value = self
            .bars
            .iter()
            .map(|b| b.value)
            .fold(0.0_f64, f64::max);
        let scale = if max_value > 0.0 { plot_height / max_value } else { 0.0 };
        let slot = if self.bars.is_empty() {
            plot_width
        } else {
            plot_width / self.bars.len() as f64
        };

        let mut bars = String::new();
        for (i, bar) in self.bars.iter().enumerate() {
            let x = MARGIN_LEFT + i as f64 * slot + slot * 0.1;
            let bar_height = bar.value.max(0.0) * scale;
            let y = baseline - bar_height;
            let tooltip: Vec<String> = bar
                .tooltip
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let label_x = x + slot * 0.4;

            bars.push_str(&format!(
                r##"<g class="bar"><title>{tooltip}</title><rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{color}"/></g>
<text x="{lx:.1}" y="{ly:.1}" text-anchor="end" font-size="11" fill="#374151" transform="rotate(-40, {lx:.1}, {ly:.1})">{label}</text>
"##,
                tooltip = escape_html(&tooltip.join("\n")),
                x = x,
                y = y,
                w = slot * 0.8,
                h = bar_height,
                color = escape_html(&self.color),
                lx = label_x,
                ly = baseline + 14.0,
                label = escape_html(&bar.label),
            ));
        }

        let mut ticks = String::new();
        for step in 0..=4 {
            let value = max_value * step as f64 / 4.0;
            let y = baseline - value * scale;
            ticks.push_str(&format!(
                r##"<line x1="{x1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#e5e7eb" stroke-width="1"/><text x="{tx}" y="{ty:.1}" text-anchor="end" font-size="10" fill="#6b7280">{value:.1}</text>
"##,
                x1 = MARGIN_LEFT,
                x2 = width - MARGIN_RIGHT,
                y = y,
                tx = MARGIN_LEFT - 6.0,
                ty = y + 3.0,
                value = value,
            ));
        }

        format!(
            r##"<svg class="bar-chart" viewBox="0 0 {width:.0} {height:.0}" width="100%" preserveAspectRatio="xMinYMin meet" role="img">
<text x="{mx}" y="22" font-size="14" font-weight="600" fill="#0D47A1">{title}</text>
{ticks}{bars}<line x1="{mx}" y1="{baseline:.1}" x2="{x2:.1}" y2="{baseline:.1}" stroke="#9ca3af" stroke-width="1"/>
<text x="14" y="{mid:.1}" text-anchor="middle" font-size="11" fill="#6b7280" transform="rotate(-90, 14, {mid:.1})">{y_column}</text>
</svg>"##,
            width = width,
            height = HEIGHT,
            mx = MARGIN_LEFT,
            title = escape_html(&self.title),
            ticks = ticks,
            bars = bars,
            baseline = baseline,
            x2 = width - MARGIN_RIGHT,
            mid = MARGIN_TOP + plot_height / 2.0,
            y_column = escape_html(&self.y_column),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, DimensionMetric, MetricRow};

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rows(data: &[(&str, &str)]) -> Vec<Vec<String>> {
        data.iter()
            .map(|(label, value)| vec![label.to_string(), value.to_string()])
            .collect()
    }

    fn metric_row(label: &str, pct: f64) -> MetricRow {
        MetricRow {
            metric: DimensionMetric {
                label: label.to_string(),
                total_orders: 100,
                total_late: pct as u64,
                late_percent: pct,
            },
            fields: vec![
                label.to_string(),
                "100".to_string(),
                (pct as u64).to_string(),
                pct.to_string(),
            ],
        }
    }

    fn shipping_table(rows: Vec<MetricRow>) -> MetricTable {
        MetricTable {
            dimension: Dimension::Shipping,
            columns: columns(&["Shipping Mode", "Total_Orders", "Total_Late", "Late_Percent"]),
            rows,
        }
    }

    #[test]
    fn test_bars_sorted_descending() {
        let table = shipping_table(vec![
            metric_row("A", 10.0),
            metric_row("B", 30.0),
            metric_row("C", 20.0),
        ]);
        let chart = BarChart::for_table(&table, "Chart", "#87CEEB").unwrap();
        assert_eq!(chart.labels(), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let chart = BarChart::from_columns(
            &columns(&["Name", "Value"]),
            &rows(&[("A", "5"), ("B", "9"), ("C", "5")]),
            "Name",
            "Value",
            "Chart",
            "#000",
        )
        .unwrap();
        assert_eq!(chart.labels(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_tooltip_exposes_every_column() {
        let chart = BarChart::from_columns(
            &columns(&["Name", "Value"]),
            &rows(&[("A", "10")]),
            "Name",
            "Value",
            "Chart",
            "#000",
        )
        .unwrap();
        assert_eq!(
            chart.bars[0].tooltip,
            vec![
                ("Name".to_string(), "A".to_string()),
                ("Value".to_string(), "10".to_string())
            ]
        );
        let svg = chart.to_svg();
        assert!(svg.contains("<title>Name: A\nValue: 10</title>"));
    }

    #[test]
    fn test_missing_and_invalid_columns() {
        let cols = columns(&["Name", "Value"]);
        let err = BarChart::from_columns(&cols, &rows(&[("A", "1")]), "Name", "Late", "t", "c")
            .unwrap_err();
        assert_eq!(err, ChartError::MissingColumn("Late".to_string()));

        let err = BarChart::from_columns(&cols, &rows(&[("A", "x")]), "Name", "Value", "t", "c")
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn test_chart_for_metric_table() {
        let table = shipping_table(vec![
            metric_row("Same Day", 45.0),
            metric_row("First Class", 95.0),
            metric_row("Standard Class", 38.0),
        ]);

        let chart = BarChart::for_table(&table, "Late Deliveries by Shipping Mode", "#1E90FF").unwrap();
        assert_eq!(chart.labels(), vec!["First Class", "Same Day", "Standard Class"]);
        assert_eq!(chart.x_column, "Shipping Mode");
        assert_eq!(chart.bars[0].tooltip.len(), 4);
        assert_eq!(chart.bars[0].value, 95.0);

        let svg = chart.to_svg();
        assert!(svg.contains("fill=\"#1E90FF\""));
        assert!(svg.contains("Late Deliveries by Shipping Mode"));
    }

    #[test]
    fn test_table_chart_uses_row_fields() {
        let mut row = metric_row("Same Day", 45.0);
        row.fields[0] = " Same Day ".to_string();
        let table = MetricTable {
            dimension: Dimension::Shipping,
            columns: columns(&["Shipping Mode", "Total_Orders", "Total_Late"]),
            rows: vec![row],
        };
        let err = BarChart::for_table(&table, "t", "c").unwrap_err();
        assert_eq!(err, ChartError::MissingColumn("Late_Percent".to_string()));

        let mut row = metric_row("Same Day", 45.0);
        row.fields[0] = " Same Day ".to_string();
        let chart = BarChart::for_table(&shipping_table(vec![row]), "t", "c").unwrap();
        assert_eq!(chart.labels(), vec!["Same Day"]);
        assert_eq!(chart.bars[0].tooltip[0].1, " Same Day ");
    }

    #[test]
    fn test_empty_chart_renders() {
        let chart = BarChart::from_columns(&columns(&["Name", "Value"]), &[], "Name", "Value", "Empty", "#000")
            .unwrap();
        assert!(chart.bars.is_empty());
        assert!(chart.to_svg().starts_with("<svg"));
    }
}
