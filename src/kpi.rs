//! Overall delivery KPIs.

use serde::Serialize;

use crate::models::DimensionMetric;

/// Totals and percentages over one population of orders.
///
/// `late_percent` and `on_time_percent` are both `None` when the population
/// is empty, otherwise both are set and sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_orders: u64,
    pub total_late: u64,
    pub total_on_time: u64,
    pub late_percent: Option<f64>,
    pub on_time_percent: Option<f64>,
}

impl Kpis {
    pub fn from_counts(total_orders: u64, total_late: u64) -> Self {
        let total_late = total_late.min(total_orders);
        let (late_percent, on_time_percent) = if total_orders == 0 {
            (None, None)
        } else {
            let late = 100.0 * total_late as f64 / total_orders as f64;
            (Some(late), Some(100.0 - late))
        };

        Self {
            total_orders,
            total_late,
            total_on_time: total_orders - total_late,
            late_percent,
            on_time_percent,
        }
    }

    /// Sum a summary table's Total_Orders and Total_Late columns. Totals
    /// saturate at `u64::MAX`.
    pub fn from_metrics<'a>(rows: impl IntoIterator<Item = &'a DimensionMetric>) -> Self {
        let (orders, late) = rows
            .into_iter()
            .fold((0u64, 0u64), |(orders, late), m| {
                (orders.saturating_add(m.total_orders), late.saturating_add(m.total_late))
            });
        Self::from_counts(orders, late)
    }

    /// Count late flags over individually classified orders.
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        let (orders, late) = flags
            .into_iter()
            .fold((0u64, 0u64), |(orders, late), is_late| {
                (orders.saturating_add(1), late.saturating_add(u64::from(is_late)))
            });
        Self::from_counts(orders, late)
    }

    pub fn has_data(&self) -> bool {
        self.total_orders > 0
    }

    pub fn late_percent_display(&self) -> String {
        format_percent(self.late_percent)
    }

    pub fn on_time_percent_display(&self) -> String {
        format_percent(self.on_time_percent)
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(orders: u64, late: u64) -> DimensionMetric {
        DimensionMetric {
            label: String::new(),
            total_orders: orders,
            total_late: late,
            late_percent: 0.0,
        }
    }

    #[test]
    fn test_aggregate_region_rows() {
        let rows = vec![metric(200, 110), metric(100, 40), metric(50, 30)];
        let kpis = Kpis::from_metrics(&rows);
        assert_eq!(kpis.total_orders, 350);
        assert_eq!(kpis.total_late, 180);
        assert_eq!(kpis.total_on_time, 170);
        assert_eq!(kpis.late_percent_display(), "51.43%");
        assert_eq!(kpis.on_time_percent_display(), "48.57%");
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        for (orders, late) in [(1, 0), (1, 1), (3, 1), (7, 3), (999, 333), (12345, 6789)] {
            let kpis = Kpis::from_counts(orders, late);
            let sum = kpis.late_percent.unwrap() + kpis.on_time_percent.unwrap();
            assert!((sum - 100.0).abs() < 1e-9, "{orders}/{late} summed to {sum}");
        }
    }

    #[test]
    fn test_zero_population() {
        let kpis = Kpis::from_metrics(std::iter::empty());
        assert!(!kpis.has_data());
        assert_eq!(kpis.late_percent, None);
        assert_eq!(kpis.on_time_percent, None);
        assert_eq!(kpis.late_percent_display(), "n/a");
    }

    #[test]
    fn test_huge_totals_saturate() {
        let rows = vec![metric(u64::MAX, u64::MAX / 2), metric(10, 10)];
        let kpis = Kpis::from_metrics(&rows);
        assert_eq!(kpis.total_orders, u64::MAX);
        assert_eq!(kpis.total_late, u64::MAX / 2 + 10);
        assert!(kpis.total_late <= kpis.total_orders);
        assert_eq!(kpis.total_on_time, kpis.total_orders - kpis.total_late);
        let sum = kpis.late_percent.unwrap() + kpis.on_time_percent.unwrap();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_flags() {
        let kpis = Kpis::from_flags([true, false, true, false]);
        assert_eq!(kpis.total_orders, 4);
        assert_eq!(kpis.total_late, 2);
        assert_eq!(kpis.late_percent_display(), "50.00%");
        assert_eq!(kpis.on_time_percent_display(), "50.00%");
    }
}
