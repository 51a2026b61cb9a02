//! Rule-based late-delivery classification.
//!
//! An order is late when it took more days to ship than were scheduled.
//! There is no model behind this; the rule is applied as-is to uploaded
//! batches, manually entered orders and the demo table.

pub mod batch;
pub mod manual;

pub use batch::{predict_batch, BatchPrediction};
pub use manual::{ManualOrderForm, ManualPrediction};

use crate::models::OrderRecord;

pub const SCHEDULED_COLUMN: &str = "Days for shipment (scheduled)";
pub const REAL_COLUMN: &str = "Days for shipping (real)";
pub const PREDICTED_LATE_COLUMN: &str = "Predicted_Late";
pub const PREDICTED_STATUS_COLUMN: &str = "Predicted_Status";

/// `true` iff the actual shipping duration exceeds the scheduled one.
pub fn predict_late(scheduled: i64, actual: i64) -> bool {
    actual > scheduled
}

/// The same rule over raw uploaded day values. A missing value never
/// counts as late, and neither does a NaN.
pub fn predict_late_raw(scheduled: Option<f64>, actual: Option<f64>) -> bool {
    match (scheduled, actual) {
        (Some(scheduled), Some(actual)) => actual > scheduled,
        _ => false,
    }
}

/// Fixed sample orders shown on the dashboard.
pub fn demo_orders() -> Vec<OrderRecord> {
    let sample = [
        ("101", "Alice", "Smith", "Electronics", "North", "Air", 3, 4),
        ("102", "Bob", "Johnson", "Clothing", "South", "Ground", 5, 4),
        ("103", "Charlie", "Lee", "Furniture", "East", "Air", 4, 5),
        ("104", "David", "Brown", "Electronics", "West", "Ground", 2, 2),
    ];

    sample
        .iter()
        .map(|&(id, fname, lname, category, region, mode, scheduled, real)| OrderRecord {
            order_id: id.to_string(),
            customer_fname: fname.to_string(),
            customer_lname: lname.to_string(),
            category_name: category.to_string(),
            order_region: region.to_string(),
            shipping_mode: mode.to_string(),
            days_scheduled: scheduled,
            days_real: real,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule() {
        assert!(predict_late(3, 4));
        assert!(!predict_late(4, 3));
        assert!(!predict_late(3, 3));
    }

    #[test]
    fn test_rule_matches_comparison() {
        for scheduled in -3..=6 {
            for actual in -3..=6 {
                assert_eq!(predict_late(scheduled, actual), actual > scheduled);
            }
        }
    }

    #[test]
    fn test_raw_rule() {
        assert!(predict_late_raw(Some(3.0), Some(4.5)));
        assert!(!predict_late_raw(Some(4.5), Some(4.5)));
        assert!(!predict_late_raw(None, Some(4.0)));
        assert!(!predict_late_raw(Some(3.0), None));
        assert!(!predict_late_raw(Some(f64::NAN), Some(4.0)));
    }

    #[test]
    fn test_demo_orders() {
        let late: Vec<bool> = demo_orders().iter().map(OrderRecord::predicted_late).collect();
        assert_eq!(late, vec![true, false, true, false]);
    }
}
