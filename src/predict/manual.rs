//! Single-order prediction from the manual input form.

use serde::{Deserialize, Serialize};

use super::{REAL_COLUMN, SCHEDULED_COLUMN};
use crate::error::FormError;
use crate::models::{Category, DeliveryStatus, OrderRecord, Region, ShippingMode};

pub const MIN_DAYS: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualOrderForm {
    pub order_id: String,
    pub customer_fname: String,
    pub customer_lname: String,
    pub category: Category,
    pub region: Region,
    pub shipping_mode: ShippingMode,
    pub days_scheduled: i64,
    pub days_real: i64,
}

impl Default for ManualOrderForm {
    fn default() -> Self {
        Self {
            order_id: "105".to_string(),
            customer_fname: "John".to_string(),
            customer_lname: "Doe".to_string(),
            category: Category::Electronics,
            region: Region::North,
            shipping_mode: ShippingMode::Air,
            days_scheduled: 3,
            days_real: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualPrediction {
    pub order: OrderRecord,
    pub status: DeliveryStatus,
}

impl ManualPrediction {
    pub fn verdict(&self) -> &'static str {
        self.status.verdict()
    }
}

impl ManualOrderForm {
    /// Only the day counts are checked; everything else is free text or a
    /// fixed choice.
    pub fn validate(&self) -> Result<(), FormError> {
        for (field, value) in [
            (SCHEDULED_COLUMN, self.days_scheduled),
            (REAL_COLUMN, self.days_real),
        ] {
            if value < MIN_DAYS {
                return Err(FormError::BelowMinimum {
                    field,
                    min: MIN_DAYS,
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn to_order(&self) -> OrderRecord {
        OrderRecord {
            order_id: self.order_id.clone(),
            customer_fname: self.customer_fname.clone(),
            customer_lname: self.customer_lname.clone(),
            category_name: self.category.to_string(),
            order_region: self.region.to_string(),
            shipping_mode: self.shipping_mode.to_string(),
            days_scheduled: self.days_scheduled,
            days_real: self.days_real,
        }
    }

    pub fn predict(&self) -> Result<ManualPrediction, FormError> {
        self.validate()?;
        let order = self.to_order();
        let status = order.status();
        Ok(ManualPrediction { order, status })
    }
}
