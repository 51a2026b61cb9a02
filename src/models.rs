use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical axis a summary table is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Region,
    Category,
    Shipping,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Region, Dimension::Category, Dimension::Shipping];

    /// Label column of the summary table
    pub fn label_column(self) -> &'static str {
        match self {
            Dimension::Region => "Order Region",
            Dimension::Category => "Category Name",
            Dimension::Shipping => "Shipping Mode",
        }
    }

    /// Logical dataset name used in configuration
    pub fn dataset_key(self) -> &'static str {
        match self {
            Dimension::Region => "late_per_region",
            Dimension::Category => "late_per_category",
            Dimension::Shipping => "late_per_shipping",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Dimension::Region => "Late Deliveries by Region",
            Dimension::Category => "Late Deliveries by Category",
            Dimension::Shipping => "Late Deliveries by Shipping Mode",
        }
    }

    pub fn bar_color(self) -> &'static str {
        match self {
            Dimension::Region => "#87CEEB",
            Dimension::Category => "#0D47A1",
            Dimension::Shipping => "#1E90FF",
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "region" => Ok(Dimension::Region),
            "category" => Ok(Dimension::Category),
            "shipping" | "shipping_mode" => Ok(Dimension::Shipping),
            other => Err(format!(
                "unknown dimension '{}'. Valid: region, category, shipping",
                other
            )),
        }
    }
}

/// One row of a per-dimension late-delivery summary
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DimensionMetric {
    pub label: String,
    pub total_orders: u64,
    pub total_late: u64,
    pub late_percent: f64,
}

/// Loaded summary table. Keeps every source column so tooltips can show the
/// full row.
#[derive(Debug, Clone)]
pub struct MetricTable {
    pub dimension: Dimension,
    pub columns: Vec<String>,
    pub rows: Vec<MetricRow>,
}

#[derive(Debug, Clone)]
pub struct MetricRow {
    pub metric: DimensionMetric,
    /// Raw values aligned with `MetricTable::columns`
    pub fields: Vec<String>,
}

impl MetricTable {
    pub fn metrics(&self) -> impl Iterator<Item = &DimensionMetric> {
        self.rows.iter().map(|r| &r.metric)
    }

    /// Rows sorted by late percentage, highest first
    pub fn sorted_by_late_percent(&self) -> Vec<&DimensionMetric> {
        let mut metrics: Vec<&DimensionMetric> = self.metrics().collect();
        metrics.sort_by(|a, b| b.late_percent.total_cmp(&a.late_percent));
        metrics
    }
}

/// Delivery verdict of the classification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    Late,
    #[serde(rename = "On-Time")]
    OnTime,
}

impl DeliveryStatus {
    pub fn from_late(late: bool) -> Self {
        if late {
            DeliveryStatus::Late
        } else {
            DeliveryStatus::OnTime
        }
    }

    pub fn is_late(self) -> bool {
        self == DeliveryStatus::Late
    }

    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Late => "Late",
            DeliveryStatus::OnTime => "On-Time",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            DeliveryStatus::Late => "Late Delivery",
            DeliveryStatus::OnTime => "On-Time Delivery",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order as uploaded or entered by hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    #[serde(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Customer Fname")]
    pub customer_fname: String,
    #[serde(rename = "Customer Lname")]
    pub customer_lname: String,
    #[serde(rename = "Category Name")]
    pub category_name: String,
    #[serde(rename = "Order Region")]
    pub order_region: String,
    #[serde(rename = "Shipping Mode")]
    pub shipping_mode: String,
    #[serde(rename = "Days for shipment (scheduled)")]
    pub days_scheduled: i64,
    #[serde(rename = "Days for shipping (real)")]
    pub days_real: i64,
}

impl OrderRecord {
    pub fn predicted_late(&self) -> bool {
        crate::predict::predict_late(self.days_scheduled, self.days_real)
    }

    pub fn status(&self) -> DeliveryStatus {
        DeliveryStatus::from_late(self.predicted_late())
    }
}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum!(
    /// Product categories offered by the manual form
    Category { Electronics, Clothing, Furniture }
);

choice_enum!(
    /// Order regions offered by the manual form
    Region { North, South, East, West }
);

choice_enum!(
    /// Shipping modes offered by the manual form
    ShippingMode { Air, Ground, Sea }
);
