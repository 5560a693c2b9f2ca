use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Day,
    Month,
    Year,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub group_by: Option<GroupBy>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryReport {
    pub total_revenue: i64,
    pub order_count: i64,
    pub average_order_value: i64,
    pub distinct_customers: i64,
    pub outstanding_credit: i64,
}

/// Revenue grouped into one calendar bucket (day, month or year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeBucket {
    pub bucket: String,
    pub revenue: i64,
    pub order_count: i64,
    pub distinct_customers: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSeries {
    pub items: Vec<TimeBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentMethodStat {
    pub method: String,
    pub order_count: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodBreakdown {
    pub items: Vec<PaymentMethodStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DishStat {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopDishes {
    pub items: Vec<DishStat>,
}
