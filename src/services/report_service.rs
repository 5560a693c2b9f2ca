//! Reporting over completed orders. The whole requested range is fetched
//! into memory and aggregated with plain functions, so the grouping logic is
//! unit-testable without a database.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::{
    db::DbPool,
    documents,
    dto::reports::{
        DishStat, GroupBy, PaymentMethodBreakdown, PaymentMethodStat, ReportQuery, SummaryReport,
        TimeBucket, TimeSeries, TopDishes,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportOrder {
    pub customer_name: String,
    pub total: i64,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportLine {
    pub dish: String,
    pub category: String,
    pub quantity: i32,
    pub total_price: i64,
}

pub async fn summary(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<SummaryReport>> {
    ensure(user, Capability::ViewReports)?;
    let orders = fetch_orders(&state.pool, query.from, query.to).await?;
    Ok(ApiResponse::success(
        "Summary",
        summarize(&orders),
        Some(Meta::empty()),
    ))
}

pub async fn timeseries(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<TimeSeries>> {
    ensure(user, Capability::ViewReports)?;
    let group_by = query.group_by.unwrap_or(GroupBy::Day);
    let orders = fetch_orders(&state.pool, query.from, query.to).await?;
    Ok(ApiResponse::success(
        "Time series",
        TimeSeries {
            items: bucketize(&orders, group_by),
        },
        Some(Meta::empty()),
    ))
}

pub async fn payment_methods(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<PaymentMethodBreakdown>> {
    ensure(user, Capability::ViewReports)?;
    let orders = fetch_orders(&state.pool, query.from, query.to).await?;
    Ok(ApiResponse::success(
        "Payment methods",
        PaymentMethodBreakdown {
            items: by_payment_method(&orders),
        },
        Some(Meta::empty()),
    ))
}

pub async fn top_dishes(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<TopDishes>> {
    ensure(user, Capability::ViewReports)?;
    let lines = fetch_lines(&state.pool, query.from, query.to).await?;
    Ok(ApiResponse::success(
        "Top dishes",
        TopDishes {
            items: rank_dishes(&lines),
        },
        Some(Meta::empty()),
    ))
}

/// Spreadsheet download of the time-series aggregation.
pub async fn export_csv(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<String> {
    ensure(user, Capability::ViewReports)?;
    let group_by = query.group_by.unwrap_or(GroupBy::Day);
    let orders = fetch_orders(&state.pool, query.from, query.to).await?;
    documents::report_csv(&bucketize(&orders, group_by))
}

/// Printable download of the same time-series aggregation.
pub async fn export_html(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<String> {
    ensure(user, Capability::ViewReports)?;
    let group_by = query.group_by.unwrap_or(GroupBy::Day);
    let orders = fetch_orders(&state.pool, query.from, query.to).await?;
    Ok(documents::report_html(
        &bucketize(&orders, group_by),
        query.from,
        query.to,
    ))
}

async fn fetch_orders(pool: &DbPool, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<ReportOrder>> {
    let (start, end) = range_bounds(from, to)?;
    let rows = sqlx::query_as::<_, ReportOrder>(
        r#"
        SELECT customer_name, total, payment_method, payment_status, created_at
        FROM orders
        WHERE status = 'completed' AND created_at >= $1 AND created_at < $2
        ORDER BY created_at
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_lines(pool: &DbPool, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<ReportLine>> {
    let (start, end) = range_bounds(from, to)?;
    let rows = sqlx::query_as::<_, ReportLine>(
        r#"
        SELECT oi.name AS dish, c.name AS category, oi.quantity, oi.total_price
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN menu_items mi ON mi.id = oi.menu_item_id
        JOIN categories c ON c.id = mi.category_id
        WHERE o.status = 'completed' AND o.created_at >= $1 AND o.created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn range_bounds(from: NaiveDate, to: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    if from > to {
        return Err(AppError::BadRequest("Invalid date range".into()));
    }
    let start = Utc.from_utc_datetime(&from.and_hms_opt(0, 0, 0).unwrap_or_default());
    let end_date = to
        .succ_opt()
        .ok_or_else(|| AppError::BadRequest("Invalid date range".into()))?;
    let end = Utc.from_utc_datetime(&end_date.and_hms_opt(0, 0, 0).unwrap_or_default());
    Ok((start, end))
}

/// Customer identity is just the free-text name, so "identity" means the
/// trimmed lowercase spelling; variants still double-count.
fn customer_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn summarize(orders: &[ReportOrder]) -> SummaryReport {
    let total_revenue: i64 = orders.iter().map(|o| o.total).sum();
    let order_count = orders.len() as i64;
    let average_order_value = if order_count > 0 {
        total_revenue / order_count
    } else {
        0
    };
    let distinct_customers = orders
        .iter()
        .map(|o| customer_key(&o.customer_name))
        .collect::<std::collections::BTreeSet<_>>()
        .len() as i64;
    let outstanding_credit = orders
        .iter()
        .filter(|o| o.payment_status == "credit")
        .map(|o| o.total)
        .sum();
    SummaryReport {
        total_revenue,
        order_count,
        average_order_value,
        distinct_customers,
        outstanding_credit,
    }
}

fn bucket_key(at: &DateTime<Utc>, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Day => at.format("%Y-%m-%d").to_string(),
        GroupBy::Month => at.format("%Y-%m").to_string(),
        GroupBy::Year => at.year().to_string(),
    }
}

pub fn bucketize(orders: &[ReportOrder], group_by: GroupBy) -> Vec<TimeBucket> {
    let mut buckets: BTreeMap<String, (i64, i64, std::collections::BTreeSet<String>)> =
        BTreeMap::new();
    for order in orders {
        let key = bucket_key(&order.created_at, group_by);
        let entry = buckets.entry(key).or_default();
        entry.0 += order.total;
        entry.1 += 1;
        entry.2.insert(customer_key(&order.customer_name));
    }
    buckets
        .into_iter()
        .map(|(bucket, (revenue, order_count, customers))| TimeBucket {
            bucket,
            revenue,
            order_count,
            distinct_customers: customers.len() as i64,
        })
        .collect()
}

pub fn by_payment_method(orders: &[ReportOrder]) -> Vec<PaymentMethodStat> {
    let mut methods: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for order in orders {
        let key = order
            .payment_method
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let entry = methods.entry(key).or_default();
        entry.0 += 1;
        entry.1 += order.total;
    }
    let mut stats: Vec<PaymentMethodStat> = methods
        .into_iter()
        .map(|(method, (order_count, revenue))| PaymentMethodStat {
            method,
            order_count,
            revenue,
        })
        .collect();
    stats.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    stats
}

pub fn rank_dishes(lines: &[ReportLine]) -> Vec<DishStat> {
    let mut dishes: BTreeMap<(String, String), (i64, i64)> = BTreeMap::new();
    for line in lines {
        let entry = dishes
            .entry((line.dish.clone(), line.category.clone()))
            .or_default();
        entry.0 += line.quantity as i64;
        entry.1 += line.total_price;
    }
    let mut stats: Vec<DishStat> = dishes
        .into_iter()
        .map(|((name, category), (quantity, revenue))| DishStat {
            name,
            category,
            quantity,
            revenue,
        })
        .collect();
    stats.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn order(name: &str, total: i64, method: Option<&str>, status: &str, when: &str) -> ReportOrder {
        let created_at =
            NaiveDateTime::parse_from_str(&format!("{when} 12:00:00"), "%Y-%m-%d %H:%M:%S")
                .unwrap()
                .and_utc();
        ReportOrder {
            customer_name: name.into(),
            total,
            payment_method: method.map(Into::into),
            payment_status: status.into(),
            created_at,
        }
    }

    #[test]
    fn summary_counts_and_average() {
        let orders = vec![
            order("Asha", 29_500, Some("cash"), "paid", "2026-08-29"),
            order(" asha ", 10_000, Some("upi"), "paid", "2026-08-29"),
            order("Ravi", 20_000, Some("credit"), "credit", "2026-08-30"),
        ];
        let s = summarize(&orders);
        assert_eq!(s.total_revenue, 59_500);
        assert_eq!(s.order_count, 3);
        assert_eq!(s.average_order_value, 19_833);
        // "Asha" and " asha " normalize to the same customer.
        assert_eq!(s.distinct_customers, 2);
        assert_eq!(s.outstanding_credit, 20_000);
    }

    #[test]
    fn empty_range_gives_zero_summary() {
        let s = summarize(&[]);
        assert_eq!(s.order_count, 0);
        assert_eq!(s.average_order_value, 0);
        assert_eq!(s.distinct_customers, 0);
    }

    #[test]
    fn buckets_by_day_and_month() {
        let orders = vec![
            order("A", 100, Some("cash"), "paid", "2026-08-29"),
            order("B", 200, Some("cash"), "paid", "2026-08-29"),
            order("C", 300, Some("cash"), "paid", "2026-08-30"),
        ];
        let days = bucketize(&orders, GroupBy::Day);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].bucket, "2026-08-29");
        assert_eq!(days[0].revenue, 300);
        assert_eq!(days[0].order_count, 2);
        assert_eq!(days[1].bucket, "2026-08-30");

        let months = bucketize(&orders, GroupBy::Month);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].bucket, "2026-08");
        assert_eq!(months[0].revenue, 600);
    }

    #[test]
    fn payment_breakdown_sorted_by_revenue() {
        let orders = vec![
            order("A", 100, Some("cash"), "paid", "2026-08-29"),
            order("B", 500, Some("upi"), "paid", "2026-08-29"),
            order("C", 200, Some("cash"), "paid", "2026-08-29"),
        ];
        let stats = by_payment_method(&orders);
        assert_eq!(stats[0].method, "upi");
        assert_eq!(stats[0].revenue, 500);
        assert_eq!(stats[1].method, "cash");
        assert_eq!(stats[1].order_count, 2);
        assert_eq!(stats[1].revenue, 300);
    }

    #[test]
    fn dishes_ranked_by_quantity() {
        let lines = vec![
            ReportLine {
                dish: "Dal".into(),
                category: "Mains".into(),
                quantity: 2,
                total_price: 200,
            },
            ReportLine {
                dish: "Naan".into(),
                category: "Breads".into(),
                quantity: 5,
                total_price: 250,
            },
            ReportLine {
                dish: "Dal".into(),
                category: "Mains".into(),
                quantity: 1,
                total_price: 100,
            },
        ];
        let stats = rank_dishes(&lines);
        assert_eq!(stats[0].name, "Naan");
        assert_eq!(stats[0].quantity, 5);
        assert_eq!(stats[1].name, "Dal");
        assert_eq!(stats[1].quantity, 3);
        assert_eq!(stats[1].revenue, 300);
    }
}
