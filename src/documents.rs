//! Generated artifacts: printable bill, kitchen-ticket and sales-report HTML,
//! the UPI deep-link URI with its QR image, and CSV report export. All of
//! these are rendered on demand and never persisted.

use chrono::NaiveDate;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::dto::reports::TimeBucket;
use crate::entity::{order_items, orders, restaurant_settings};
use crate::error::{AppError, AppResult};
use crate::money::format_minor;

/// Build a `upi://pay` deep link for the given amount in minor units.
pub fn upi_uri(vpa: &str, payee_name: &str, amount: i64, note: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}",
        encode_component(vpa),
        encode_component(payee_name),
        format_minor(amount),
        encode_component(note),
    )
}

/// Render arbitrary data as a QR code SVG document.
pub fn qr_svg(data: &str) -> AppResult<String> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("qr encode failed: {e}")))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build();
    Ok(image)
}

// Minimal percent-encoding for the URI query values we produce.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Printable customer bill. The tax line is shown as two equal GST halves
/// (SGST + CGST), which is presentation only; the stored tax is a single
/// amount.
pub fn bill_html(
    order: &orders::Model,
    items: &[order_items::Model],
    settings: &restaurant_settings::Model,
    table_number: i32,
) -> String {
    let mut rows = String::new();
    for item in items {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&item.name),
            item.quantity,
            format_minor(item.unit_price),
            format_minor(item.total_price),
        ));
    }

    let half_tax = order.tax / 2;
    // Odd paise goes to the CGST half so the halves still sum to the tax.
    let other_half = order.tax - half_tax;

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Bill {order_number}</title>
<style>body{{font-family:monospace;max-width:320px;margin:auto}}table{{width:100%}}td{{padding:2px}}.right{{text-align:right}}</style>
</head>
<body>
<h2>{name}</h2>
<p>{address}<br>{phone}<br>GSTIN: {gstin}</p>
<hr>
<p>Bill No: {order_number}<br>Table: {table_number}<br>Guest: {customer}<br>Date: {date}</p>
<hr>
<table>
<tr><th>Item</th><th>Qty</th><th>Rate</th><th>Amount</th></tr>
{rows}
</table>
<hr>
<table>
<tr><td>Subtotal</td><td class="right">{subtotal}</td></tr>
<tr><td>SGST</td><td class="right">{sgst}</td></tr>
<tr><td>CGST</td><td class="right">{cgst}</td></tr>
<tr><td><b>Total</b></td><td class="right"><b>{total}</b></td></tr>
</table>
<hr>
<p>Thank you, visit again!</p>
</body>
</html>
"#,
        order_number = escape_html(&order.order_number),
        name = escape_html(&settings.restaurant_name),
        address = escape_html(&settings.address),
        phone = escape_html(&settings.phone),
        gstin = escape_html(&settings.gstin),
        table_number = table_number,
        customer = escape_html(&order.customer_name),
        date = order.created_at.format("%d-%m-%Y %H:%M"),
        rows = rows,
        subtotal = format_minor(order.subtotal),
        sgst = format_minor(half_tax),
        cgst = format_minor(other_half),
        total = format_minor(order.total),
    )
}

/// Kitchen order ticket: items, quantities and notes only, no prices.
pub fn kot_html(order: &orders::Model, items: &[order_items::Model], table_number: i32) -> String {
    let mut rows = String::new();
    for item in items {
        let note = item
            .note
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|n| format!("<br><small>{}</small>", escape_html(n)))
            .unwrap_or_default();
        rows.push_str(&format!(
            "<tr><td>{}{}</td><td>{}</td></tr>\n",
            escape_html(&item.name),
            note,
            item.quantity,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>KOT {order_number}</title>
<style>body{{font-family:monospace;max-width:280px;margin:auto}}table{{width:100%}}</style>
</head>
<body>
<h3>KITCHEN ORDER TICKET</h3>
<p>Order: {order_number}<br>Table: {table_number}<br>Time: {time}</p>
<hr>
<table>
<tr><th>Item</th><th>Qty</th></tr>
{rows}
</table>
</body>
</html>
"#,
        order_number = escape_html(&order.order_number),
        table_number = table_number,
        time = order.created_at.format("%H:%M"),
        rows = rows,
    )
}

/// Spreadsheet export of the report time series.
pub fn report_csv(rows: &[TimeBucket]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["bucket", "revenue", "order_count", "distinct_customers"])
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    for row in rows {
        writer
            .write_record([
                row.bucket.clone(),
                format_minor(row.revenue),
                row.order_count.to_string(),
                row.distinct_customers.to_string(),
            ])
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

/// Printable sales report: the same time-series rows as the CSV export,
/// rendered as a static document with a totals line.
pub fn report_html(rows: &[TimeBucket], from: NaiveDate, to: NaiveDate) -> String {
    let mut body = String::new();
    for row in rows {
        body.push_str(&format!(
            "<tr><td>{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td></tr>\n",
            escape_html(&row.bucket),
            format_minor(row.revenue),
            row.order_count,
            row.distinct_customers,
        ));
    }
    let total_revenue: i64 = rows.iter().map(|r| r.revenue).sum();
    let total_orders: i64 = rows.iter().map(|r| r.order_count).sum();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Sales Report {from} to {to}</title>
<style>body{{font-family:monospace;max-width:480px;margin:auto}}table{{width:100%}}td,th{{padding:2px}}.right{{text-align:right}}</style>
</head>
<body>
<h3>SALES REPORT</h3>
<p>Period: {from} to {to}</p>
<hr>
<table>
<tr><th>Period</th><th class="right">Revenue</th><th class="right">Orders</th><th class="right">Guests</th></tr>
{body}
</table>
<hr>
<table>
<tr><td><b>Total</b></td><td class="right"><b>{total_revenue}</b></td></tr>
<tr><td>Orders</td><td class="right">{total_orders}</td></tr>
</table>
</body>
</html>
"#,
        from = from.format("%Y-%m-%d"),
        to = to.format("%Y-%m-%d"),
        body = body,
        total_revenue = format_minor(total_revenue),
        total_orders = total_orders,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_order() -> orders::Model {
        orders::Model {
            id: Uuid::new_v4(),
            order_number: "ORD-20260830-ab12cd34".into(),
            table_id: Uuid::new_v4(),
            customer_name: "Asha".into(),
            guest_count: 2,
            subtotal: 25_000,
            tax: 4_500,
            total: 29_500,
            status: "serving".into(),
            source: "staff".into(),
            payment_method: None,
            payment_status: "pending".into(),
            credit_room_number: None,
            credit_guest_name: None,
            created_by: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            completed_at: None,
        }
    }

    fn sample_items(order_id: Uuid) -> Vec<order_items::Model> {
        vec![order_items::Model {
            id: Uuid::new_v4(),
            order_id,
            menu_item_id: Uuid::new_v4(),
            name: "Paneer Tikka".into(),
            quantity: 2,
            unit_price: 10_000,
            total_price: 20_000,
            note: Some("extra spicy".into()),
            prepared: false,
            prepared_at: None,
            created_at: Utc::now().into(),
        }]
    }

    fn sample_settings() -> restaurant_settings::Model {
        restaurant_settings::Model {
            id: Uuid::new_v4(),
            restaurant_name: "Spice Route".into(),
            address: "12 MG Road".into(),
            phone: "080-1234".into(),
            gstin: "29AAAAA0000A1Z5".into(),
            tax_rate_bps: 1800,
            service_charge_bps: 0,
            currency: "INR".into(),
            upi_vpa: "spiceroute@upi".into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn upi_uri_carries_amount_and_vpa() {
        let uri = upi_uri("spiceroute@upi", "Spice Route", 29_500, "Bill ORD-1");
        assert!(uri.starts_with("upi://pay?pa=spiceroute@upi"));
        assert!(uri.contains("&am=295.00"));
        assert!(uri.contains("&cu=INR"));
        assert!(uri.contains("&pn=Spice%20Route"));
        assert!(uri.contains("&tn=Bill%20ORD-1"));
    }

    #[test]
    fn qr_svg_renders() {
        let svg = qr_svg("upi://pay?pa=x@upi&am=10.00&cu=INR").unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn bill_splits_tax_into_equal_gst_halves() {
        let order = sample_order();
        let items = sample_items(order.id);
        let html = bill_html(&order, &items, &sample_settings(), 7);
        assert!(html.contains("SGST"));
        assert!(html.contains("CGST"));
        // 45.00 tax -> 22.50 + 22.50
        assert_eq!(html.matches("22.50").count(), 2);
        assert!(html.contains("295.00"));
        assert!(html.contains("Paneer Tikka"));
    }

    #[test]
    fn kot_has_notes_but_no_prices() {
        let order = sample_order();
        let items = sample_items(order.id);
        let html = kot_html(&order, &items, 7);
        assert!(html.contains("extra spicy"));
        assert!(!html.contains("200.00"));
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let rows = vec![TimeBucket {
            bucket: "2026-08-30".into(),
            revenue: 29_500,
            order_count: 1,
            distinct_customers: 1,
        }];
        let csv = report_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "bucket,revenue,order_count,distinct_customers"
        );
        assert_eq!(lines.next().unwrap(), "2026-08-30,295.00,1,1");
    }

    #[test]
    fn html_export_lists_buckets_and_totals() {
        let rows = vec![
            TimeBucket {
                bucket: "2026-08-29".into(),
                revenue: 10_000,
                order_count: 1,
                distinct_customers: 1,
            },
            TimeBucket {
                bucket: "2026-08-30".into(),
                revenue: 29_500,
                order_count: 2,
                distinct_customers: 2,
            },
        ];
        let from = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let html = report_html(&rows, from, to);
        assert!(html.contains("SALES REPORT"));
        assert!(html.contains("Period: 2026-08-29 to 2026-08-30"));
        assert!(html.contains("<td>2026-08-29</td>"));
        assert!(html.contains("100.00"));
        assert!(html.contains("295.00"));
        // Totals: 100.00 + 295.00 over 3 orders.
        assert!(html.contains("<b>395.00</b>"));
        assert!(html.contains("<td class=\"right\">3</td>"));
    }
}
