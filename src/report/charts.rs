//! Text bar charts for metric tables, the report's visual blocks.

use crate::models::{GroupMetrics, MetricsTable};

const BAR_WIDTH: usize = 24;

/// Render the four metric charts for a table: total market cap, average
/// P/E, average dividend yield, and average 1-year return.
///
/// Each chart lists the top `limit` groups by that metric in descending
/// order with a proportional bar. Groups with an undefined (NaN) average
/// sort last, render as `n/a`, and get no bar.
pub fn render_metric_charts(table: &MetricsTable, limit: usize) -> String {
    let charts = [
        metric_chart(
            &format!("Total Market Capitalization by {}", table.key),
            table,
            limit,
            |row| row.total_market_cap,
            format_cap,
        ),
        metric_chart(
            &format!("Average P/E Ratio by {}", table.key),
            table,
            limit,
            |row| row.avg_pe,
            |v| format!("{v:.2}"),
        ),
        metric_chart(
            &format!("Average Dividend Yield by {}", table.key),
            table,
            limit,
            |row| row.avg_dividend_yield,
            format_pct,
        ),
        metric_chart(
            &format!("Average 1-Year Price Return by {}", table.key),
            table,
            limit,
            |row| row.avg_1y_return,
            format_pct,
        ),
    ];

    charts.join("\n")
}

fn metric_chart(
    title: &str,
    table: &MetricsTable,
    limit: usize,
    metric: impl Fn(&GroupMetrics) -> f64,
    format: impl Fn(f64) -> String,
) -> String {
    let mut entries: Vec<(&str, f64)> = table
        .rows
        .iter()
        .map(|row| (row.group.as_str(), metric(row)))
        .collect();

    // Descending by value, NaN last; name ascending on exact ties
    entries.sort_by(|(na, va), (nb, vb)| match (va.is_nan(), vb.is_nan()) {
        (true, true) => na.cmp(nb),
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => vb.partial_cmp(va).unwrap().then_with(|| na.cmp(nb)),
    });
    entries.truncate(limit);

    let scale = entries
        .iter()
        .filter(|(_, v)| v.is_finite() && *v > 0.0)
        .map(|(_, v)| *v)
        .fold(0.0f64, f64::max);

    let mut chart = format!("### {title}\n\n```\n");
    for (name, value) in entries {
        let (label, bar) = if value.is_nan() {
            ("n/a".to_string(), String::new())
        } else {
            let filled = if scale > 0.0 && value > 0.0 {
                ((value / scale) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            (format(value), "#".repeat(filled.min(BAR_WIDTH)))
        };
        chart.push_str(&format!("{name:<36} {label:>10} {bar}\n"));
    }
    chart.push_str("```\n");

    chart
}

fn format_cap(cap: f64) -> String {
    if cap >= 1e12 {
        format!("${:.2}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("${:.2}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("${:.2}M", cap / 1e6)
    } else {
        format!("${cap:.0}")
    }
}

fn format_pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}
