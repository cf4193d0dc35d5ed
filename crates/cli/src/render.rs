use cocoon_core::chart;
use cocoon_core::domain::{HistoryEntry, RecommendationResult};
use cocoon_core::view::ViewState;
use std::fmt::Write;

const BAR_WIDTH: usize = 24;

pub fn render(state: &ViewState) -> String {
    match state {
        ViewState::NewSearch => {
            "Select a location and search to see recommendations.".to_string()
        }
        ViewState::Loading => "Analyzing...".to_string(),
        ViewState::ResultShown(result) => render_result(result),
        ViewState::ErrorShown(message) => format!("error: {message}"),
        ViewState::HistoryShown(entries) => render_history(entries),
    }
}

fn render_result(result: &RecommendationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Recommended start   {}", result.recommended_date);
    let _ = writeln!(out, "Expected harvest    {}", result.expected_harvest_date);
    let _ = writeln!(
        out,
        "Projected price     {} (predicted for {})",
        chart::format_price(result.predicted_price),
        result.expected_harvest_date
    );

    if let Some(points) = result.all_predictions.as_deref() {
        let bounds = chart::price_bounds(points);
        let _ = writeln!(out);
        let _ = writeln!(out, "Price trend by start date");
        for c in chart::labeled_series(points) {
            let _ = writeln!(
                out,
                "{:<7} {}  {:>6}  {}",
                c.label,
                chart::tooltip(&c.point),
                chart::format_price(c.point.predicted_price),
                "█".repeat(bar_len(c.point.predicted_price, bounds))
            );
        }
    }

    out.trim_end().to_string()
}

fn bar_len(price: f64, bounds: Option<(f64, f64)>) -> usize {
    match bounds {
        Some((lo, hi)) if hi > lo => {
            let scaled = (price - lo) / (hi - lo) * (BAR_WIDTH - 1) as f64;
            1 + scaled.round() as usize
        }
        _ => BAR_WIDTH,
    }
}

fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history found. Start searching!".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<17} {:<13} {:<11} {:<13} {:>11}",
        "Date searched", "Location", "Start date", "Harvest date", "Proj. price"
    );
    for e in entries {
        let _ = writeln!(
            out,
            "{:<17} {:<13} {:<11} {:<13} {:>11}",
            e.created_at.format("%Y-%m-%d %H:%M").to_string(),
            e.location,
            e.start_date.to_string(),
            e.harvest_date.to_string(),
            chart::format_price(e.predicted_price)
        );
    }
    out.trim_end().to_string()
}
