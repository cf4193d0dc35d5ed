//! Reshapes a prediction series for the "price trend by start date" chart.
//!
//! The x axis is labelled by position ("Day 1", "Day 2", ...) rather than by
//! calendar date, so the chart reflects relative order only.

use crate::domain::PredictionPoint;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub point: PredictionPoint,
}

/// Copy of `points` sorted ascending by `start_date`. The sort is stable, so
/// points sharing a start date keep their input order.
pub fn to_chart_series(points: &[PredictionPoint]) -> Vec<PredictionPoint> {
    let mut series = points.to_vec();
    series.sort_by_key(|p| p.start_date);
    series
}

pub fn day_label(index: usize) -> String {
    format!("Day {}", index + 1)
}

pub fn labeled_series(points: &[PredictionPoint]) -> Vec<ChartPoint> {
    to_chart_series(points)
        .into_iter()
        .enumerate()
        .map(|(idx, point)| ChartPoint {
            label: day_label(idx),
            point,
        })
        .collect()
}

pub fn tooltip(point: &PredictionPoint) -> String {
    format!("Start: {} → Harvest: {}", point.start_date, point.harvest_date)
}

pub fn format_price(price: f64) -> String {
    format!("₹{}", price.round())
}

/// Lowest and highest predicted price, for an auto-scaled y axis.
pub fn price_bounds(points: &[PredictionPoint]) -> Option<(f64, f64)> {
    let mut prices = points.iter().map(|p| p.predicted_price);
    let first = prices.next()?;
    Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(start: &str, harvest: &str, price: f64) -> PredictionPoint {
        PredictionPoint {
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            harvest_date: NaiveDate::parse_from_str(harvest, "%Y-%m-%d").unwrap(),
            predicted_price: price,
        }
    }

    fn engine_series() -> Vec<PredictionPoint> {
        vec![
            point("2024-03-03", "2024-03-31", 430.0),
            point("2024-03-01", "2024-03-29", 450.0),
        ]
    }

    #[test]
    fn orders_by_start_date_and_labels_by_position() {
        let series = labeled_series(&engine_series());
        let got: Vec<_> = series
            .iter()
            .map(|c| (c.label.as_str(), c.point.start_date.to_string()))
            .collect();
        assert_eq!(
            got,
            [
                ("Day 1", "2024-03-01".to_string()),
                ("Day 2", "2024-03-03".to_string())
            ]
        );
    }

    #[test]
    fn keeps_input_untouched_and_is_idempotent() {
        let input = engine_series();
        let once = to_chart_series(&input);
        let twice = to_chart_series(&once);
        assert_eq!(once, twice);
        assert_eq!(input, engine_series());
    }

    #[test]
    fn equal_start_dates_keep_input_order() {
        let input = vec![
            point("2024-03-05", "2024-03-30", 400.0),
            point("2024-03-02", "2024-03-27", 410.0),
            point("2024-03-05", "2024-03-30", 420.0),
            point("2024-03-02", "2024-03-27", 430.0),
        ];
        let prices: Vec<_> = to_chart_series(&input)
            .iter()
            .map(|p| p.predicted_price)
            .collect();
        assert_eq!(prices, [410.0, 430.0, 400.0, 420.0]);
    }

    #[test]
    fn sorted_output_for_ten_day_window() {
        // Engine returns ten candidates ordered by price, not by date.
        let input: Vec<_> = [7, 2, 9, 1, 5, 10, 3, 8, 4, 6]
            .into_iter()
            .map(|d| {
                let start = NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
                PredictionPoint {
                    start_date: start,
                    harvest_date: start + chrono::Duration::days(25),
                    predicted_price: 500.0 - d as f64,
                }
            })
            .collect();

        let series = to_chart_series(&input);
        assert_eq!(series.len(), input.len());
        assert!(series.windows(2).all(|w| w[0].start_date <= w[1].start_date));
    }

    #[test]
    fn empty_series() {
        assert!(to_chart_series(&[]).is_empty());
        assert_eq!(price_bounds(&[]), None);
    }

    #[test]
    fn formatting_helpers() {
        let p = point("2024-03-01", "2024-03-29", 449.6);
        assert_eq!(tooltip(&p), "Start: 2024-03-01 → Harvest: 2024-03-29");
        assert_eq!(format_price(p.predicted_price), "₹450");
        assert_eq!(price_bounds(&engine_series()), Some((430.0, 450.0)));
    }
}
