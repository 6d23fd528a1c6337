//! Label/value HTML table scraping.

use std::collections::HashMap;

use scraper::{Html, Selector};
use weather_common::{Measurements, SpeedUnit};

use super::ParsedSample;
use crate::config::TableLabels;
use crate::error::{SourceError, SourceResult};

const LABEL: &str = "html table";

/// Extract measurements from a page of `<label cell><value cell>` rows.
///
/// Missing labels leave the field `None`. A page with none of the labels is
/// not the weather page at all and is rejected.
pub fn parse_table(html: &str, labels: &TableLabels) -> SourceResult<ParsedSample> {
    let cells = label_values(html)?;

    let lookup = |label: &str| cells.get(&label.trim().to_lowercase()).map(String::as_str);

    let speed_cell = lookup(&labels.wind_speed);
    let gust_cell = labels.wind_gust.as_deref().and_then(lookup);
    let direction_cell = lookup(&labels.wind_direction);
    let temperature_cell = lookup(&labels.temperature);
    let pressure_cell = lookup(&labels.pressure);

    if [speed_cell, gust_cell, direction_cell, temperature_cell, pressure_cell]
        .iter()
        .all(Option::is_none)
    {
        return Err(SourceError::schema(LABEL, html));
    }

    let measurements = Measurements {
        wind_speed: speed_cell.and_then(|c| speed_mps(c, labels.speed_unit)),
        wind_gust: gust_cell.and_then(|c| speed_mps(c, labels.speed_unit)),
        wind_direction: direction_cell.and_then(|c| leading_number(c).map(|(v, _)| v)),
        temperature: temperature_cell.and_then(celsius),
        pressure: pressure_cell.and_then(|c| leading_number(c).map(|(v, _)| v)),
    };

    Ok(ParsedSample {
        timestamp: None,
        measurements,
    })
}

/// Lowercased label text -> text of the cell right after it in the same row.
fn label_values(html: &str) -> SourceResult<HashMap<String, String>> {
    let document = Html::parse_document(html);
    let row_selector =
        Selector::parse("tr").map_err(|e| SourceError::parse(LABEL, e.to_string(), html))?;
    let cell_selector =
        Selector::parse("td, th").map_err(|e| SourceError::parse(LABEL, e.to_string(), html))?;

    let mut values = HashMap::new();
    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        for pair in cells.windows(2) {
            values
                .entry(pair[0].to_lowercase())
                .or_insert_with(|| pair[1].clone());
        }
    }
    Ok(values)
}

/// Leading numeric token of a `"<value> <unit>"` cell plus whatever follows it.
fn leading_number(cell: &str) -> Option<(f64, &str)> {
    let cell = cell.trim();
    let end = cell
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(cell.len());
    let value = cell[..end].parse::<f64>().ok()?;
    Some((value, cell[end..].trim()))
}

fn speed_mps(cell: &str, default_unit: SpeedUnit) -> Option<f64> {
    let (value, rest) = leading_number(cell)?;
    let unit = rest
        .split_whitespace()
        .next()
        .and_then(SpeedUnit::from_token)
        .unwrap_or(default_unit);
    Some(unit.to_mps(value))
}

fn celsius(cell: &str) -> Option<f64> {
    let (value, rest) = leading_number(cell)?;
    let unit = rest.trim_start_matches('°').trim().to_ascii_lowercase();
    if unit.starts_with('f') {
        Some((value - 32.0) * 5.0 / 9.0)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::{TABLE_PAGE, TABLE_PAGE_MAINTENANCE, TABLE_PAGE_PARTIAL};
    use test_utils::{assert_approx_eq, assert_some_approx_eq};

    #[test]
    fn test_full_page() {
        let parsed = parse_table(TABLE_PAGE, &TableLabels::default()).unwrap();
        let m = parsed.measurements;
        assert_some_approx_eq!(m.wind_speed, 15.7 * 0.514444, 1e-9);
        assert_some_approx_eq!(m.wind_gust, 21.2 * 0.514444, 1e-9);
        assert_eq!(m.wind_direction, Some(225.0));
        assert_eq!(m.temperature, Some(14.3));
        assert_eq!(m.pressure, Some(1012.0));
        assert!(parsed.timestamp.is_none());
    }

    #[test]
    fn test_wind_speed_row_scenario() {
        let html = "<table><tr><td>Wind Speed</td><td>15.7 Knots</td></tr></table>";
        let m = parse_table(html, &TableLabels::default()).unwrap().measurements;
        assert_approx_eq!(m.wind_speed.unwrap(), 8.08, 0.01);
    }

    #[test]
    fn test_missing_labels_are_none() {
        let m = parse_table(TABLE_PAGE_PARTIAL, &TableLabels::default())
            .unwrap()
            .measurements;
        assert_some_approx_eq!(m.wind_speed, 9.0 * 0.514444, 1e-9);
        assert_eq!(m.wind_direction, Some(370.0));
        assert_eq!(m.temperature, None);
        assert_eq!(m.pressure, None);
        assert_eq!(m.wind_gust, None);
    }

    #[test]
    fn test_no_labels_is_schema_error() {
        let err = parse_table(TABLE_PAGE_MAINTENANCE, &TableLabels::default()).unwrap_err();
        assert!(matches!(err, SourceError::Schema { .. }));
    }

    #[test]
    fn test_labels_match_case_insensitively() {
        let html = "<table><tr><td>WIND SPEED</td><td>10 km/h</td></tr>\
                    <tr><td>wind direction</td><td>90</td></tr></table>";
        let m = parse_table(html, &TableLabels::default()).unwrap().measurements;
        assert_some_approx_eq!(m.wind_speed, 10.0 / 3.6, 1e-9);
        assert_eq!(m.wind_direction, Some(90.0));
    }

    #[test]
    fn test_unparseable_value_is_none() {
        let html = "<table><tr><td>Wind Speed</td><td>n/a</td></tr></table>";
        let m = parse_table(html, &TableLabels::default()).unwrap().measurements;
        assert_eq!(m.wind_speed, None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("225 Deg"), Some((225.0, "Deg")));
        assert_eq!(leading_number("-3.5°C"), Some((-3.5, "°C")));
        assert_eq!(leading_number("Deg"), None);
    }

    #[test]
    fn test_fahrenheit_temperature() {
        assert_some_approx_eq!(celsius("50 °F"), 10.0, 1e-9);
        assert_eq!(celsius("14.3 C"), Some(14.3));
    }
}
