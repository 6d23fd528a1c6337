//! Captured upstream payloads.
//!
//! Each constant is a trimmed copy of what the real source returned, kept
//! small enough to read inline in a failing assertion.

/// Table-scrape page: harbour VTS live weather table.
pub const TABLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Tides and Weather</title></head>
<body>
<div class="weather">
  <table class="live-weather">
    <tbody>
      <tr><td>Wind Speed</td><td>15.7 Knots</td></tr>
      <tr><td>Max Gust</td><td>21.2 Knots</td></tr>
      <tr><td>Wind Direction</td><td>225 Deg</td></tr>
      <tr><td>Air Temperature</td><td>14.3 C</td></tr>
      <tr><td>Pressure</td><td>1012 mBar</td></tr>
      <tr><td>Tide Height</td><td>3.1 m</td></tr>
    </tbody>
  </table>
</div>
</body>
</html>"#;

/// Same page with the temperature and pressure rows missing.
pub const TABLE_PAGE_PARTIAL: &str = r#"<html><body><table>
  <tr><th>Wind Speed</th><td>9.0 Knots</td></tr>
  <tr><th>Wind Direction</th><td>370 Deg</td></tr>
</table></body></html>"#;

/// Maintenance page served instead of the weather table.
pub const TABLE_PAGE_MAINTENANCE: &str =
    "<html><body><h1>Site under maintenance</h1><p>Please try later.</p></body></html>";

/// Session-binary live record: `<unix seconds>:<hex record>`.
///
/// `22600255e5f` decodes to 15.0 °C, 3.7 m/s, 188°.
pub const SESSION_LIVE: &str = "1714564800:22600255e5f";

/// Epoch of [`SESSION_LIVE`] (2024-05-01T12:00:00Z).
pub const SESSION_LIVE_EPOCH: i64 = 1_714_564_800;

/// Cookie name the session-binary host sets.
pub const SESSION_COOKIE_NAME: &str = "PHPSESSID";

/// Session token returned by the session page.
pub const SESSION_TOKEN: &str = "f3a9c1d2e4b5";

/// Primary JSON endpoint: averaged wind plus gust, knots.
pub const PRIMARY_JSON: &str = r#"{
  "status": "ok",
  "data": {
    "loc": "GBR00001",
    "ts": "2024-05-01T12:00:00Z",
    "wsa": 12.4,
    "wsh": 18.9,
    "wda": 232.6,
    "temp": 13.1,
    "pressure": 1011.4
  }
}"#;

/// Primary JSON endpoint answering with an error envelope.
pub const PRIMARY_JSON_ERROR: &str = r#"{"status":"error","message":"location not licensed"}"#;

/// Fallback JSON endpoint: current wind only, knots.
pub const FALLBACK_JSON: &str = r#"{
  "status": "ok",
  "data": {
    "ts": "2024-05-01T12:01:00Z",
    "wsc": 11.0,
    "wdc": 240
  }
}"#;

/// Public JSON station id used by [`PUBLIC_JSON`].
pub const PUBLIC_JSON_STATION: u64 = 521;

/// Public JSON API: km/h, average and max.
pub const PUBLIC_JSON: &str = r#"{
  "doc": "http://developers.pioupiou.fr/api/live/",
  "license": "http://developers.pioupiou.fr/data-licensing",
  "attribution": "(c) contributors of the Pioupiou wind network",
  "data": {
    "id": 521,
    "meta": { "name": "Prarion" },
    "location": { "latitude": 45.8932, "longitude": 6.7381, "date": "2024-05-01T11:58:00.000Z", "success": true },
    "measurements": {
      "date": "2024-05-01T12:00:00.000Z",
      "pressure": null,
      "wind_heading": 292.5,
      "wind_speed_avg": 18.0,
      "wind_speed_max": 27.25,
      "wind_speed_min": 9.5
    },
    "status": { "date": "2024-05-01T12:00:00.000Z", "snr": 20.5, "state": "on" }
  }
}"#;

/// Encode one session-binary record.
///
/// Temperature code lives in bits 0-10 of the high word, speed (decimeters
/// per second) in bits 16-31 of the low word, direction in bits 7-15.
pub fn session_record(temperature_c: f64, speed_ms: f64, direction_deg: u32) -> String {
    let temp_raw = ((temperature_c * 10.0).round() as i64 + 400) as u64 & 0x7FF;
    let speed_raw = (speed_ms * 10.0).round() as u64 & 0xFFFF;
    let lsb = (speed_raw << 16) | ((direction_deg as u64 & 0x1FF) << 7);
    format!("{:x}{:08x}", temp_raw, lsb)
}

/// Build a historical payload from `(epoch, temperature, speed, direction)` samples.
pub fn session_history(samples: &[(i64, f64, f64, u32)]) -> String {
    samples
        .iter()
        .map(|(ts, t, s, d)| format!("{}:{}", ts, session_record(*t, *s, *d)))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_record_matches_captured_live() {
        assert_eq!(session_record(15.0, 3.7, 188), "22600255e00");
        // Captured frame has low bits 0-6 set; they carry no data.
        assert!(SESSION_LIVE.ends_with("22600255e5f"));
    }

    #[test]
    fn test_session_history_joins_pairs() {
        let payload = session_history(&[(1, 15.0, 3.7, 188), (2, 15.0, 3.7, 188)]);
        assert_eq!(payload, "1:22600255e00,2:22600255e00");
    }
}
