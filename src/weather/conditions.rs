//! WMO weather code labels

/// Label used for codes missing from the table
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Human-readable label for a WMO weather interpretation code.
///
/// Codes outside the table map to [`UNKNOWN_CONDITION`].
pub fn condition_label(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        95 => "Thunderstorm",
        _ => UNKNOWN_CONDITION,
    }
}
