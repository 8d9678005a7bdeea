//! Shared numeric helpers for the notifier workspace.

/// Rounds a value to `places` decimal places, half away from zero.
pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Formats an amount for display: rounded to `places` decimals, trailing zeros
/// trimmed, integer part grouped by thousands.
pub fn format_amount(value: f64, places: usize) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = places);
    let (whole, frac) = match formatted.split_once('.') {
        Some((whole, frac)) => (whole, frac.trim_end_matches('0')),
        None => (formatted.as_str(), ""),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (whole != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}
