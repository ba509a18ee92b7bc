pub mod csv;
pub mod json;
pub mod table;

/// Formats an amount as pounds sterling with thousands separators and two
/// decimals, e.g. `£12,345.60` or `-£40.00`.
pub fn format_gbp(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, pence) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}£{grouped}.{pence}")
}

#[cfg(test)]
mod tests {
    use super::format_gbp;

    #[test]
    fn groups_thousands_with_two_decimals() {
        assert_eq!(format_gbp(0.0), "£0.00");
        assert_eq!(format_gbp(999.5), "£999.50");
        assert_eq!(format_gbp(1_000.0), "£1,000.00");
        assert_eq!(format_gbp(285_000.0), "£285,000.00");
        assert_eq!(format_gbp(1_234_567.891), "£1,234,567.89");
    }

    #[test]
    fn negative_amounts_keep_sign_outside_symbol() {
        assert_eq!(format_gbp(-2_000.0), "-£2,000.00");
        assert_eq!(format_gbp(-0.001), "£0.00");
    }
}
