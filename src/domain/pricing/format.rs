//! Currency display.

/// Formats an amount as whole pesos with dot thousands separators.
///
/// `150000.0` becomes `"$150.000"`. Non-finite amounts format as `"$0"`.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount.round() } else { 0.0 };
    let negative = amount < 0.0;
    let digits = format!("{:.0}", amount.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_currency(150000.0), "$150.000");
        assert_eq!(format_currency(1234567.0), "$1.234.567");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn rounds_to_whole_units() {
        assert_eq!(format_currency(1999.6), "$2.000");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(format_currency(-30000.0), "-$30.000");
    }

    #[test]
    fn nan_formats_as_zero() {
        assert_eq!(format_currency(f64::NAN), "$0");
        assert_eq!(format_currency(f64::INFINITY), "$0");
    }
}
