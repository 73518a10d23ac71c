use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For THB/USD/EUR, 1 unit = 100 minor units, so ฿50.00 = 5000 cents.
pub type Cents = i64;

/// Interest rates are stored as basis points (hundredths of a percent).
/// Example: 5.25% -> 525
pub type BasisPoints = i64;

/// Largest principal or payment a loan may carry. Leaves room to sum
/// over a thousand maximal loans without overflowing `Cents`.
pub const MAX_AMOUNT_CENTS: Cents = i64::MAX / 1024;

/// Format cents as a plain decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Format cents with thousands separators for display.
/// Example: 123456789 -> "1,234,567.89"
pub fn format_amount(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = format_number(&(abs_cents / 100).to_string());
    format!("{}{}.{:02}", sign, units, abs_cents % 100)
}

/// Format a rate in basis points as a percentage.
/// Example: 525 -> "5.25%"
pub fn format_rate(bps: BasisPoints) -> String {
    format!("{}%", format_cents(bps))
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, input) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    if input.is_empty() || input.starts_with('+') {
        return Err(ParseCentsError::InvalidFormat);
    }

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.len() {
        1 => parse_units(parts[0])?
            .checked_mul(100)
            .ok_or(ParseCentsError::Overflow)?,
        2 => {
            if parts[0].is_empty() && parts[1].is_empty() {
                return Err(ParseCentsError::InvalidFormat);
            }
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parse_units(parts[0])?
            };

            // Pad or truncate the fraction to 2 digits
            let decimal_str = parts[1];
            if !decimal_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(ParseCentsError::InvalidFormat);
            }
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => parse_units(decimal_str)? * 10,
                _ => parse_units(&decimal_str[..2])?,
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::Overflow)?
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

fn parse_units(digits: &str) -> Result<i64, ParseCentsError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    digits.parse().map_err(|_| ParseCentsError::Overflow)
}

/// Group the digits of a number with commas as the user types it.
///
/// Existing commas are stripped first. Input that is not made only of ASCII
/// digits is returned unchanged. Example: "1000000" -> "1,000,000"
pub fn format_number(input: &str) -> String {
    let digits = unformat_number(input);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return input.to_string();
    }

    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Remove the grouping commas added by [`format_number`].
pub fn unformat_number(input: &str) -> String {
    input.replace(',', "")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
