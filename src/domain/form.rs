use chrono::NaiveDate;
use thiserror::Error;

use super::{Currency, MAX_AMOUNT_CENTS, NewLoan, format_amount, parse_cents, unformat_number};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Loan amount must be greater than zero")]
    NonPositiveAmount,

    #[error("{field} is too large (maximum {max})", max = format_amount(MAX_AMOUNT_CENTS))]
    TooLarge { field: &'static str },

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("Unknown currency '{0}'. Valid currencies: THB, USD, EUR")]
    InvalidCurrency(String),

    #[error("Invalid start date: {0}")]
    InvalidDate(String),
}

/// Raw, unvalidated fields of the add-loan form.
///
/// Every field is kept as the text the user typed. [`LoanForm::validate`]
/// turns it into a [`NewLoan`] or reports the first problem found.
#[derive(Debug, Clone, Default)]
pub struct LoanForm {
    pub title: String,
    pub amount: String,
    /// Empty means the default currency
    pub currency: String,
    pub interest_rate: String,
    pub monthly_payment: String,
    pub month: String,
    pub day: String,
    pub year: String,
    pub receipt: Option<String>,
}

impl LoanForm {
    pub fn validate(&self) -> Result<NewLoan, FormError> {
        let title = required("title", &self.title)?;
        let amount = required("amount", &self.amount)?;
        let interest_rate = required("interest rate", &self.interest_rate)?;
        let monthly_payment = required("monthly payment", &self.monthly_payment)?;
        let month = required("month", &self.month)?;
        let day = required("day", &self.day)?;
        let year = required("year", &self.year)?;

        let amount_cents = parse_decimal("amount", &unformat_number(amount))?;
        if amount_cents <= 0 {
            return Err(FormError::NonPositiveAmount);
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(FormError::TooLarge { field: "Amount" });
        }

        let currency = if self.currency.trim().is_empty() {
            Currency::default()
        } else {
            Currency::from_str(&self.currency)
                .ok_or_else(|| FormError::InvalidCurrency(self.currency.clone()))?
        };

        let interest_rate_bps = parse_decimal("interest rate", interest_rate)?;
        if interest_rate_bps < 0 {
            return Err(FormError::Negative("Interest rate"));
        }

        let monthly_payment_cents =
            parse_decimal("monthly payment", &unformat_number(monthly_payment))?;
        if monthly_payment_cents < 0 {
            return Err(FormError::Negative("Monthly payment"));
        }
        if monthly_payment_cents > MAX_AMOUNT_CENTS {
            return Err(FormError::TooLarge {
                field: "Monthly payment",
            });
        }

        let start_date = assemble_date(month, day, year)?;

        let receipt_url = self
            .receipt
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Ok(NewLoan {
            title: title.to_string(),
            amount_cents,
            currency,
            interest_rate_bps,
            monthly_payment_cents,
            start_date,
            receipt_url,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<i64, FormError> {
    parse_cents(value).map_err(|_| FormError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Build a calendar date from the separate month, day and year inputs.
///
/// Dates that do not exist (e.g. February 30) are rejected instead of
/// rolling over into the following month.
pub fn assemble_date(month: &str, day: &str, year: &str) -> Result<NaiveDate, FormError> {
    let month: u32 = parse_date_part("month", month)?;
    let day: u32 = parse_date_part("day", day)?;
    let year: i32 = parse_date_part("year", year)?;

    if !(1..=12).contains(&month) {
        return Err(FormError::InvalidDate(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if !(1..=31).contains(&day) {
        return Err(FormError::InvalidDate(format!(
            "day must be between 1 and 31, got {}",
            day
        )));
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        FormError::InvalidDate(format!("{:04}-{:02}-{:02} does not exist", year, month, day))
    })
}

fn parse_date_part<T: std::str::FromStr>(part: &str, value: &str) -> Result<T, FormError> {
    value
        .trim()
        .parse()
        .map_err(|_| FormError::InvalidDate(format!("{} '{}' is not a number", part, value)))
}

/// Whether the month field may take this text as its new value.
/// Empty input (clearing the field) is always allowed.
pub fn accepts_month_input(text: &str) -> bool {
    accepts_ranged_input(text, 2, 1..=12)
}

/// Whether the day field may take this text as its new value.
pub fn accepts_day_input(text: &str) -> bool {
    accepts_ranged_input(text, 2, 1..=31)
}

/// Whether the year field may take this text as its new value.
pub fn accepts_year_input(text: &str) -> bool {
    text.len() <= 4 && text.chars().all(|c| c.is_ascii_digit())
}

fn accepts_ranged_input(text: &str, max_len: usize, range: std::ops::RangeInclusive<u32>) -> bool {
    if text.is_empty() {
        return true;
    }
    if text.len() > max_len || !text.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    text.parse::<u32>().is_ok_and(|n| range.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format_cents;

    fn filled_form() -> LoanForm {
        LoanForm {
            title: "Condo".into(),
            amount: "1,000,000".into(),
            currency: "THB".into(),
            interest_rate: "4.5".into(),
            monthly_payment: "12000".into(),
            month: "3".into(),
            day: "15".into(),
            year: "2024".into(),
            receipt: None,
        }
    }

    #[test]
    fn test_assemble_date() {
        let date = assemble_date("3", "15", "2024").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-03-15");
    }

    #[test]
    fn test_assemble_date_rejects_overflow() {
        assert!(matches!(
            assemble_date("2", "30", "2024"),
            Err(FormError::InvalidDate(_))
        ));
        assert!(assemble_date("2", "29", "2024").is_ok());
        assert!(assemble_date("2", "29", "2023").is_err());
    }

    #[test]
    fn test_assemble_date_rejects_out_of_range_parts() {
        assert!(assemble_date("13", "1", "2024").is_err());
        assert!(assemble_date("0", "1", "2024").is_err());
        assert!(assemble_date("1", "32", "2024").is_err());
        assert!(assemble_date("x", "1", "2024").is_err());
    }

    #[test]
    fn test_validate_form() {
        let loan = filled_form().validate().unwrap();

        assert_eq!(loan.title, "Condo");
        assert_eq!(loan.amount_cents, 100_000_000);
        assert_eq!(loan.currency, Currency::Thb);
        assert_eq!(loan.interest_rate_bps, 450);
        assert_eq!(loan.monthly_payment_cents, 1_200_000);
        assert_eq!(loan.start_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(loan.receipt_url, None);
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut form = filled_form();
        form.title = "   ".into();
        assert_eq!(form.validate(), Err(FormError::MissingField("title")));

        let mut form = filled_form();
        form.year.clear();
        assert_eq!(form.validate(), Err(FormError::MissingField("year")));
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut form = filled_form();
        form.amount = "lots".into();
        assert!(matches!(
            form.validate(),
            Err(FormError::InvalidNumber { field: "amount", .. })
        ));

        let mut form = filled_form();
        form.amount = "0".into();
        assert_eq!(form.validate(), Err(FormError::NonPositiveAmount));

        let mut form = filled_form();
        form.interest_rate = "-1".into();
        assert_eq!(form.validate(), Err(FormError::Negative("Interest rate")));
    }

    #[test]
    fn test_validate_caps_amounts() {
        let mut form = filled_form();
        form.amount = format_cents(MAX_AMOUNT_CENTS);
        assert_eq!(form.validate().unwrap().amount_cents, MAX_AMOUNT_CENTS);

        form.amount = format_cents(MAX_AMOUNT_CENTS + 1);
        assert_eq!(
            form.validate(),
            Err(FormError::TooLarge { field: "Amount" })
        );

        form.amount = "9,007,199,254,740,992".into();
        assert_eq!(
            form.validate(),
            Err(FormError::TooLarge { field: "Amount" })
        );

        let mut form = filled_form();
        form.monthly_payment = format_cents(MAX_AMOUNT_CENTS + 1);
        assert_eq!(
            form.validate(),
            Err(FormError::TooLarge {
                field: "Monthly payment"
            })
        );
    }

    #[test]
    fn test_validate_currency() {
        let mut form = filled_form();
        form.currency = String::new();
        assert_eq!(form.validate().unwrap().currency, Currency::Thb);

        form.currency = "eur".into();
        assert_eq!(form.validate().unwrap().currency, Currency::Eur);

        form.currency = "GBP".into();
        assert_eq!(
            form.validate(),
            Err(FormError::InvalidCurrency("GBP".into()))
        );
    }

    #[test]
    fn test_blank_receipt_is_ignored() {
        let mut form = filled_form();
        form.receipt = Some("  ".into());
        assert_eq!(form.validate().unwrap().receipt_url, None);

        form.receipt = Some("file:///receipts/condo.jpg".into());
        assert_eq!(
            form.validate().unwrap().receipt_url.as_deref(),
            Some("file:///receipts/condo.jpg")
        );
    }

    #[test]
    fn test_month_input_filter() {
        assert!(accepts_month_input(""));
        assert!(accepts_month_input("1"));
        assert!(accepts_month_input("12"));
        assert!(!accepts_month_input("0"));
        assert!(!accepts_month_input("13"));
        assert!(!accepts_month_input("1a"));
        assert!(!accepts_month_input("012"));
    }

    #[test]
    fn test_day_input_filter() {
        assert!(accepts_day_input(""));
        assert!(accepts_day_input("31"));
        assert!(!accepts_day_input("32"));
        assert!(!accepts_day_input("0"));
    }

    #[test]
    fn test_year_input_filter() {
        assert!(accepts_year_input(""));
        assert!(accepts_year_input("2024"));
        assert!(!accepts_year_input("20245"));
        assert!(!accepts_year_input("20x4"));
    }
}
