/// declarative field rules for loan construction inputs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

use crate::errors::{LoanError, Result};
use crate::types::PaymentFrequency;

/// date format accepted for the disbursement date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// semantic type of an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Text,
    Date,
    /// text restricted to the rule's allowed codes
    Code,
    /// object mapping period numbers to amounts
    PaymentMap,
}

impl FieldType {
    fn expected(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::Text => "string",
            FieldType::Date => "date string (YYYY-MM-DD)",
            FieldType::Code => "code string",
            FieldType::PaymentMap => "object of period to amount",
        }
    }
}

/// numeric bound, inclusive or exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Inclusive(Decimal),
    Exclusive(Decimal),
}

impl Bound {
    fn admits_above(&self, value: Decimal) -> bool {
        match self {
            Bound::Inclusive(min) => value >= *min,
            Bound::Exclusive(min) => value > *min,
        }
    }

    fn admits_below(&self, value: Decimal) -> bool {
        match self {
            Bound::Inclusive(max) => value <= *max,
            Bound::Exclusive(max) => value < *max,
        }
    }
}

/// validation rule for a single input field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub allowed: &'static [&'static str],
    pub message: &'static str,
}

pub static LOAN_FIELD_RULES: [FieldRule; 9] = [
    FieldRule {
        field: "principal",
        field_type: FieldType::Number,
        required: true,
        min: Some(Bound::Exclusive(Decimal::ZERO)),
        max: Some(Bound::Inclusive(dec!(10000000000))),
        allowed: &[],
        message: "principal must be greater than 0 and at most 1e10",
    },
    FieldRule {
        field: "interest_rate",
        field_type: FieldType::Number,
        required: true,
        min: Some(Bound::Inclusive(Decimal::ZERO)),
        max: Some(Bound::Inclusive(Decimal::ONE)),
        allowed: &[],
        message: "annual interest rate must be a fraction between 0 and 1",
    },
    FieldRule {
        field: "term_in_months",
        field_type: FieldType::Number,
        required: true,
        min: Some(Bound::Exclusive(Decimal::ZERO)),
        max: Some(Bound::Inclusive(dec!(1200))),
        allowed: &[],
        message: "term must be greater than 0 and at most 1200 months",
    },
    FieldRule {
        field: "disbursement_date",
        field_type: FieldType::Date,
        required: true,
        min: None,
        max: None,
        allowed: &[],
        message: "disbursement date must be a calendar date formatted YYYY-MM-DD",
    },
    FieldRule {
        field: "frequency",
        field_type: FieldType::Code,
        required: false,
        min: None,
        max: None,
        allowed: &PaymentFrequency::CODES,
        message: "frequency must be one of W, 2W, M, BM, Q, H, Y",
    },
    FieldRule {
        field: "fees_pct",
        field_type: FieldType::Number,
        required: false,
        min: Some(Bound::Inclusive(Decimal::ZERO)),
        max: Some(Bound::Inclusive(Decimal::ONE)),
        allowed: &[],
        message: "origination fee must be a fraction of principal between 0 and 1",
    },
    FieldRule {
        field: "additional_payments",
        field_type: FieldType::PaymentMap,
        required: false,
        // bounds apply to each amount; periods are checked against the schedule
        min: Some(Bound::Inclusive(Decimal::ZERO)),
        max: Some(Bound::Inclusive(dec!(10000000000))),
        allowed: &[],
        message: "additional payment amounts must be between 0 and 1e10",
    },
    FieldRule {
        field: "segment",
        field_type: FieldType::Text,
        required: false,
        min: None,
        max: None,
        allowed: &[],
        message: "segment must be a string",
    },
    FieldRule {
        field: "channel",
        field_type: FieldType::Text,
        required: false,
        min: None,
        max: None,
        allowed: &[],
        message: "channel must be a string",
    },
];

pub static PRINCIPAL: &FieldRule = &LOAN_FIELD_RULES[0];
pub static INTEREST_RATE: &FieldRule = &LOAN_FIELD_RULES[1];
pub static TERM_IN_MONTHS: &FieldRule = &LOAN_FIELD_RULES[2];
pub static FEES_PCT: &FieldRule = &LOAN_FIELD_RULES[5];
pub static ADDITIONAL_PAYMENTS: &FieldRule = &LOAN_FIELD_RULES[6];

impl FieldRule {
    /// check a numeric value against the rule's bounds
    pub fn check_number(&self, value: Decimal) -> Result<()> {
        let above = self.min.map_or(true, |min| min.admits_above(value));
        let below = self.max.map_or(true, |max| max.admits_below(value));

        if above && below {
            Ok(())
        } else {
            Err(self.out_of_range(value))
        }
    }

    /// check a code against the rule's allowed set
    pub fn check_code(&self, value: &str) -> Result<()> {
        if self.allowed.is_empty() || self.allowed.contains(&value) {
            Ok(())
        } else {
            Err(self.out_of_range(value))
        }
    }

    /// check a JSON value: type first, then range
    pub fn check(&self, value: &Value) -> Result<()> {
        match self.field_type {
            FieldType::Number => {
                let number = self.expect_number(value)?;
                self.check_number(number)
            }
            FieldType::Text => self.expect_str(value).map(|_| ()),
            FieldType::Code => {
                let code = self.expect_str(value)?;
                self.check_code(code)
            }
            FieldType::Date => {
                let text = self.expect_str(value)?;
                parse_date(self.field, text).map(|_| ())
            }
            FieldType::PaymentMap => {
                let map = value.as_object().ok_or_else(|| self.wrong_type(value))?;
                self.check_payment_map(map)
            }
        }
    }

    fn check_payment_map(&self, map: &Map<String, Value>) -> Result<()> {
        for (key, amount) in map {
            let period: i64 = key.trim().parse().map_err(|_| LoanError::InvalidType {
                field: self.field.to_string(),
                expected: "integer period key",
                found: format!("{key:?}"),
            })?;
            if period < 1 || period > i64::from(u32::MAX) {
                return Err(LoanError::OutOfRange {
                    field: self.field.to_string(),
                    message: format!("period {period} must be a positive period number"),
                });
            }

            let amount = self.expect_number(amount)?;
            self.check_number(amount)?;
        }
        Ok(())
    }

    fn expect_number(&self, value: &Value) -> Result<Decimal> {
        match value {
            Value::Number(n) => number_to_decimal(n).ok_or_else(|| LoanError::OutOfRange {
                field: self.field.to_string(),
                message: format!("{n} is not representable as a decimal"),
            }),
            other => Err(self.wrong_type(other)),
        }
    }

    fn expect_str<'a>(&self, value: &'a Value) -> Result<&'a str> {
        value.as_str().ok_or_else(|| self.wrong_type(value))
    }

    fn wrong_type(&self, value: &Value) -> LoanError {
        LoanError::InvalidType {
            field: self.field.to_string(),
            expected: self.field_type.expected(),
            found: json_type_name(value).to_string(),
        }
    }

    fn out_of_range(&self, value: impl std::fmt::Display) -> LoanError {
        LoanError::OutOfRange {
            field: self.field.to_string(),
            message: format!("{} (got {value})", self.message),
        }
    }
}

/// validate a JSON loan document against every rule in the table
pub fn validate_document(document: &Value) -> Result<()> {
    let fields = document.as_object().ok_or_else(|| LoanError::InvalidType {
        field: "loan".to_string(),
        expected: "object",
        found: json_type_name(document).to_string(),
    })?;

    for rule in LOAN_FIELD_RULES.iter() {
        match fields.get(rule.field) {
            None | Some(Value::Null) if rule.required => {
                return Err(LoanError::MissingField {
                    field: rule.field.to_string(),
                });
            }
            None | Some(Value::Null) => {}
            Some(value) => rule.check(value)?,
        }
    }

    for key in fields.keys() {
        if !LOAN_FIELD_RULES.iter().any(|rule| rule.field == key) {
            tracing::debug!(field = %key, "ignoring unrecognised loan field");
        }
    }

    Ok(())
}

/// parse a disbursement date in `YYYY-MM-DD` form
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| LoanError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
