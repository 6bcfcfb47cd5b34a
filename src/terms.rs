use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::LoanConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::payments::annuity_payment;
use crate::types::PaymentFrequency;

/// contractual terms of a loan plus the quantities derived from them
///
/// Immutable once built; every schedule of the loan is computed from the same
/// terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanTerms {
    principal: Money,
    interest_rate: Rate,
    term_in_months: Decimal,
    fees_pct: Rate,
    disbursement_date: NaiveDate,
    frequency: PaymentFrequency,
    segment: String,
    channel: String,

    // derived
    periods: u32,
    period_rate: Rate,
    scheduled_payment: Money,
}

impl LoanTerms {
    /// validate a config and derive the period count, per-period rate and
    /// scheduled installment
    pub fn from_config(config: &LoanConfig) -> Result<Self> {
        config.validate()?;

        let frequency = config.frequency;
        let periods = period_count(config.term_in_months, frequency)?;
        let period_rate = period_rate(config.interest_rate, frequency);
        let scheduled_payment = annuity_payment(config.principal, period_rate, periods);

        Ok(Self {
            principal: config.principal,
            interest_rate: config.interest_rate,
            term_in_months: config.term_in_months,
            fees_pct: config.fees_pct,
            disbursement_date: config.disbursement_date,
            frequency,
            segment: config.segment.clone(),
            channel: config.channel.clone(),
            periods,
            period_rate,
            scheduled_payment,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn interest_rate(&self) -> Rate {
        self.interest_rate
    }

    pub fn term_in_months(&self) -> Decimal {
        self.term_in_months
    }

    pub fn fees_pct(&self) -> Rate {
        self.fees_pct
    }

    pub fn disbursement_date(&self) -> NaiveDate {
        self.disbursement_date
    }

    pub fn frequency(&self) -> PaymentFrequency {
        self.frequency
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// number of installments in the original schedule
    pub fn periods(&self) -> u32 {
        self.periods
    }

    pub fn period_rate(&self) -> Rate {
        self.period_rate
    }

    /// level installment that amortizes the principal over `periods`
    pub fn scheduled_payment(&self) -> Money {
        self.scheduled_payment
    }

    /// origination fee in money terms
    pub fn origination_fee(&self) -> Money {
        self.principal * self.fees_pct.as_decimal()
    }
}

/// `ceil(term / months per period)`, evaluated on the exact month fraction
fn period_count(term_in_months: Decimal, frequency: PaymentFrequency) -> Result<u32> {
    let (num, den) = frequency.month_fraction();
    let exact = term_in_months * Decimal::from(den) / Decimal::from(num);

    exact
        .ceil()
        .to_u32()
        .filter(|periods| *periods > 0)
        .ok_or_else(|| LoanError::OutOfRange {
            field: "term_in_months".to_string(),
            message: format!("term of {term_in_months} months yields no whole {frequency} periods"),
        })
}

/// annual rate scaled to one period
fn period_rate(annual: Rate, frequency: PaymentFrequency) -> Rate {
    let (num, den) = frequency.month_fraction();
    Rate::from_decimal(annual.as_decimal() * Decimal::from(num) / Decimal::from(den * 12))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config(term: Decimal, frequency: PaymentFrequency) -> LoanConfig {
        LoanConfig::new(
            Money::from_major(20_000),
            Rate::from_decimal(dec!(0.0599)),
            term,
            NaiveDate::from_ymd_opt(2022, 12, 12).unwrap(),
        )
        .with_frequency(frequency)
    }

    #[test]
    fn test_period_count_per_frequency() {
        let cases = [
            (dec!(36), PaymentFrequency::Monthly, 36),
            (dec!(48), PaymentFrequency::Bimonthly, 24),
            (dec!(84), PaymentFrequency::Quarterly, 28),
            (dec!(60), PaymentFrequency::Weekly, 258),
            (dec!(36), PaymentFrequency::Biweekly, 78),
            (dec!(90), PaymentFrequency::Annual, 8),
            (dec!(13), PaymentFrequency::Semiannual, 3),
        ];

        for (term, frequency, expected) in cases {
            let terms = LoanTerms::from_config(&config(term, frequency)).unwrap();
            assert_eq!(terms.periods(), expected, "{term} months {frequency}");
        }
    }

    #[test]
    fn test_exact_week_multiples_do_not_round_up() {
        // 7 months is exactly 30 weeks under the 7/30 convention
        let terms = LoanTerms::from_config(&config(dec!(7), PaymentFrequency::Weekly)).unwrap();
        assert_eq!(terms.periods(), 30);

        let terms = LoanTerms::from_config(&config(dec!(14), PaymentFrequency::Biweekly)).unwrap();
        assert_eq!(terms.periods(), 30);
    }

    #[test]
    fn test_fractional_term_rounds_up() {
        let terms = LoanTerms::from_config(&config(dec!(0.5), PaymentFrequency::Monthly)).unwrap();
        assert_eq!(terms.periods(), 1);
    }

    #[test]
    fn test_period_rate() {
        let monthly = LoanTerms::from_config(&config(dec!(36), PaymentFrequency::Monthly)).unwrap();
        assert_eq!(monthly.period_rate().as_decimal().round_dp(10), dec!(0.0049916667));

        let quarterly = LoanTerms::from_config(&config(dec!(36), PaymentFrequency::Quarterly)).unwrap();
        assert_eq!(quarterly.period_rate().as_decimal(), dec!(0.014975));
    }

    #[test]
    fn test_scheduled_payment() {
        let terms = LoanTerms::from_config(&config(dec!(36), PaymentFrequency::Monthly)).unwrap();
        assert_eq!(terms.scheduled_payment().round_dp(2), Money::from_str_exact("608.35").unwrap());
    }

    #[test]
    fn test_zero_rate_payment_is_straight_line() {
        let config = config(dec!(10), PaymentFrequency::Monthly).with_interest_rate(Rate::ZERO);
        let terms = LoanTerms::from_config(&config).unwrap();

        assert_eq!(terms.period_rate(), Rate::ZERO);
        assert_eq!(terms.scheduled_payment(), Money::from_major(2_000));
    }

    #[test]
    fn test_origination_fee() {
        let config = config(dec!(36), PaymentFrequency::Monthly).with_fees_pct(Rate::from_percentage(5));
        let terms = LoanTerms::from_config(&config).unwrap();
        assert_eq!(terms.origination_fee(), Money::from_major(1_000));
        assert_eq!(terms.segment(), "c");
        assert_eq!(terms.channel(), "free");
    }
}
