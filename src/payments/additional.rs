use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::validation;

/// borrower-supplied payments on top of the scheduled installment, by period
///
/// Periods without an entry pay nothing extra. Adding to a period that
/// already has an entry accumulates rather than overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdditionalPayments(BTreeMap<u32, Money>);

impl AdditionalPayments {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// amount for `period`, zero when absent
    pub fn get(&self, period: u32) -> Money {
        self.0.get(&period).copied().unwrap_or(Money::ZERO)
    }

    /// add `amount` to whatever is already recorded for `period`
    ///
    /// Saturates rather than overflowing; [`AdditionalPayments::validate`]
    /// rejects the result.
    pub fn add(&mut self, period: u32, amount: Money) {
        let entry = self.0.entry(period).or_insert(Money::ZERO);
        *entry = entry.saturating_add(amount);
    }

    /// fold another map into this one, summing colliding periods
    pub fn merge(&mut self, other: &AdditionalPayments) {
        for (&period, &amount) in other.0.iter() {
            self.add(period, amount);
        }
    }

    /// remove and return every entry after `period`
    pub fn drain_after(&mut self, period: u32) -> AdditionalPayments {
        match period.checked_add(1) {
            Some(next) => AdditionalPayments(self.0.split_off(&next)),
            None => AdditionalPayments::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// entries in increasing period order
    pub fn iter(&self) -> impl Iterator<Item = (u32, Money)> + '_ {
        self.0.iter().map(|(&period, &amount)| (period, amount))
    }

    pub fn periods(&self) -> Vec<u32> {
        self.0.keys().copied().collect()
    }

    pub fn total(&self) -> Money {
        self.0
            .values()
            .fold(Money::ZERO, |total, amount| total.saturating_add(*amount))
    }

    /// check periods against a schedule of `periods` rows and amounts against
    /// the additional payment rule
    pub fn validate(&self, periods: u32) -> Result<()> {
        for (period, amount) in self.iter() {
            if period == 0 || period > periods {
                return Err(LoanError::PeriodOutOfRange { period, periods });
            }
            validation::ADDITIONAL_PAYMENTS.check_number(amount.as_decimal())?;
        }
        Ok(())
    }
}

impl FromIterator<(u32, Money)> for AdditionalPayments {
    fn from_iter<I: IntoIterator<Item = (u32, Money)>>(iter: I) -> Self {
        let mut payments = AdditionalPayments::new();
        for (period, amount) in iter {
            payments.add(period, amount);
        }
        payments
    }
}

impl<const N: usize> From<[(u32, Money); N]> for AdditionalPayments {
    fn from(entries: [(u32, Money); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_missing_period_reads_as_zero() {
        let payments = AdditionalPayments::from([(3, Money::from_major(200))]);

        assert_eq!(payments.get(3), Money::from_major(200));
        assert_eq!(payments.get(4), Money::ZERO);
        assert_eq!(AdditionalPayments::new().get(1), Money::ZERO);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut payments = AdditionalPayments::from([
            (3, Money::from_major(200)),
            (4, Money::from_major(300)),
        ]);
        payments.merge(&AdditionalPayments::from([
            (4, Money::from_major(50)),
            (7, Money::from_major(10)),
        ]));

        assert_eq!(payments.get(3), Money::from_major(200));
        assert_eq!(payments.get(4), Money::from_major(350));
        assert_eq!(payments.get(7), Money::from_major(10));
        assert_eq!(payments.total(), Money::from_major(560));
        assert_eq!(payments.periods(), vec![3, 4, 7]);
    }

    #[test]
    fn test_merge_empty_is_noop() {
        let mut payments = AdditionalPayments::from([(3, Money::from_major(200))]);
        let before = payments.clone();

        payments.merge(&AdditionalPayments::new());
        assert_eq!(payments, before);
    }

    #[test]
    fn test_collect_sums_duplicate_periods() {
        let payments: AdditionalPayments = vec![
            (5, Money::from_major(100)),
            (5, Money::from_major(25)),
        ]
        .into_iter()
        .collect();

        assert_eq!(payments.len(), 1);
        assert_eq!(payments.get(5), Money::from_major(125));
    }

    #[test]
    fn test_accumulation_saturates_and_fails_validation() {
        let max = Money::from_decimal(rust_decimal::Decimal::MAX);
        let payments: AdditionalPayments = vec![(3, max), (3, max)].into_iter().collect();

        assert_eq!(payments.get(3), max);
        assert_eq!(payments.total(), max);
        assert_eq!(payments.validate(36).unwrap_err().kind(), ErrorKind::Range);

        let mut merged = AdditionalPayments::from([(3, Money::from_major(6_000_000_000))]);
        assert!(merged.validate(36).is_ok());
        merged.merge(&AdditionalPayments::from([(3, Money::from_major(6_000_000_000))]));
        assert_eq!(merged.validate(36).unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_drain_after() {
        let mut payments = AdditionalPayments::from([
            (3, Money::from_major(500)),
            (10, Money::from_major(1)),
            (12, Money::from_major(200)),
        ]);

        let dropped = payments.drain_after(10);
        assert_eq!(payments.periods(), vec![3, 10]);
        assert_eq!(dropped.periods(), vec![12]);
        assert!(payments.drain_after(u32::MAX).is_empty());
    }

    #[test]
    fn test_validate_against_schedule() {
        let payments = AdditionalPayments::from([(36, Money::from_major(500))]);
        assert!(payments.validate(36).is_ok());

        let err = payments.validate(35).unwrap_err();
        assert!(matches!(err, LoanError::PeriodOutOfRange { period: 36, periods: 35 }));
        assert_eq!(err.kind(), ErrorKind::Range);

        let zero_period = AdditionalPayments::from([(0, Money::from_major(1))]);
        assert!(zero_period.validate(36).is_err());

        let negative = AdditionalPayments::from([(2, Money::from_major(-1))]);
        assert_eq!(negative.validate(36).unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_serializes_as_period_keyed_object() {
        let payments = AdditionalPayments::from([(3, Money::from_major(200))]);
        let json = serde_json::to_value(&payments).unwrap();
        assert_eq!(json, serde_json::json!({"3": "200"}));

        let parsed: AdditionalPayments =
            serde_json::from_value(serde_json::json!({"3": 200, "4": 300.5})).unwrap();
        assert_eq!(parsed.get(4), Money::from_str_exact("300.5").unwrap());
    }
}
