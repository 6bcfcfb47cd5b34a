use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::terms::LoanTerms;

use super::{Schedule, ScheduleRow, BALANCE_TOLERANCE};

/// builds the contractual schedule of a loan from its terms
pub struct ScheduleGenerator<'a> {
    terms: &'a LoanTerms,
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(terms: &'a LoanTerms) -> Self {
        Self { terms }
    }

    /// level-installment schedule with no additional payments
    ///
    /// The installment splits into `pmt * v^(n-k+1)` of principal and the
    /// remainder as interest, where `v = 1 / (1 + r)`. Working with the
    /// discount factor keeps every power at or below one, so long weekly
    /// schedules cannot overflow.
    pub fn generate(&self) -> Result<Schedule> {
        let terms = self.terms;
        let periods = terms.periods();
        let principal = terms.principal();
        let payment = terms.scheduled_payment();
        let discount = discount_factors(terms.period_rate(), periods);

        let mut rows = Vec::with_capacity(periods as usize);
        let mut opening_principal = principal;
        let mut cumulative_principal = Money::ZERO;

        for period in 1..=periods {
            let due_date = terms
                .frequency()
                .due_date(terms.disbursement_date(), period)
                .ok_or_else(|| LoanError::OutOfRange {
                    field: "disbursement_date".to_string(),
                    message: format!("due date of period {period} is not a representable date"),
                })?;

            let remaining = (periods - period + 1) as usize;
            let principal_pmt = payment * discount[remaining];
            let interest_pmt = payment - principal_pmt;

            cumulative_principal += principal_pmt;
            let closing_principal = principal - cumulative_principal;

            rows.push(ScheduleRow {
                due_date,
                period,
                opening_principal,
                opening_accrued_interest: Money::ZERO,
                current_period_interest: interest_pmt,
                interest_pmt,
                principal_pmt,
                additional_pmt: Money::ZERO,
                total_pmt: interest_pmt + principal_pmt,
                closing_accrued_interest: Money::ZERO,
                closing_principal,
            });

            opening_principal = closing_principal;
        }

        settle_final_row(&mut rows);

        tracing::debug!(
            periods,
            payment = %payment.round_dp(2),
            "generated original schedule"
        );

        Ok(Schedule::new(rows))
    }
}

/// level installment that repays `principal` over `periods` at `period_rate`
///
/// Straight-line `principal / periods` when the rate is zero.
pub fn annuity_payment(principal: Money, period_rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return principal;
    }

    if period_rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    let discount = discount_factors(period_rate, periods);
    let annuity_factor = Decimal::ONE - discount[periods as usize];

    principal * period_rate.as_decimal() / annuity_factor
}

/// `v^0 ..= v^periods` for `v = 1 / (1 + period_rate)`
fn discount_factors(period_rate: Rate, periods: u32) -> Vec<Decimal> {
    let v = Decimal::ONE / (Decimal::ONE + period_rate.as_decimal());

    let mut factors = Vec::with_capacity(periods as usize + 1);
    let mut factor = Decimal::ONE;
    factors.push(factor);
    for _ in 0..periods {
        factor *= v;
        factors.push(factor);
    }
    factors
}

/// fold residue left by decimal division into the final principal portion
fn settle_final_row(rows: &mut [ScheduleRow]) {
    if let Some(last) = rows.last_mut() {
        let residue = last.closing_principal;
        if !residue.is_zero() && residue.abs().as_decimal() <= BALANCE_TOLERANCE {
            last.principal_pmt += residue;
            last.total_pmt = last.interest_pmt + last.principal_pmt;
            last.closing_principal = Money::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanConfig;
    use crate::types::PaymentFrequency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn terms(rate: Decimal, term: Decimal, frequency: PaymentFrequency) -> LoanTerms {
        let config = LoanConfig::new(
            Money::from_major(20_000),
            Rate::from_decimal(rate),
            term,
            NaiveDate::from_ymd_opt(2022, 12, 12).unwrap(),
        )
        .with_frequency(frequency);
        LoanTerms::from_config(&config).unwrap()
    }

    #[test]
    fn test_row_count_and_dates() {
        let terms = terms(dec!(0.0599), dec!(36), PaymentFrequency::Monthly);
        let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

        assert_eq!(schedule.len(), 36);
        assert_eq!(schedule.row(1).unwrap().due_date, NaiveDate::from_ymd_opt(2023, 1, 12).unwrap());
        assert_eq!(schedule.row(36).unwrap().due_date, NaiveDate::from_ymd_opt(2025, 12, 12).unwrap());

        for (index, row) in schedule.iter().enumerate() {
            assert_eq!(row.period as usize, index + 1);
        }
    }

    #[test]
    fn test_quarterly_rows_fall_on_quarter_ends() {
        let terms = terms(dec!(0.1099), dec!(84), PaymentFrequency::Quarterly);
        let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

        assert_eq!(schedule.len(), 28);
        assert_eq!(schedule.row(1).unwrap().due_date, NaiveDate::from_ymd_opt(2023, 3, 31).unwrap());
        assert_eq!(schedule.row(28).unwrap().due_date, NaiveDate::from_ymd_opt(2029, 12, 31).unwrap());
    }

    #[test]
    fn test_principal_fully_amortized() {
        for frequency in PaymentFrequency::ALL {
            let terms = terms(dec!(0.1099), dec!(60), frequency);
            let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

            let repaid: Money = schedule.iter().map(|row| row.principal_pmt).sum();
            assert!((repaid - terms.principal()).abs().as_decimal() <= BALANCE_TOLERANCE);
            assert_eq!(schedule.last().unwrap().closing_principal, Money::ZERO);
        }
    }

    #[test]
    fn test_rows_chain_and_balance() {
        let terms = terms(dec!(0.0599), dec!(60), PaymentFrequency::Weekly);
        let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

        assert_eq!(schedule.row(1).unwrap().opening_principal, terms.principal());
        for pair in schedule.rows().windows(2) {
            assert_eq!(pair[1].opening_principal, pair[0].closing_principal);
        }

        for row in schedule.iter() {
            assert_eq!(row.total_pmt, row.interest_pmt + row.principal_pmt);
            assert_eq!(row.additional_pmt, Money::ZERO);
            assert_eq!(row.opening_accrued_interest, Money::ZERO);
            assert_eq!(row.closing_accrued_interest, Money::ZERO);
            assert!(!row.interest_pmt.is_negative());
            assert!(!row.closing_principal.is_negative());
        }
    }

    #[test]
    fn test_interest_matches_declining_balance() {
        let terms = terms(dec!(0.0599), dec!(36), PaymentFrequency::Monthly);
        let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

        for row in schedule.iter() {
            let expected = row.opening_principal.interest_at(terms.period_rate());
            assert!((row.interest_pmt - expected).abs().as_decimal() < dec!(0.0000001));
        }

        let first = schedule.row(1).unwrap();
        assert_eq!(first.interest_pmt.round_dp(2), Money::from_str_exact("99.83").unwrap());
        assert_eq!(first.principal_pmt.round_dp(2), Money::from_str_exact("508.51").unwrap());
    }

    #[test]
    fn test_zero_rate_schedule() {
        let terms = terms(Decimal::ZERO, dec!(12), PaymentFrequency::Monthly);
        let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

        for row in schedule.iter() {
            assert_eq!(row.interest_pmt, Money::ZERO);
        }
        assert_eq!(schedule.last().unwrap().closing_principal, Money::ZERO);
    }

    #[test]
    fn test_annuity_payment_edge_cases() {
        let principal = Money::from_major(1_200);
        assert_eq!(annuity_payment(principal, Rate::ZERO, 12), Money::from_major(100));
        assert_eq!(annuity_payment(principal, Rate::from_percentage(1), 0), principal);

        // single period repays principal plus one period of interest
        let single = annuity_payment(principal, Rate::from_percentage(1), 1);
        assert_eq!(single.round_dp(8), Money::from_major(1_212));
    }

    #[test]
    fn test_longest_weekly_schedule_does_not_overflow() {
        let config = LoanConfig::new(
            Money::from_major(10_000_000_000),
            Rate::ONE,
            dec!(1200),
            NaiveDate::from_ymd_opt(2022, 12, 12).unwrap(),
        )
        .with_frequency(PaymentFrequency::Weekly);
        let terms = LoanTerms::from_config(&config).unwrap();
        let schedule = ScheduleGenerator::new(&terms).generate().unwrap();

        assert_eq!(schedule.len(), 5143);
        assert_eq!(schedule.last().unwrap().closing_principal, Money::ZERO);
    }
}
