use crate::decimal::{Money, Rate};

use super::{AdditionalPayments, Schedule, ScheduleRow};

/// balances handed from one period to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCarry {
    pub principal: Money,
    pub accrued_interest: Money,
}

impl PeriodCarry {
    /// carry into period 1: full principal, nothing accrued
    pub fn opening(principal: Money) -> Self {
        Self {
            principal,
            accrued_interest: Money::ZERO,
        }
    }
}

/// replays a contractual schedule with additional payments applied
///
/// Each period's installment plus any additional payment is applied against
/// principal, accrued interest and the period's interest, capped at the
/// amount owed. Excess is not carried forward as a credit.
#[derive(Debug, Clone, Copy)]
pub struct WaterfallReamortizer {
    period_rate: Rate,
}

impl WaterfallReamortizer {
    pub fn new(period_rate: Rate) -> Self {
        Self { period_rate }
    }

    /// rebuild the whole schedule from period 1
    ///
    /// An empty payment map returns the original schedule unchanged.
    pub fn reamortize(&self, original: &Schedule, additional: &AdditionalPayments) -> Schedule {
        let first = match original.row(1) {
            Some(first) if !additional.is_empty() => first,
            _ => return original.clone(),
        };

        let mut carry = PeriodCarry::opening(first.opening_principal);
        let mut rows = Vec::with_capacity(original.len());

        for scheduled in original.iter() {
            let (row, next) = self.apply_period(scheduled, carry, additional.get(scheduled.period));
            rows.push(row);
            carry = next;
        }

        tracing::debug!(
            periods = rows.len(),
            additional_total = %additional.total(),
            "re-amortized schedule"
        );

        Schedule::new(rows)
    }

    /// apply one period's payment to the carried balances
    pub fn apply_period(
        &self,
        scheduled: &ScheduleRow,
        carry: PeriodCarry,
        additional_pmt: Money,
    ) -> (ScheduleRow, PeriodCarry) {
        let opening_principal = carry.principal;
        let opening_accrued_interest = carry.accrued_interest;
        let current_period_interest = opening_principal.interest_at(self.period_rate);

        let owed = opening_principal + opening_accrued_interest + current_period_interest;
        let total_pmt = scheduled.scheduled_pmt().saturating_add(additional_pmt).min(owed);

        let closing_accrued_interest =
            (opening_accrued_interest + current_period_interest - total_pmt).floor_zero();
        let closing_principal = (owed - total_pmt).floor_zero();

        let row = ScheduleRow {
            due_date: scheduled.due_date,
            period: scheduled.period,
            opening_principal,
            opening_accrued_interest,
            current_period_interest,
            interest_pmt: scheduled.interest_pmt,
            principal_pmt: scheduled.principal_pmt,
            additional_pmt,
            total_pmt,
            closing_accrued_interest,
            closing_principal,
        };

        let next = PeriodCarry {
            principal: closing_principal,
            accrued_interest: closing_accrued_interest,
        };

        (row, next)
    }
}
