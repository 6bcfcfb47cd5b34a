pub mod additional;
pub mod amortization;
pub mod waterfall;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

pub use additional::AdditionalPayments;
pub use amortization::{annuity_payment, ScheduleGenerator};
pub use waterfall::{PeriodCarry, WaterfallReamortizer};

/// balances at or below this are treated as repaid
pub const BALANCE_TOLERANCE: Decimal = dec!(0.000000001);

/// one period of a cashflow schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub due_date: NaiveDate,
    pub period: u32,
    pub opening_principal: Money,
    pub opening_accrued_interest: Money,
    pub current_period_interest: Money,
    /// interest portion of the contractual installment
    pub interest_pmt: Money,
    /// principal portion of the contractual installment
    pub principal_pmt: Money,
    pub additional_pmt: Money,
    /// amount actually applied, capped at what is owed
    pub total_pmt: Money,
    pub closing_accrued_interest: Money,
    pub closing_principal: Money,
}

impl ScheduleRow {
    /// principal + accrued interest + this period's interest
    pub fn amount_owed(&self) -> Money {
        self.opening_principal + self.opening_accrued_interest + self.current_period_interest
    }

    /// contractual installment for the period
    pub fn scheduled_pmt(&self) -> Money {
        self.interest_pmt + self.principal_pmt
    }

    /// principal retired during the period
    pub fn principal_repaid(&self) -> Money {
        self.opening_principal - self.closing_principal
    }
}

/// ordered sequence of schedule rows, period 1 first
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// row for a 1-based period
    pub fn row(&self, period: u32) -> Option<&ScheduleRow> {
        let index = period.checked_sub(1)?;
        self.rows.get(index as usize)
    }

    pub fn last(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }

    /// principal outstanding immediately before `period` is paid
    pub fn balance_before(&self, period: u32) -> Option<Money> {
        self.row(period).map(|row| row.opening_principal)
    }

    pub fn total_interest(&self) -> Money {
        self.rows.iter().map(|row| row.current_period_interest).sum()
    }

    pub fn total_paid(&self) -> Money {
        self.rows.iter().map(|row| row.total_pmt).sum()
    }

    pub fn total_additional(&self) -> Money {
        self.rows.iter().map(|row| row.additional_pmt).sum()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
