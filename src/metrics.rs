use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::payments::{Schedule, BALANCE_TOLERANCE};
use crate::types::PaymentFrequency;

/// weighted average life of a schedule, in months
///
/// Each period's principal reduction is weighted by its period number and
/// the result converted from periods to months. Zero for a zero principal.
pub fn weighted_average_life(schedule: &Schedule, principal: Money, frequency: PaymentFrequency) -> Decimal {
    if principal.is_zero() {
        return Decimal::ZERO;
    }

    let weighted: Decimal = schedule
        .iter()
        .map(|row| row.principal_repaid().as_decimal() * Decimal::from(row.period))
        .sum();

    let (num, den) = frequency.month_fraction();
    weighted * Decimal::from(num) / Decimal::from(den) / principal.as_decimal()
}

/// annual rate plus the origination fee spread over the life in years
///
/// Falls back to the nominal rate when the life is zero.
pub fn annual_percentage_rate(interest_rate: Rate, fees_pct: Rate, wal_months: Decimal) -> Rate {
    if wal_months <= Decimal::ZERO {
        return interest_rate;
    }

    let wal_years = wal_months / Decimal::from(12);
    Rate::from_decimal(interest_rate.as_decimal() + fees_pct.as_decimal() / wal_years)
}

/// first period whose closing principal is at or below [`BALANCE_TOLERANCE`]
pub fn maturity_period(schedule: &Schedule) -> Option<u32> {
    schedule
        .iter()
        .find(|row| row.closing_principal.as_decimal() <= BALANCE_TOLERANCE)
        .map(|row| row.period)
}
