use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::LoanError;

/// unique identifier for a loan instance
pub type LoanId = Uuid;

/// repayment frequency, keyed by its short code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFrequency {
    #[serde(rename = "W")]
    Weekly,
    #[serde(rename = "2W")]
    Biweekly,
    #[serde(rename = "M")]
    Monthly,
    #[serde(rename = "BM")]
    Bimonthly,
    #[serde(rename = "Q")]
    Quarterly,
    #[serde(rename = "H")]
    Semiannual,
    #[serde(rename = "Y")]
    Annual,
}

/// calendar distance between two consecutive due dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodOffset {
    Days(u32),
    Months(u32),
    /// month ends, stepping `months` from the first month end on or after
    /// the start whose month is a multiple of `align`
    PeriodEnds { months: u32, align: u32 },
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 7] = [
        PaymentFrequency::Weekly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Monthly,
        PaymentFrequency::Bimonthly,
        PaymentFrequency::Quarterly,
        PaymentFrequency::Semiannual,
        PaymentFrequency::Annual,
    ];

    /// valid frequency codes, in the order of [`PaymentFrequency::ALL`]
    pub const CODES: [&'static str; 7] = ["W", "2W", "M", "BM", "Q", "H", "Y"];

    pub fn code(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "W",
            PaymentFrequency::Biweekly => "2W",
            PaymentFrequency::Monthly => "M",
            PaymentFrequency::Bimonthly => "BM",
            PaymentFrequency::Quarterly => "Q",
            PaymentFrequency::Semiannual => "H",
            PaymentFrequency::Annual => "Y",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "Weekly payments",
            PaymentFrequency::Biweekly => "Fortnightly payments",
            PaymentFrequency::Monthly => "Monthly payments",
            PaymentFrequency::Bimonthly => "Bi-monthly payments",
            PaymentFrequency::Quarterly => "Quarterly payments",
            PaymentFrequency::Semiannual => "Semi-annual payments",
            PaymentFrequency::Annual => "Annual payments",
        }
    }

    /// length of one period in months as an exact `(numerator, denominator)`
    /// pair; weeks count as 7/30 of a month
    pub fn month_fraction(&self) -> (u32, u32) {
        match self {
            PaymentFrequency::Weekly => (7, 30),
            PaymentFrequency::Biweekly => (14, 30),
            PaymentFrequency::Monthly => (1, 1),
            PaymentFrequency::Bimonthly => (2, 1),
            PaymentFrequency::Quarterly => (3, 1),
            PaymentFrequency::Semiannual => (6, 1),
            PaymentFrequency::Annual => (12, 1),
        }
    }

    pub fn offset(&self) -> PeriodOffset {
        match self {
            PaymentFrequency::Weekly => PeriodOffset::Days(7),
            PaymentFrequency::Biweekly => PeriodOffset::Days(14),
            PaymentFrequency::Monthly => PeriodOffset::Months(1),
            PaymentFrequency::Bimonthly => PeriodOffset::Months(2),
            PaymentFrequency::Quarterly => PeriodOffset::PeriodEnds { months: 3, align: 3 },
            PaymentFrequency::Semiannual => PeriodOffset::PeriodEnds { months: 6, align: 3 },
            PaymentFrequency::Annual => PeriodOffset::PeriodEnds { months: 12, align: 12 },
        }
    }

    /// due date of `period`, counted in whole offsets from `start`
    ///
    /// Month offsets are anchored on `start` rather than chained, so a loan
    /// disbursed on the 31st falls due on the last day of short months and
    /// returns to the 31st afterwards. Quarterly and semiannual loans fall due
    /// on calendar quarter ends and annual loans on year ends, counted from
    /// the first one on or after `start`.
    pub fn due_date(&self, start: NaiveDate, period: u32) -> Option<NaiveDate> {
        match self.offset() {
            PeriodOffset::Days(days) => {
                start.checked_add_days(Days::new(u64::from(days) * u64::from(period)))
            }
            PeriodOffset::Months(months) => {
                start.checked_add_months(Months::new(months.checked_mul(period)?))
            }
            PeriodOffset::PeriodEnds { months, align } => {
                let anchor = start.month().div_ceil(align) * align;
                let step = i32::try_from(months.checked_mul(period)?).ok()?;
                let index = start
                    .year()
                    .checked_mul(12)?
                    .checked_add(i32::try_from(anchor).ok()? - 1)?
                    .checked_add(step)?;
                last_day_of_month(index.div_euclid(12), index.rem_euclid(12).unsigned_abs() + 1)
            }
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

impl Default for PaymentFrequency {
    fn default() -> Self {
        PaymentFrequency::Monthly
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PaymentFrequency {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentFrequency::ALL
            .iter()
            .copied()
            .find(|freq| freq.code() == s)
            .ok_or_else(|| LoanError::UnknownFrequency {
                code: s.to_string(),
            })
    }
}

/// payment state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// accepting additional payments
    Active,
    /// paid off in full ahead of schedule; further mutations are rejected
    FullyPrepaid,
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Active
    }
}
