/// serialization support for loans
use rust_decimal::Decimal;
use serde::Serialize;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::loan::Loan;
use crate::payments::{AdditionalPayments, Schedule};
use crate::terms::LoanTerms;
use crate::types::{LoanId, LoanStatus};

/// serializable view of a loan's terms, state and schedules
#[derive(Debug, Serialize)]
pub struct LoanView<'a> {
    pub id: LoanId,
    pub status: LoanStatus,
    pub fully_prepaid: bool,
    pub prepaid_period: Option<u32>,
    pub terms: &'a LoanTerms,
    pub metrics: MetricsView,
    pub additional_payments: &'a AdditionalPayments,
    pub original_cfs: &'a Schedule,
    pub updated_cfs: &'a Schedule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub org_wal: Decimal,
    pub org_apr: Rate,
    pub org_maturity_period: u32,
    pub mod_wal: Decimal,
    pub mod_apr: Rate,
    pub mod_maturity_period: u32,
    pub interest_savings: Money,
}

impl MetricsView {
    pub fn from_loan(loan: &Loan) -> Self {
        MetricsView {
            org_wal: loan.org_wal(),
            org_apr: loan.org_apr(),
            org_maturity_period: loan.org_maturity_period(),
            mod_wal: loan.mod_wal(),
            mod_apr: loan.mod_apr(),
            mod_maturity_period: loan.mod_maturity_period(),
            interest_savings: loan.interest_savings(),
        }
    }
}

impl<'a> LoanView<'a> {
    pub fn from_loan(loan: &'a Loan) -> Self {
        LoanView {
            id: loan.id(),
            status: loan.status(),
            fully_prepaid: loan.is_fully_prepaid(),
            prepaid_period: loan.prepaid_period(),
            terms: loan.terms(),
            metrics: MetricsView::from_loan(loan),
            additional_payments: loan.additional_payments(),
            original_cfs: loan.original_cfs(),
            updated_cfs: loan.updated_cfs(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Loan {
    pub fn view(&self) -> LoanView<'_> {
        LoanView::from_loan(self)
    }

    /// pretty-printed json of the full loan view
    pub fn to_json_pretty(&self) -> Result<String> {
        self.view().to_json_pretty()
    }

    /// short alias for [`Loan::to_json_pretty`]
    pub fn json(&self) -> Result<String> {
        self.to_json_pretty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanConfig;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    fn loan() -> Loan {
        let config = LoanConfig::new(
            Money::from_major(20_000),
            Rate::from_decimal(dec!(0.0599)),
            dec!(12),
            NaiveDate::from_ymd_opt(2022, 12, 12).unwrap(),
        )
        .with_additional_payments(AdditionalPayments::from([(3, Money::from_major(200))]));
        Loan::new(config).unwrap()
    }

    #[test]
    fn test_json_contains_schedules_and_metrics() {
        let loan = loan();
        let json: Value = serde_json::from_str(&loan.json().unwrap()).unwrap();

        assert_eq!(json["status"], "Active");
        assert_eq!(json["fully_prepaid"], false);
        assert_eq!(json["terms"]["frequency"], "M");
        assert_eq!(json["terms"]["periods"], 12);
        assert_eq!(json["metrics"]["org_maturity_period"], 12);
        assert_eq!(json["additional_payments"]["3"], "200");
        assert_eq!(json["original_cfs"].as_array().unwrap().len(), 12);
        assert_eq!(json["updated_cfs"][0]["due_date"], "2023-01-12");
        assert_eq!(json["updated_cfs"][2]["additional_pmt"], "200");
    }

    #[test]
    fn test_view_reflects_prepayment() {
        let mut loan = loan();
        loan.prepay_fully(6).unwrap();

        let view = loan.view();
        assert!(view.fully_prepaid);
        assert_eq!(view.prepaid_period, Some(6));
        assert_eq!(view.metrics.mod_maturity_period, 6);
        assert_eq!(loan.to_json_pretty().unwrap(), loan.json().unwrap());
    }
}
