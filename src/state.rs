use serde::Serialize;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::payments::{AdditionalPayments, Schedule};
use crate::types::LoanStatus;

/// mutable cashflow state of a loan
///
/// The original schedule is set once at construction and only read after
/// that; the updated schedule is replaced wholesale on every re-amortization.
#[derive(Debug, Clone, Serialize)]
pub struct LoanState {
    status: LoanStatus,
    additional_payments: AdditionalPayments,
    original_cfs: Schedule,
    updated_cfs: Schedule,
    prepaid_period: Option<u32>,
}

impl LoanState {
    pub fn new(original_cfs: Schedule, updated_cfs: Schedule, additional_payments: AdditionalPayments) -> Self {
        Self {
            status: LoanStatus::Active,
            additional_payments,
            original_cfs,
            updated_cfs,
            prepaid_period: None,
        }
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn is_fully_prepaid(&self) -> bool {
        self.status == LoanStatus::FullyPrepaid
    }

    pub fn additional_payments(&self) -> &AdditionalPayments {
        &self.additional_payments
    }

    pub fn original_cfs(&self) -> &Schedule {
        &self.original_cfs
    }

    pub fn updated_cfs(&self) -> &Schedule {
        &self.updated_cfs
    }

    /// period the loan was paid off at, if prepaid
    pub fn prepaid_period(&self) -> Option<u32> {
        self.prepaid_period
    }

    /// reject mutations once the loan is fully prepaid
    pub fn ensure_active(&self, message: &str) -> Result<()> {
        match self.status {
            LoanStatus::Active => Ok(()),
            status => Err(LoanError::TerminalState {
                status,
                message: message.to_string(),
            }),
        }
    }

    pub fn replace_payments(&mut self, payments: AdditionalPayments) {
        self.additional_payments = payments;
    }

    pub fn replace_updated(&mut self, schedule: Schedule) {
        self.updated_cfs = schedule;
    }

    /// add the payoff at `period` and return the entries after it
    pub fn record_payoff(&mut self, period: u32, payoff: Money) -> AdditionalPayments {
        self.additional_payments.add(period, payoff);
        self.additional_payments.drain_after(period)
    }

    pub fn mark_fully_prepaid(&mut self, period: u32) {
        self.status = LoanStatus::FullyPrepaid;
        self.prepaid_period = Some(period);
    }

    /// clear the payment map and return to active, handing back what was cleared
    pub fn reset(&mut self) -> AdditionalPayments {
        self.status = LoanStatus::Active;
        self.prepaid_period = None;
        std::mem::take(&mut self.additional_payments)
    }
}
