use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::AdditionalPayments;
use crate::types::PaymentFrequency;
use crate::validation;

/// channels the pricing models know about; others are accepted
pub const RECOMMENDED_CHANNELS: [&str; 2] = ["free", "paid"];

/// loan construction inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    pub principal: Money,
    /// nominal annual rate as a fraction
    pub interest_rate: Rate,
    pub term_in_months: Decimal,
    pub disbursement_date: NaiveDate,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    /// origination fee as a fraction of principal
    #[serde(default)]
    pub fees_pct: Rate,
    #[serde(default)]
    pub additional_payments: AdditionalPayments,
    /// risk segment tag
    #[serde(default = "default_segment")]
    pub segment: String,
    /// origination channel tag
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_segment() -> String {
    "c".to_string()
}

fn default_channel() -> String {
    "free".to_string()
}

impl LoanConfig {
    /// monthly loan with no fee and no additional payments
    pub fn new(principal: Money, interest_rate: Rate, term_in_months: Decimal, disbursement_date: NaiveDate) -> Self {
        Self {
            principal,
            interest_rate,
            term_in_months,
            disbursement_date,
            frequency: PaymentFrequency::default(),
            fees_pct: Rate::ZERO,
            additional_payments: AdditionalPayments::new(),
            segment: default_segment(),
            channel: default_channel(),
        }
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_interest_rate(mut self, interest_rate: Rate) -> Self {
        self.interest_rate = interest_rate;
        self
    }

    pub fn with_fees_pct(mut self, fees_pct: Rate) -> Self {
        self.fees_pct = fees_pct;
        self
    }

    pub fn with_additional_payments(mut self, additional_payments: AdditionalPayments) -> Self {
        self.additional_payments = additional_payments;
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = segment.into();
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// parse and validate a JSON loan document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_value(&document)
    }

    /// validate a JSON value against the field table, then deserialize
    pub fn from_value(document: &Value) -> Result<Self> {
        validation::validate_document(document)?;
        let config: LoanConfig = serde_json::from_value(document.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// range-check an already typed config
    ///
    /// Additional payment periods are checked against the schedule once the
    /// period count is known.
    pub fn validate(&self) -> Result<()> {
        validation::PRINCIPAL.check_number(self.principal.as_decimal())?;
        validation::INTEREST_RATE.check_number(self.interest_rate.as_decimal())?;
        validation::TERM_IN_MONTHS.check_number(self.term_in_months)?;
        validation::FEES_PCT.check_number(self.fees_pct.as_decimal())?;

        for (_, amount) in self.additional_payments.iter() {
            validation::ADDITIONAL_PAYMENTS.check_number(amount.as_decimal())?;
        }

        if !RECOMMENDED_CHANNELS.contains(&self.channel.as_str()) {
            tracing::debug!(channel = %self.channel, "channel outside the recommended set");
        }

        Ok(())
    }
}
