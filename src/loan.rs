use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::config::LoanConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{EventStore, LoanEvent};
use crate::metrics;
use crate::payments::{AdditionalPayments, Schedule, ScheduleGenerator, WaterfallReamortizer};
use crate::state::LoanState;
use crate::terms::LoanTerms;
use crate::types::{LoanId, LoanStatus, PaymentFrequency};

const ALREADY_PREPAID: &str = "Loan is already pre-paid fully";
const NO_PAYMENTS_AFTER_PREPAY: &str = "Loan already fully pre-paid. Cannot make additional payments";

/// a single installment loan with its original and amended schedules
#[derive(Debug, Clone)]
pub struct Loan {
    id: LoanId,
    terms: LoanTerms,
    state: LoanState,
    events: EventStore,
}

impl Loan {
    /// validate the config and compute both schedules
    pub fn new(config: LoanConfig) -> Result<Self> {
        let terms = LoanTerms::from_config(&config)?;
        config.additional_payments.validate(terms.periods())?;

        let original = ScheduleGenerator::new(&terms).generate()?;
        let updated = WaterfallReamortizer::new(terms.period_rate()).reamortize(&original, &config.additional_payments);

        let id = Uuid::new_v4();
        let mut loan = Self {
            id,
            state: LoanState::new(original, updated, config.additional_payments),
            terms,
            events: EventStore::new(),
        };

        tracing::info!(
            loan_id = %id,
            principal = %loan.terms.principal(),
            frequency = %loan.terms.frequency(),
            periods = loan.terms.periods(),
            "loan originated"
        );

        loan.events.emit(LoanEvent::LoanOriginated {
            loan_id: id,
            principal: loan.terms.principal(),
            frequency: loan.terms.frequency(),
            periods: loan.terms.periods(),
            scheduled_payment: loan.terms.scheduled_payment(),
        });

        Ok(loan)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(LoanConfig::from_json_str(json)?)
    }

    pub fn from_value(document: &Value) -> Result<Self> {
        Self::new(LoanConfig::from_value(document)?)
    }

    /// builder for creating loans
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn status(&self) -> LoanStatus {
        self.state.status()
    }

    pub fn is_fully_prepaid(&self) -> bool {
        self.state.is_fully_prepaid()
    }

    /// period the loan was paid off at, if prepaid
    pub fn prepaid_period(&self) -> Option<u32> {
        self.state.prepaid_period()
    }

    pub fn additional_payments(&self) -> &AdditionalPayments {
        self.state.additional_payments()
    }

    /// contractual schedule, fixed at construction
    pub fn original_cfs(&self) -> &Schedule {
        self.state.original_cfs()
    }

    /// schedule with the current additional payments applied
    pub fn updated_cfs(&self) -> &Schedule {
        self.state.updated_cfs()
    }

    pub fn scheduled_payment(&self) -> Money {
        self.terms.scheduled_payment()
    }

    pub fn periods(&self) -> u32 {
        self.terms.periods()
    }

    pub fn period_rate(&self) -> Rate {
        self.terms.period_rate()
    }

    // metrics

    /// weighted average life of the original schedule, in months
    pub fn org_wal(&self) -> Decimal {
        self.wal_of(self.original_cfs())
    }

    pub fn org_apr(&self) -> Rate {
        self.apr_for(self.org_wal())
    }

    pub fn org_maturity_period(&self) -> u32 {
        self.terms.periods()
    }

    /// weighted average life of the updated schedule, in months
    pub fn mod_wal(&self) -> Decimal {
        self.wal_of(self.updated_cfs())
    }

    pub fn mod_apr(&self) -> Rate {
        self.apr_for(self.mod_wal())
    }

    /// first period the updated schedule is repaid, or the full term
    pub fn mod_maturity_period(&self) -> u32 {
        metrics::maturity_period(self.updated_cfs()).unwrap_or(self.terms.periods())
    }

    /// interest avoided by the additional payments
    pub fn interest_savings(&self) -> Money {
        self.original_cfs().total_interest() - self.updated_cfs().total_interest()
    }

    /// what the updated schedule would be under `payments` alone
    ///
    /// Does not touch the loan's own payments or schedules.
    pub fn preview_schedule(&self, payments: &AdditionalPayments) -> Result<Schedule> {
        payments.validate(self.terms.periods())?;
        Ok(self.reamortizer().reamortize(self.original_cfs(), payments))
    }

    // payment state

    /// merge `payments` into the loan's additional payments and re-amortize
    pub fn update_additional_payments(&mut self, payments: &AdditionalPayments) -> Result<()> {
        self.guard_active("update_additional_payments", NO_PAYMENTS_AFTER_PREPAY)?;
        payments.validate(self.terms.periods())?;

        let mut merged = self.additional_payments().clone();
        merged.merge(payments);
        merged.validate(self.terms.periods())?;

        self.state.replace_payments(merged);
        self.reamortize();

        tracing::info!(
            loan_id = %self.id,
            periods = ?payments.periods(),
            total = %payments.total(),
            "additional payments applied"
        );
        self.events.emit(LoanEvent::AdditionalPaymentsApplied {
            loan_id: self.id,
            payments: payments.clone(),
            total: payments.total(),
        });

        Ok(())
    }

    /// pay the loan off in full at `period`, returning the payoff amount
    ///
    /// The payoff is the balance outstanding immediately before `period`.
    /// Additional payments recorded after `period` are dropped.
    pub fn prepay_fully(&mut self, period: u32) -> Result<Money> {
        self.guard_active("prepay_fully", ALREADY_PREPAID)?;

        let payoff = self
            .updated_cfs()
            .balance_before(period)
            .ok_or(LoanError::PeriodOutOfRange {
                period,
                periods: self.terms.periods(),
            })?;

        let dropped = self.state.record_payoff(period, payoff);
        if !dropped.is_empty() {
            tracing::warn!(
                loan_id = %self.id,
                period,
                dropped = ?dropped.periods(),
                "dropping additional payments after full prepayment"
            );
        }

        self.reamortize();
        self.state.mark_fully_prepaid(period);

        tracing::info!(loan_id = %self.id, period, payoff = %payoff.round_dp(2), "loan prepaid in full");
        self.events.emit(LoanEvent::LoanPrepaid {
            loan_id: self.id,
            period,
            payoff,
            dropped,
        });

        Ok(payoff)
    }

    /// clear every additional payment and return the loan to active
    pub fn reset_additional_payments(&mut self) {
        let cleared = self.state.reset();
        self.reamortize();

        tracing::info!(loan_id = %self.id, cleared = cleared.len(), "additional payments reset");
        self.events.emit(LoanEvent::AdditionalPaymentsReset {
            loan_id: self.id,
            cleared,
        });
    }

    pub fn events(&self) -> &[LoanEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<LoanEvent> {
        self.events.take_events()
    }

    fn guard_active(&mut self, operation: &str, message: &str) -> Result<()> {
        let result = self.state.ensure_active(message);
        if result.is_err() {
            tracing::warn!(loan_id = %self.id, operation, "rejected mutation of prepaid loan");
            self.events.emit(LoanEvent::MutationRejected {
                loan_id: self.id,
                operation: operation.to_string(),
                status: self.state.status(),
            });
        }
        result
    }

    /// rebuild the updated schedule; a prepaid loan keeps its frozen schedule
    fn reamortize(&mut self) {
        if self.state.is_fully_prepaid() {
            tracing::debug!(loan_id = %self.id, "skipping re-amortization of prepaid loan");
            return;
        }

        let updated = self
            .reamortizer()
            .reamortize(self.state.original_cfs(), self.state.additional_payments());
        self.state.replace_updated(updated);

        self.events.emit(LoanEvent::ScheduleReamortized {
            loan_id: self.id,
            maturity_period: self.mod_maturity_period(),
            total_interest: self.updated_cfs().total_interest(),
        });
    }

    fn reamortizer(&self) -> WaterfallReamortizer {
        WaterfallReamortizer::new(self.terms.period_rate())
    }

    fn wal_of(&self, schedule: &Schedule) -> Decimal {
        metrics::weighted_average_life(schedule, self.terms.principal(), self.terms.frequency())
    }

    fn apr_for(&self, wal: Decimal) -> Rate {
        metrics::annual_percentage_rate(self.terms.interest_rate(), self.terms.fees_pct(), wal)
    }
}

/// builder for [`Loan`]
#[derive(Debug, Default)]
pub struct LoanBuilder {
    principal: Option<Money>,
    interest_rate: Option<Rate>,
    term_in_months: Option<Decimal>,
    disbursement_date: Option<NaiveDate>,
    frequency: Option<PaymentFrequency>,
    fees_pct: Option<Rate>,
    additional_payments: Option<AdditionalPayments>,
    segment: Option<String>,
    channel: Option<String>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn interest_rate(mut self, rate: Rate) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn term_in_months(mut self, term: Decimal) -> Self {
        self.term_in_months = Some(term);
        self
    }

    pub fn disbursement_date(mut self, date: NaiveDate) -> Self {
        self.disbursement_date = Some(date);
        self
    }

    pub fn frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn fees_pct(mut self, fees_pct: Rate) -> Self {
        self.fees_pct = Some(fees_pct);
        self
    }

    pub fn additional_payments(mut self, payments: AdditionalPayments) -> Self {
        self.additional_payments = Some(payments);
        self
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn build(self) -> Result<Loan> {
        let principal = self.principal.ok_or_else(|| missing("principal"))?;
        let interest_rate = self.interest_rate.ok_or_else(|| missing("interest_rate"))?;
        let term_in_months = self.term_in_months.ok_or_else(|| missing("term_in_months"))?;
        let disbursement_date = self.disbursement_date.ok_or_else(|| missing("disbursement_date"))?;

        let mut config = LoanConfig::new(principal, interest_rate, term_in_months, disbursement_date);
        if let Some(frequency) = self.frequency {
            config = config.with_frequency(frequency);
        }
        if let Some(fees_pct) = self.fees_pct {
            config = config.with_fees_pct(fees_pct);
        }
        if let Some(payments) = self.additional_payments {
            config = config.with_additional_payments(payments);
        }
        if let Some(segment) = self.segment {
            config = config.with_segment(segment);
        }
        if let Some(channel) = self.channel {
            config = config.with_channel(channel);
        }

        Loan::new(config)
    }
}

fn missing(field: &str) -> LoanError {
    LoanError::MissingField {
        field: field.to_string(),
    }
}
