use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::payments::AdditionalPayments;
use crate::types::{LoanId, LoanStatus, PaymentFrequency};

/// all events that can be emitted by a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoanEvent {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        frequency: PaymentFrequency,
        periods: u32,
        scheduled_payment: Money,
    },

    // additional payment events
    AdditionalPaymentsApplied {
        loan_id: LoanId,
        payments: AdditionalPayments,
        total: Money,
    },
    AdditionalPaymentsReset {
        loan_id: LoanId,
        cleared: AdditionalPayments,
    },

    // schedule events
    ScheduleReamortized {
        loan_id: LoanId,
        maturity_period: u32,
        total_interest: Money,
    },

    // prepayment events
    LoanPrepaid {
        loan_id: LoanId,
        period: u32,
        payoff: Money,
        /// entries after the prepayment period that no longer apply
        dropped: AdditionalPayments,
    },

    // rejected operations
    MutationRejected {
        loan_id: LoanId,
        operation: String,
        status: LoanStatus,
    },
}

impl LoanEvent {
    pub fn loan_id(&self) -> LoanId {
        match self {
            LoanEvent::LoanOriginated { loan_id, .. }
            | LoanEvent::AdditionalPaymentsApplied { loan_id, .. }
            | LoanEvent::AdditionalPaymentsReset { loan_id, .. }
            | LoanEvent::ScheduleReamortized { loan_id, .. }
            | LoanEvent::LoanPrepaid { loan_id, .. }
            | LoanEvent::MutationRejected { loan_id, .. } => *loan_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<LoanEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LoanEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LoanEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LoanEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_take_events_drains_store() {
        let loan_id = Uuid::new_v4();
        let mut store = EventStore::new();
        store.emit(LoanEvent::AdditionalPaymentsReset {
            loan_id,
            cleared: AdditionalPayments::new(),
        });
        store.emit(LoanEvent::MutationRejected {
            loan_id,
            operation: "prepay_fully".to_string(),
            status: LoanStatus::FullyPrepaid,
        });

        assert_eq!(store.events().len(), 2);
        let taken = store.take_events();
        assert_eq!(taken.len(), 2);
        assert!(taken.iter().all(|event| event.loan_id() == loan_id));
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_event_serializes_with_variant_tag() {
        let event = LoanEvent::LoanPrepaid {
            loan_id: Uuid::nil(),
            period: 10,
            payoff: Money::from_major(100),
            dropped: AdditionalPayments::new(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["LoanPrepaid"]["period"], 10);
        assert_eq!(json["LoanPrepaid"]["payoff"], "100");
    }
}
