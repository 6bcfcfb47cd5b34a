pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod metrics;
pub mod payments;
pub mod serialization;
pub mod state;
pub mod terms;
pub mod types;
pub mod validation;

// re-export key types
pub use config::LoanConfig;
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LoanError, Result};
pub use events::{EventStore, LoanEvent};
pub use loan::{Loan, LoanBuilder};
pub use payments::{AdditionalPayments, Schedule, ScheduleRow, BALANCE_TOLERANCE};
pub use serialization::{LoanView, MetricsView};
pub use terms::LoanTerms;
pub use types::{LoanId, LoanStatus, PaymentFrequency};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
