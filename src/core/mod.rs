//! Core business logic abstractions

pub mod alert;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod log;
pub mod session;
pub mod valuation;

// Re-export main types for cleaner imports
pub use alert::FetchAlert;
pub use fetch::{CitationSource, FetchOutcome, StockDataProvider};
pub use session::Session;
pub use valuation::{FinancialInputs, InputField, SensitivityPoint, ValuationResult};
