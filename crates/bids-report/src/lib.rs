pub mod exclusion;
pub mod reconciliation;

pub use exclusion::{ExcludedScan, write_exclusion_log};
pub use reconciliation::{BoundScan, ReconciliationReport, RowOutcome};
