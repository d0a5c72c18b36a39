//! HR vertical slice: the employee console core.
//!
//! [`import`] turns uploaded CSV text into create/update calls, [`analytics`]
//! summarises the current collection, and [`roster`] holds the console state
//! that composes them with the remote employee API.

use thiserror::Error;

pub mod analytics;
pub mod export;
pub mod import;
pub mod notify;
pub mod roster;

pub use analytics::{AnalyticsView, DepartmentSlice, SalaryBucket, aggregate};
pub use import::{ImportOutcome, ImportPlan, reconcile};
pub use notify::{MemoryNotifier, Notice, Notifier, Severity};
pub use roster::Roster;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output: {0}")]
    CsvOutput(String),
    #[error(transparent)]
    Api(#[from] platform_api::ApiError),
}

pub type HrResult<T> = Result<T, HrError>;
