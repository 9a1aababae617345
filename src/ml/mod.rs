//! Machine learning helpers for training and inference.
//!
//! A hand-rolled random forest small enough to serialize as JSON, plus the
//! evaluation metrics the trainer reports.

pub mod forest;
pub mod metrics;
