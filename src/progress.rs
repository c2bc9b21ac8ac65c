//! Progress-callback trait for batch report rendering.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ProcessingConfigBuilder::progress_callback`] to receive
//! an event per student while [`crate::report::render_batch`] runs.
//!
//! # Example
//!
//! ```rust
//! use marksheet_report::{BatchProgressCallback, ProcessingConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_student_complete(&self, index: usize, total: usize, reg_no: &str, bytes: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} ({} bytes)", index, total, reg_no, bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     written: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ProcessingConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch renderer as it processes each student.
///
/// Batches run sequentially, so events arrive in list order. The trait is
/// still `Send + Sync` because the batch runs on a blocking worker thread.
/// All methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first student is rendered.
    ///
    /// # Arguments
    /// * `total` — number of students in the batch
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a student's report is rendered.
    ///
    /// # Arguments
    /// * `index`  — 1-indexed position in the batch
    /// * `total`  — batch size
    /// * `reg_no` — registration number of the student
    fn on_student_start(&self, index: usize, total: usize, reg_no: &str) {
        let _ = (index, total, reg_no);
    }

    /// Called after a report was written.
    ///
    /// # Arguments
    /// * `bytes` — size of the written artifact
    fn on_student_complete(&self, index: usize, total: usize, reg_no: &str, bytes: usize) {
        let _ = (index, total, reg_no, bytes);
    }

    /// Called when a student's report failed. The batch stops right after.
    fn on_student_error(&self, index: usize, total: usize, reg_no: &str, error: &str) {
        let _ = (index, total, reg_no, error);
    }

    /// Called once after the batch finished or stopped.
    ///
    /// # Arguments
    /// * `total`     — batch size
    /// * `completed` — reports written
    fn on_batch_complete(&self, total: usize, completed: usize) {
        let _ = (total, completed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
