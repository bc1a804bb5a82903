//! Core logging types: applier entries, status, and the [`Log`] trait.

/// Applier execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct ApplierEntry {
    /// Applier module name (e.g. `PolkitApplier`).
    pub name: String,
    /// Final status of the applier.
    pub status: ApplierStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed applier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplierStatus {
    /// Applier completed successfully.
    Ok,
    /// Applier is switched off by policy.
    Disabled,
    /// Applier had nothing to do in the current context.
    Skipped,
    /// Applier encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// Appliers log through this trait so tests can substitute a recorder.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an applier result for the summary.
    fn record_applier(&self, name: &str, status: ApplierStatus, message: Option<&str>);
}
