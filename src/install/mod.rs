//! Batch installation
//!
//! A batch is planned first: the dependency closure is resolved and the
//! workspace detected once, so a missing dependency fails the whole batch
//! before any component I/O. Components then run through the bounded
//! executor; one component failing is recorded in the outcome and does not
//! stop its siblings unless `install.stop_on_error` is set.
//!
//! Per component, every target file is checked for conflicts before any of
//! them is written, and each write is atomic (temp file then rename).

pub mod fs;
pub mod installer;
pub mod plan;
pub mod progress;

pub use fs::{TokioFs, WorkspaceFs};
pub use installer::{FailedComponent, InstallOutcome, Installer};
pub use plan::{InstallOptions, InstallPlan, PlannedComponent};
pub use progress::{ComponentPhase, ProgressEvent};
