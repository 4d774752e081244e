// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Upload, register, update, and watch as consuming transitions on Deployment<S>.

mod deployment;
mod error;
mod outcome;
mod registrar;
mod state;
mod transitions;
mod updater;
mod watcher;

pub use deployment::Deployment;
pub use error::{DeployError, DeployErrorKind};
pub use outcome::{DeploymentOutcome, DeploymentResult};
pub use registrar::{register, storage_bucket};
pub use state::{Packaged, Registered, Updated, Uploaded};
pub use updater::{UpdateReceipt, request_update};
pub use watcher::{WatchState, classify, snapshot, watch};
