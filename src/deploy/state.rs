// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries what the previous stage produced.

use chrono::{DateTime, Utc};

use crate::package::Bundle;
use crate::provider::{ApplicationVersion, SourceBundle};

/// Archive built and held in memory.
/// Available actions: `upload_bundle()`
#[derive(Debug, Clone)]
pub struct Packaged {
    pub(crate) bundle: Bundle,
}

/// Archive stored in the version bucket.
/// Available actions: `register_version()`
#[derive(Debug, Clone)]
pub struct Uploaded {
    pub(crate) source_bundle: SourceBundle,
}

/// Application version registered and usable.
/// Available actions: `update_environment()`
#[derive(Debug, Clone)]
pub struct Registered {
    pub(crate) version: ApplicationVersion,
}

/// Update requested (or found unnecessary).
/// Available actions: `watch()`, `finish_without_wait()`
#[derive(Debug, Clone)]
pub struct Updated {
    pub(crate) version: ApplicationVersion,
    pub(crate) requested_at: DateTime<Utc>,
    pub(crate) update_skipped: bool,
}

impl Packaged {
    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }
}

impl Uploaded {
    pub fn source_bundle(&self) -> &SourceBundle {
        &self.source_bundle
    }
}

impl Registered {
    pub fn version(&self) -> &ApplicationVersion {
        &self.version
    }
}

impl Updated {
    pub fn version(&self) -> &ApplicationVersion {
        &self.version
    }

    /// When the update was requested. Events before this are ignored.
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// The environment already ran the label, so no update call was made.
    pub fn update_skipped(&self) -> bool {
        self.update_skipped
    }
}
