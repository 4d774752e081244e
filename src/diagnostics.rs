// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deployment operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A reused application version points at a different archive.
    pub fn bundle_mismatch(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::BundleMismatch,
            message: message.into(),
        }
    }

    /// The local archive copy could not be written.
    pub fn artifact_write(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ArtifactWrite,
            message: message.into(),
        }
    }

    /// CI step outputs could not be written.
    pub fn ci_output(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CiOutput,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Existing version label reused with another source bundle.
    BundleMismatch,
    /// Failed to keep a local copy of the archive.
    ArtifactWrite,
    /// Failed to append to `GITHUB_OUTPUT`.
    CiOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::bundle_mismatch("version abc123 reused"));
        diag.warn(Warning::artifact_write("permission denied"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert!(diag.has(WarningKind::BundleMismatch));
        assert!(!diag.has(WarningKind::CiOutput));
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(
            Warning::bundle_mismatch("test").kind,
            WarningKind::BundleMismatch
        );
        assert_eq!(
            Warning::artifact_write("test").kind,
            WarningKind::ArtifactWrite
        );
        assert_eq!(Warning::ci_output("test").kind, WarningKind::CiOutput);
    }
}
