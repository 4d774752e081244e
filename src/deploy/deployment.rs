// ABOUTME: Generic deployment struct parameterized by state.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::config::DeploymentRequest;
use crate::package::Bundle;
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

use super::state::Packaged;

/// A deployment in progress, parameterized by its current state.
///
/// The request is immutable once built. Each transition consumes the
/// deployment and hands back the next state, so a version can't be
/// registered before its bundle is stored, and an environment can't be
/// watched before it was asked to update.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) request: DeploymentRequest,
    pub(crate) state: S,
}

impl Deployment<Packaged> {
    pub fn new(request: DeploymentRequest, bundle: Bundle) -> Self {
        Deployment {
            request,
            state: Packaged { bundle },
        }
    }
}

impl<S> Deployment<S> {
    pub fn request(&self) -> &DeploymentRequest {
        &self.request
    }

    pub fn application_name(&self) -> &ApplicationName {
        self.request.application_name()
    }

    pub fn environment_name(&self) -> &EnvironmentName {
        self.request.environment_name()
    }

    pub fn version_label(&self) -> &VersionLabel {
        self.request.version_label()
    }

    /// State-specific data.
    pub fn state(&self) -> &S {
        &self.state
    }
}
