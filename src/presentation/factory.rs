//! Use Case Factory
//!
//! Creates connectors and orchestrators from resolved settings.
//! This is the dependency injection point for the application.

use std::sync::Arc;

use crate::application::DeployOrchestrator;
use crate::config::DeploySettings;
use crate::domain::ports::{DeployEventSink, RemoteConnector};
use crate::domain::value_objects::CancellationToken;
use crate::error::{SlipwayError, SlipwayResult};
use crate::infrastructure::{LocalConnector, RunLimits, SshConnector};

/// Limits applied to every process a run spawns
pub fn run_limits(settings: &DeploySettings, cancel: &CancellationToken) -> RunLimits {
    RunLimits::new(settings.command_timeout, cancel.clone())
}

/// SSH connector for the configured host
pub fn create_ssh_connector(
    settings: &DeploySettings,
    limits: RunLimits,
) -> SlipwayResult<SshConnector> {
    let host = settings.host.clone().ok_or_else(|| {
        SlipwayError::Config("connection.host is required for the ssh transport".to_string())
    })?;

    Ok(SshConnector::new(host)
        .with_user(settings.user.clone())
        .with_port(settings.port)
        .with_identity_file(settings.identity_file.clone())
        .with_connect_timeout(settings.connect_timeout)
        .with_options(settings.ssh_options.clone())
        .with_limits(limits))
}

pub fn create_local_connector(limits: RunLimits) -> LocalConnector {
    LocalConnector::new(limits)
}

/// Orchestrator over `connector` with the run's event sink and cancellation
pub fn create_orchestrator<C: RemoteConnector>(
    connector: C,
    settings: &DeploySettings,
    events: Arc<dyn DeployEventSink>,
    cancel: &CancellationToken,
) -> DeployOrchestrator<C> {
    DeployOrchestrator::new(connector, settings.layout.clone())
        .with_events(events)
        .with_cancellation(cancel.clone())
}
