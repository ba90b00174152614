//! Deploy Orchestrator
//!
//! Runs, in order, against a single session:
//! 1. Connect
//! 2. Fetch the ledger
//! 3. Create the release directory
//! 4. Upload files
//! 5. Merge, prune, persist (tracked uploads only)
//! 6. Activate and reconcile (on request)
//! 7. Close the session
//!
//! Any failing step ends the run. Nothing is rolled back: the next run
//! re-derives ledger and prune state from what is on the host. The session
//! is closed on every path, including failures and cancellation.

use std::sync::Arc;

use crate::application::activation::ActivationController;
use crate::application::commands;
use crate::application::ledger_store::LedgerStore;
use crate::application::remote::RemoteContext;
use crate::application::upload::ReleaseUploader;
use crate::domain::entities::{Revision, RevisionLedger};
use crate::domain::ports::{
    DeployEvent, DeployEventSink, NoopEventSink, RemoteConnector, RemoteExecutor,
};
use crate::domain::services::PruneEngine;
use crate::domain::value_objects::{CancellationToken, RemoteLayout};
use crate::error::{SlipwayError, SlipwayResult};

use super::options::DeployOptions;
use super::result::DeployReport;

/// Deploy orchestrator, parameterized by the transport
pub struct DeployOrchestrator<C>
where
    C: RemoteConnector,
{
    connector: C,
    layout: RemoteLayout,
    events: Arc<dyn DeployEventSink>,
    cancel: CancellationToken,
}

impl<C> DeployOrchestrator<C>
where
    C: RemoteConnector,
{
    pub fn new(connector: C, layout: RemoteLayout) -> Self {
        Self {
            connector,
            layout,
            events: Arc::new(NoopEventSink),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn layout(&self) -> &RemoteLayout {
        &self.layout
    }

    /// Fetch the current revision list
    pub fn list(&self) -> SlipwayResult<RevisionLedger> {
        self.with_session(|session, ctx| LedgerStore::new(ctx).fetch(session))
    }

    /// Upload a release, prune old ones, and optionally activate it
    pub fn deploy(&self, options: &DeployOptions) -> SlipwayResult<DeployReport> {
        if options.activate && !options.is_tracked() {
            return Err(SlipwayError::Config(
                "--activate needs a revision id".to_string(),
            ));
        }
        if options.activate && options.keep == 0 {
            return Err(SlipwayError::Config(
                "--activate with keep 0 would prune the new release before it goes live"
                    .to_string(),
            ));
        }

        self.with_session(|session, ctx| {
            let store = LedgerStore::new(ctx);
            let uploader = ReleaseUploader::new(ctx);
            let revision = options.revision.as_deref();

            let mut ledger = store.fetch(session)?;

            let dir = uploader.prepare(session, revision, &options.files)?;
            let mut report = DeployReport::new(dir.clone());
            report.revision = options.revision.clone();

            let uploaded = uploader.upload(session, &dir, revision, &options.files)?;
            report.uploaded = options
                .files
                .iter()
                .map(|f| f.relative().to_path_buf())
                .collect();

            if let Some(uploaded) = uploaded {
                ledger = self.prune(session, ctx, &store, uploaded, options.keep, &mut report)?;
            }

            if let (true, Some(id)) = (options.activate, revision) {
                let mut controller = ActivationController::new(ctx);
                controller.activate(session, id)?;
                ledger = controller.reconcile(session, &store)?;
                report.activated = Some(id.to_string());
            }

            report.ledger = ledger;
            Ok(report)
        })
    }

    /// Point `current` at an existing release and record it in the ledger
    pub fn activate(&self, revision: &str) -> SlipwayResult<RevisionLedger> {
        self.with_session(|session, ctx| {
            let store = LedgerStore::new(ctx);
            let mut controller = ActivationController::new(ctx);
            controller.activate(session, revision)?;
            controller.reconcile(session, &store)
        })
    }

    /// Re-read the ledger, merge the new revision, delete releases outside
    /// the retention window, then persist what is left.
    fn prune(
        &self,
        session: &mut C::Session,
        ctx: RemoteContext<'_>,
        store: &LedgerStore<'_>,
        uploaded: Revision,
        keep: usize,
        report: &mut DeployReport,
    ) -> SlipwayResult<RevisionLedger> {
        let merged = store.fetch(session)?.merge(uploaded);
        let plan = PruneEngine::split(&merged, keep);

        let mut doomed = Vec::new();
        for revision in &plan.to_delete {
            match self.layout.release_dir(revision.id()) {
                Ok(dir) => doomed.push(dir),
                Err(err) => {
                    tracing::warn!("{err}; dropping ledger entry without deleting anything");
                    ctx.emit(DeployEvent::PruneSkipped {
                        revision: revision.id().to_string(),
                        reason: err.reason.to_string(),
                    });
                    report.skipped.push(revision.id().to_string());
                }
            }
        }

        if !doomed.is_empty() {
            ctx.run(session, &commands::remove_dirs(doomed.iter().map(String::as_str)))?;
            ctx.emit(DeployEvent::ReleasesPurged {
                dirs: doomed.clone(),
            });
            report.purged = doomed;
        }

        let kept = plan.kept_ledger();
        store.persist(session, &kept)?;
        Ok(kept)
    }

    /// Connect, run `step`, and close the session whatever `step` returned.
    ///
    /// A failed close is only reported when `step` succeeded; otherwise the
    /// step's error wins and the close failure is logged.
    fn with_session<T, F>(&self, step: F) -> SlipwayResult<T>
    where
        F: FnOnce(&mut C::Session, RemoteContext<'_>) -> SlipwayResult<T>,
    {
        if self.cancel.is_cancelled() {
            return Err(SlipwayError::Cancelled);
        }

        let destination = self.connector.destination();
        let mut session = self
            .connector
            .connect()
            .map_err(|e| SlipwayError::Connection {
                destination: destination.clone(),
                message: e.to_string(),
            })?;
        tracing::info!(%destination, "session opened");
        self.events
            .on_event(DeployEvent::SessionOpened { destination });

        let ctx = RemoteContext::new(&self.layout, self.events.as_ref(), &self.cancel);
        let result = step(&mut session, ctx);

        match (result, session.close()) {
            (Ok(value), Ok(())) => {
                self.events.on_event(DeployEvent::SessionClosed);
                Ok(value)
            }
            (Ok(_), Err(err)) => Err(SlipwayError::from_remote("close session", err)),
            (Err(err), close) => {
                match close {
                    Ok(()) => self.events.on_event(DeployEvent::SessionClosed),
                    Err(close_err) => tracing::warn!("failed to close session: {close_err}"),
                }
                Err(err)
            }
        }
    }
}
