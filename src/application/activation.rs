//! Activation controller
//!
//! Two remote round-trips: flip the `current` pointer, then record the new
//! active revision in the ledger. The pointer is what gets served, so it
//! moves first; a run interrupted between the two steps leaves a stale
//! ledger that the next fetch corrects from the live pointer.

use crate::application::commands;
use crate::application::ledger_store::LedgerStore;
use crate::application::remote::RemoteContext;
use crate::domain::entities::RevisionLedger;
use crate::domain::ports::{DeployEvent, RemoteExecutor};
use crate::domain::value_objects::validate_revision_id;
use crate::error::{SlipwayError, SlipwayResult};

/// Progress of one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Idle,
    Activating,
    /// The pointer targets the requested release
    Activated,
    /// The pointer was not touched
    Failed,
}

impl ActivationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivationState::Activated | ActivationState::Failed)
    }
}

pub struct ActivationController<'a> {
    ctx: RemoteContext<'a>,
    state: ActivationState,
    /// Set together with `Activated`
    activated: Option<String>,
}

impl<'a> ActivationController<'a> {
    pub fn new(ctx: RemoteContext<'a>) -> Self {
        Self {
            ctx,
            state: ActivationState::Idle,
            activated: None,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    /// Revision the pointer was moved to, once activation succeeded
    pub fn activated(&self) -> Option<&str> {
        self.activated.as_deref()
    }

    /// Point `current` at `releases/<id>`.
    ///
    /// Fails with `ActivationTargetMissing` when the release directory does
    /// not exist; the pointer is left as it was.
    pub fn activate<S>(&mut self, session: &mut S, id: &str) -> SlipwayResult<()>
    where
        S: RemoteExecutor + ?Sized,
    {
        if self.state != ActivationState::Idle {
            return Err(SlipwayError::Config(format!(
                "activation already ran (state: {:?})",
                self.state
            )));
        }
        self.state = ActivationState::Activating;

        let result = self.flip(session, id);
        self.state = match result {
            Ok(()) => {
                self.activated = Some(id.to_string());
                ActivationState::Activated
            }
            Err(_) => ActivationState::Failed,
        };
        result
    }

    fn flip<S>(&self, session: &mut S, id: &str) -> SlipwayResult<()>
    where
        S: RemoteExecutor + ?Sized,
    {
        validate_revision_id(id)?;
        let layout = self.ctx.layout;
        let release_dir = layout.release_dir(id)?;
        let command = commands::activate(&release_dir, layout.current_link());

        match self.ctx.run(session, &command) {
            Ok(_) => Ok(()),
            Err(SlipwayError::Command { stderr, .. })
                if stderr.starts_with(commands::MISSING_RELEASE_MARKER) =>
            {
                Err(SlipwayError::ActivationTargetMissing {
                    revision: id.to_string(),
                    release_dir,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Record the activated revision as the only active one and persist the
    /// ledger.
    ///
    /// Only valid after `activate` succeeded. The ledger is re-read first so
    /// changes made since the run started are kept.
    pub fn reconcile<S>(
        &self,
        session: &mut S,
        store: &LedgerStore<'_>,
    ) -> SlipwayResult<RevisionLedger>
    where
        S: RemoteExecutor + ?Sized,
    {
        let id = match (self.state, self.activated.as_deref()) {
            (ActivationState::Activated, Some(id)) => id,
            (state, _) => {
                return Err(SlipwayError::Config(format!(
                    "cannot reconcile ledger before activation succeeded (state: {state:?})"
                )))
            }
        };

        let ledger = store.fetch(session)?.set_active(id);
        store.persist(session, &ledger)?;
        self.ctx.emit(DeployEvent::Activated {
            revision: id.to_string(),
        });
        Ok(ledger)
    }
}
