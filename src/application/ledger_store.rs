//! Ledger store - fetches and persists the revision ledger on the remote host
//!
//! Follows the repository `load_or_new` pattern: a missing or malformed
//! ledger file yields an empty ledger instead of failing the run.

use std::io::Write;

use crate::application::commands;
use crate::application::remote::RemoteContext;
use crate::domain::entities::RevisionLedger;
use crate::domain::ports::{DeployEvent, RemoteExecutor};
use crate::error::{SlipwayError, SlipwayResult};

pub struct LedgerStore<'a> {
    ctx: RemoteContext<'a>,
}

impl<'a> LedgerStore<'a> {
    pub fn new(ctx: RemoteContext<'a>) -> Self {
        Self { ctx }
    }

    /// Read the ledger and the live pointer.
    ///
    /// When `current` points into the releases directory, the ledger's
    /// active flag is made to agree with it.
    pub fn fetch<S>(&self, session: &mut S) -> SlipwayResult<RevisionLedger>
    where
        S: RemoteExecutor + ?Sized,
    {
        let layout = self.ctx.layout;
        let raw = self
            .ctx
            .run(session, &commands::read_ledger(layout.ledger_path()))?;

        let (mut ledger, parse_error) = RevisionLedger::load(raw.as_bytes());
        if let Some(err) = parse_error {
            tracing::warn!(ledger = layout.ledger_path(), "{err}; starting from an empty ledger");
            self.ctx.emit(DeployEvent::LedgerRecovered {
                reason: err.to_string(),
            });
        }

        let target = self
            .ctx
            .run(session, &commands::read_link(layout.current_link()))?;
        if let Some(live) = self.live_revision(target.trim()) {
            ledger = ledger.set_active(&live);
        }

        self.ctx.emit(DeployEvent::LedgerFetched {
            revisions: ledger.len(),
            active: ledger.active().map(|r| r.id().to_string()),
        });
        Ok(ledger)
    }

    /// Overwrite the persisted ledger.
    ///
    /// The JSON is staged in a local temp file, uploaded beside the ledger and
    /// renamed over it, so its size is not bounded by the command line.
    pub fn persist<S>(&self, session: &mut S, ledger: &RevisionLedger) -> SlipwayResult<()>
    where
        S: RemoteExecutor + ?Sized,
    {
        let layout = self.ctx.layout;
        let mut staged = tempfile::Builder::new()
            .prefix("slipway-ledger-")
            .tempfile()?;
        staged.write_all(ledger.serialize().as_bytes())?;
        staged.flush()?;

        self.ctx.check_cancelled()?;
        session
            .put_file(staged.path(), layout.ledger_tmp_path())
            .map_err(|e| {
                SlipwayError::from_remote(format!("upload {}", layout.ledger_tmp_path()), e)
            })?;
        self.ctx.run(
            session,
            &commands::commit_ledger(layout.ledger_tmp_path(), layout.ledger_path()),
        )?;
        self.ctx.emit(DeployEvent::LedgerSaved {
            revisions: ledger.len(),
        });
        Ok(())
    }

    /// Revision id named by a `readlink current` result.
    ///
    /// Only links into `<root>/releases/` count; anything else (an untracked
    /// deploy, a hand-made link) means no tracked revision is live.
    fn live_revision(&self, target: &str) -> Option<String> {
        if target.is_empty() {
            return None;
        }
        let releases = self.ctx.layout.releases_dir();
        let id = target
            .trim_end_matches('/')
            .strip_prefix(releases)?
            .strip_prefix('/')?;
        if id.is_empty() || id.contains('/') {
            tracing::debug!(target, "current pointer does not name a release");
            return None;
        }
        Some(id.to_string())
    }
}
