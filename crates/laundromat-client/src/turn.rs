//! Turn advancement: manual steps, auto-play and restart.
//!
//! The [`TurnController`] is the only component that advances time on its
//! own. It enforces the guards that keep turn commands from overlapping:
//!
//! - Manual advances are refused while auto-play runs or while any other
//!   store command is in flight. The busy check and the busy mark happen
//!   in one store transition.
//! - Auto-play waits the configured period, issues one `next_turn`, and
//!   awaits its completion before waiting again. A tick that comes due
//!   while the store is busy with another command is skipped.
//! - Stopping auto-play signals the loop and returns at once. A turn
//!   already in flight finishes on its own, but no new `next_turn` is
//!   issued once [`TurnController::stop_auto_play`] returns.

use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::store::Store;

/// Reasons a manual advance did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// Auto-play owns turn advancement until it is stopped.
    #[error("auto-play is running")]
    AutoPlayActive,

    /// Another command is awaiting the server.
    #[error("another command is in flight")]
    Busy,

    /// The store command ran and failed.
    #[error("advance failed: {0}")]
    Failed(String),
}

/// A running auto-play loop.
struct AutoPlay {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Drives the store's turn commands.
pub struct TurnController {
    store: Store,
    interval: Duration,
    auto_play: Mutex<Option<AutoPlay>>,
}

impl TurnController {
    /// Create a controller that auto-plays every `interval`.
    pub fn new(store: Store, interval: Duration) -> Self {
        Self {
            store,
            interval,
            auto_play: Mutex::new(None),
        }
    }

    /// Create a controller using the configured auto-play period.
    pub fn from_config(store: Store, config: &ClientConfig) -> Self {
        Self::new(store, config.auto_play_interval)
    }

    /// The store this controller drives.
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Auto-play period.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    // -----------------------------------------------------------------------
    // Manual advance
    // -----------------------------------------------------------------------

    /// Advance one day.
    pub async fn advance_day(&self) -> Result<(), TurnError> {
        self.ensure_manual_allowed().await?;
        self.settle(self.store.try_next_day().await)
    }

    /// Advance one week.
    pub async fn advance_week(&self) -> Result<(), TurnError> {
        self.ensure_manual_allowed().await?;
        self.settle(self.store.try_next_turn().await)
    }

    async fn ensure_manual_allowed(&self) -> Result<(), TurnError> {
        if self.is_auto_playing().await {
            return Err(TurnError::AutoPlayActive);
        }
        Ok(())
    }

    fn settle(&self, outcome: Option<bool>) -> Result<(), TurnError> {
        match outcome {
            None => Err(TurnError::Busy),
            Some(true) => Ok(()),
            Some(false) => Err(TurnError::Failed(
                self.store
                    .error()
                    .unwrap_or_else(|| "unknown error".to_owned()),
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Auto-play
    // -----------------------------------------------------------------------

    /// Whether the auto-play loop is running.
    pub async fn is_auto_playing(&self) -> bool {
        self.auto_play
            .lock()
            .await
            .as_ref()
            .is_some_and(|auto| !auto.handle.is_finished())
    }

    /// Start auto-play. Returns `false` if it was already running.
    pub async fn start_auto_play(&self) -> bool {
        let mut slot = self.auto_play.lock().await;
        if slot.as_ref().is_some_and(|auto| !auto.handle.is_finished()) {
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_auto_play(self.store.clone(), self.interval, stop_rx));
        *slot = Some(AutoPlay { stop_tx, handle });

        info!(
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "auto-play started"
        );
        true
    }

    /// Stop auto-play without waiting on the server.
    ///
    /// A tick still waiting on its timer never fires. A turn already in
    /// flight is left to finish in the background, after which the loop
    /// exits. Returns `false` if auto-play was not running.
    pub async fn stop_auto_play(&self) -> bool {
        let Some(auto) = self.auto_play.lock().await.take() else {
            return false;
        };

        auto.stop_tx.send_replace(true);
        let finishing_turn = !auto.handle.is_finished();
        info!(finishing_turn, "auto-play stopped");
        true
    }

    /// Flip auto-play. Returns whether it is running afterwards.
    pub async fn toggle_auto_play(&self) -> bool {
        if self.is_auto_playing().await {
            self.stop_auto_play().await;
            false
        } else {
            self.start_auto_play().await
        }
    }

    // -----------------------------------------------------------------------
    // Restart
    // -----------------------------------------------------------------------

    /// Stop auto-play, reset the game, then report the outcome to
    /// `on_complete`.
    pub async fn restart<F>(&self, on_complete: F) -> bool
    where
        F: FnOnce(bool),
    {
        self.stop_auto_play().await;
        let reset = self.store.reset_game().await;
        info!(reset, "restart finished");
        on_complete(reset);
        reset
    }
}

impl Drop for TurnController {
    fn drop(&mut self) {
        if let Some(auto) = self.auto_play.get_mut().take() {
            auto.stop_tx.send_replace(true);
            auto.handle.abort();
        }
    }
}

impl std::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("store", &self.store)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// The auto-play loop. Exits as soon as `stop_rx` reads `true` or its
/// sender is dropped.
async fn run_auto_play(store: Store, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut turns: u64 = 0;
    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            () = tokio::time::sleep(interval) => {}
        }

        if *stop_rx.borrow() {
            break;
        }
        match store.try_next_turn().await {
            None => debug!("auto-play tick skipped, store busy"),
            Some(true) => {
                turns = turns.saturating_add(1);
                debug!(turns, "auto-play turn completed");
            }
            Some(false) => {
                turns = turns.saturating_add(1);
                warn!(turns, error = ?store.error(), "auto-play turn failed");
            }
        }
    }
    debug!(turns, "auto-play loop exited");
}
