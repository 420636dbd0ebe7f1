//! The client-side state store.
//!
//! [`Store`] owns the only cached copy of the game: one [`GameState`]
//! snapshot plus the auxiliary credit, zone and calendar reports. View
//! consumers read it through [`Store::current`], [`Store::view`] or a
//! [`watch`] subscription and change it only by invoking commands.
//!
//! # Command discipline
//!
//! Every command follows the same state machine:
//!
//! ```text
//! Idle --(invoke)--> Busy (loading, error cleared)
//!      --(response)--> Idle (slot replaced)  |  Idle (error set, slot untouched)
//! ```
//!
//! Commands are never queued or refused. When two commands overlap, the
//! per-slot [`RequestSequencer`] decides which response lands: only the
//! latest-issued request for a slot may write it, whatever order the
//! responses arrive in.
//!
//! Failures are caught at each command's boundary, logged, and flattened
//! into the single [`StoreState::error`] string. Cached data is never
//! blanked by a failure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use laundromat_types::{
    ActionEnvelope, ActionResponse, ActiveTab, AgentId, AiThought, Calendar, Channel,
    CreditReport, GameState, Intent, Laundromat, Message, NegotiateChatRequest,
    NegotiateRequest, NegotiationChatReply, NegotiationOutcome, NegotiationTurn,
    ScenarioRequest, ScheduledAction, ScheduledActionId, Vendor, VendorId, ZoneInfo,
};
use serde::de::IgnoredAny;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::selectors::GameView;
use crate::sequence::{RequestSequencer, Slot, Ticket};
use crate::transport::Transport;

/// Action type used for player-to-agent messages.
pub const SEND_MESSAGE_ACTION: &str = "SEND_MESSAGE";

// ---------------------------------------------------------------------------
// Published state
// ---------------------------------------------------------------------------

/// Everything a view consumer can observe about the store.
///
/// Cheap to clone: the snapshot and reports are shared behind [`Arc`],
/// so consumers hold read-only references that stay valid after the
/// store moves on to a newer snapshot.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Latest game snapshot; `None` before the first fetch and after a reset.
    pub game_state: Option<Arc<GameState>>,
    /// Message of the most recent failure, cleared when a command starts.
    pub error: Option<String>,
    /// Panel currently shown by the front-end.
    pub active_tab: ActiveTab,
    /// Cached credit report.
    pub credit_report: Option<Arc<CreditReport>>,
    /// Cached zone report.
    pub zone_info: Option<Arc<ZoneInfo>>,
    /// Cached calendar.
    pub calendar: Option<Arc<Calendar>>,
    /// When the snapshot was last replaced.
    pub last_synced_at: Option<DateTime<Utc>>,
    in_flight: u32,
}

impl StoreState {
    /// Whether at least one command is awaiting the server.
    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Number of commands awaiting the server.
    pub const fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Selector view over the snapshot for `player_id`.
    pub fn view<'a>(&'a self, player_id: &'a AgentId) -> GameView<'a> {
        GameView::new(self.game_state.as_deref(), player_id)
    }

    fn clear_playthrough(&mut self) {
        self.game_state = None;
        self.credit_report = None;
        self.zone_info = None;
        self.calendar = None;
        self.last_synced_at = None;
    }
}

/// Accepts either a bare list of turns or `{history: [...]}`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum HistoryBody {
    List(Vec<NegotiationTurn>),
    Wrapped { history: Vec<NegotiationTurn> },
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

struct StoreInner {
    transport: Transport,
    player_id: AgentId,
    sequencer: RequestSequencer,
    tx: watch::Sender<StoreState>,
}

/// Handle to the session's state store.
///
/// Construct one per session and clone the handle into every consumer;
/// clones share the same cache.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("player_id", &self.inner.player_id)
            .field("base_url", &self.inner.transport.base_url().as_str())
            .finish_non_exhaustive()
    }
}

/// Marks the store busy for as long as it lives.
///
/// Decrementing on drop keeps the loading flag honest even when a command
/// future is dropped mid-request.
struct BusyGuard<'a> {
    tx: &'a watch::Sender<StoreState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.tx
            .send_modify(|state| state.in_flight = state.in_flight.saturating_sub(1));
    }
}

impl Store {
    /// Create a store for the configured server and player.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the transport cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = Transport::new(config)?;
        Ok(Self::with_transport(transport, config.player_id.clone()))
    }

    /// Create a store around an existing transport.
    pub fn with_transport(transport: Transport, player_id: AgentId) -> Self {
        let (tx, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(StoreInner {
                transport,
                player_id,
                sequencer: RequestSequencer::new(),
                tx,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The local player's agent id.
    pub fn player_id(&self) -> &AgentId {
        &self.inner.player_id
    }

    /// A copy of the published state.
    pub fn current(&self) -> StoreState {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver is marked changed after every transition, including
    /// loading-flag flips, so consumers re-run their selectors.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.tx.subscribe()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Option<Arc<GameState>> {
        self.inner.tx.borrow().game_state.clone()
    }

    /// Whether any command is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.tx.borrow().is_loading()
    }

    /// The current error message.
    pub fn error(&self) -> Option<String> {
        self.inner.tx.borrow().error.clone()
    }

    /// The panel currently shown.
    pub fn active_tab(&self) -> ActiveTab {
        self.inner.tx.borrow().active_tab
    }

    /// The cached credit report.
    pub fn credit_report(&self) -> Option<Arc<CreditReport>> {
        self.inner.tx.borrow().credit_report.clone()
    }

    /// The cached zone report.
    pub fn zone_info(&self) -> Option<Arc<ZoneInfo>> {
        self.inner.tx.borrow().zone_info.clone()
    }

    /// The cached calendar.
    pub fn calendar(&self) -> Option<Arc<Calendar>> {
        self.inner.tx.borrow().calendar.clone()
    }

    /// Run `f` against a selector view of the current snapshot.
    pub fn view<R>(&self, f: impl FnOnce(GameView<'_>) -> R) -> R {
        let state = self.inner.tx.borrow();
        f(state.view(&self.inner.player_id))
    }

    // -----------------------------------------------------------------------
    // Selectors
    // -----------------------------------------------------------------------

    /// The player's laundromat.
    pub fn player_laundromat(&self) -> Option<Laundromat> {
        self.view(|v| v.player_laundromat().cloned())
    }

    /// Every other laundromat, in map order.
    pub fn competitors(&self) -> Vec<Laundromat> {
        self.view(|v| v.competitors().into_iter().cloned().collect())
    }

    /// Vendors in the market catalog.
    pub fn vendors(&self) -> Vec<Vendor> {
        self.view(|v| v.vendors().to_vec())
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.view(|v| v.messages().to_vec())
    }

    /// Number of unread messages.
    pub fn unread_message_count(&self) -> usize {
        self.view(|v| v.unread_message_count())
    }

    /// Latest reasoning of each AI competitor.
    pub fn ai_thoughts(&self) -> std::collections::BTreeMap<AgentId, AiThought> {
        self.view(|v| v.ai_thoughts().clone())
    }

    // -----------------------------------------------------------------------
    // Local UI state
    // -----------------------------------------------------------------------

    /// Switch the shown panel. Never touches the server.
    pub fn set_active_tab(&self, tab: ActiveTab) {
        self.inner.tx.send_if_modified(|state| {
            if state.active_tab == tab {
                return false;
            }
            state.active_tab = tab;
            true
        });
    }

    /// Dismiss the current error.
    pub fn clear_error(&self) {
        self.inner
            .tx
            .send_if_modified(|state| state.error.take().is_some());
    }

    // -----------------------------------------------------------------------
    // Snapshot commands
    // -----------------------------------------------------------------------

    /// Fetch the current snapshot for the player.
    ///
    /// Idempotent; safe to call repeatedly.
    pub async fn fetch_state(&self) -> bool {
        let _busy = self.begin("fetch_state");
        self.refresh_snapshot().await
    }

    /// Advance one week, then refetch the snapshot.
    pub async fn next_turn(&self) -> bool {
        let _busy = self.begin("next_turn");
        self.advance_turn().await
    }

    /// Advance one week only if no other command is in flight.
    ///
    /// Returns `None` without contacting the server when the store is
    /// busy. The busy check and the busy mark are a single transition, so
    /// two concurrent callers can never both proceed.
    pub async fn try_next_turn(&self) -> Option<bool> {
        let _busy = self.try_begin("next_turn")?;
        Some(self.advance_turn().await)
    }

    /// Advance one day only if no other command is in flight.
    ///
    /// See [`try_next_turn`](Self::try_next_turn).
    pub async fn try_next_day(&self) -> Option<bool> {
        let _busy = self.try_begin("next_day")?;
        Some(self.advance_day().await)
    }

    async fn advance_turn(&self) -> bool {
        let previous_week = self.week();
        let advanced = self
            .inner
            .transport
            .post_empty::<IgnoredAny>(&["next_turn"])
            .await;
        if self.check("next_turn", advanced).is_none() {
            return false;
        }
        let refreshed = self.refresh_snapshot().await;
        if refreshed {
            info!(previous_week = ?previous_week, week = ?self.week(), "turn advanced");
        }
        refreshed
    }

    /// Advance one day, then refetch the snapshot.
    ///
    /// The response body of `/next_day` is ignored in favor of a fresh
    /// `GET /state`, the same discipline as [`next_turn`](Self::next_turn).
    pub async fn next_day(&self) -> bool {
        let _busy = self.begin("next_day");
        self.advance_day().await
    }

    async fn advance_day(&self) -> bool {
        let advanced = self
            .inner
            .transport
            .post_empty::<IgnoredAny>(&["next_day"])
            .await;
        if self.check("next_day", advanced).is_none() {
            return false;
        }
        let refreshed = self.refresh_snapshot().await;
        if refreshed {
            debug!(day = ?self.day(), "day advanced");
        }
        refreshed
    }

    /// Dispatch a gameplay command.
    ///
    /// Returns `true` when the server accepted the action (the snapshot is
    /// then refetched) and `false` on any failure, with the reason in
    /// [`StoreState::error`].
    pub async fn send_action(&self, action_type: &str, parameters: serde_json::Value) -> bool {
        let _busy = self.begin("send_action");
        if action_type.trim().is_empty() {
            warn!("action rejected locally: empty action type");
            self.set_error("action type must not be empty".to_owned());
            return false;
        }

        let envelope = ActionEnvelope {
            agent_id: self.inner.player_id.clone(),
            action_type: action_type.to_owned(),
            parameters,
        };
        let response = self
            .inner
            .transport
            .post::<_, ActionResponse>(&["action"], &envelope)
            .await;
        let Some(response) = self.check("send_action", response) else {
            return false;
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("{action_type} was rejected"));
            warn!(action_type, reason = %message, "action rejected by server");
            self.set_error(message);
            return false;
        }

        info!(action_type, "action accepted");
        self.refresh_snapshot().await;
        true
    }

    /// Send an in-game message through [`send_action`](Self::send_action).
    pub async fn send_message(
        &self,
        channel: Channel,
        recipient_id: &AgentId,
        content: &str,
        intent: Intent,
    ) -> bool {
        let parameters = serde_json::json!({
            "channel": channel,
            "recipient_id": recipient_id,
            "content": content,
            "intent": intent,
        });
        self.send_action(SEND_MESSAGE_ACTION, parameters).await
    }

    /// Make a fixed-form offer to a vendor.
    ///
    /// The outcome is returned directly so the caller can show it at once;
    /// the snapshot is refreshed in the background.
    pub async fn negotiate(&self, vendor_id: &VendorId, item: &str) -> Option<NegotiationOutcome> {
        let _busy = self.begin("negotiate");
        let request = NegotiateRequest {
            agent_id: self.inner.player_id.clone(),
            vendor_id: vendor_id.clone(),
            item: item.to_owned(),
        };
        let outcome = self
            .inner
            .transport
            .post::<_, NegotiationOutcome>(&["negotiate"], &request)
            .await;
        let outcome = self.check("negotiate", outcome)?;
        info!(
            vendor_id = %vendor_id,
            item,
            accepted = outcome.accepted,
            offered_price = ?outcome.offered_price,
            "negotiation answered"
        );
        self.refresh_in_background();
        Some(outcome)
    }

    /// Send a free-text pitch to a vendor.
    pub async fn negotiate_chat(
        &self,
        vendor_id: &VendorId,
        item: &str,
        message: &str,
    ) -> Option<NegotiationChatReply> {
        let _busy = self.begin("negotiate_chat");
        let request = NegotiateChatRequest {
            agent_id: self.inner.player_id.clone(),
            vendor_id: vendor_id.clone(),
            item: item.to_owned(),
            message: message.to_owned(),
        };
        let reply = self
            .inner
            .transport
            .post::<_, NegotiationChatReply>(&["negotiate", "chat"], &request)
            .await;
        let reply = self.check("negotiate_chat", reply)?;
        info!(vendor_id = %vendor_id, item, accepted = reply.accepted, "vendor replied");
        self.refresh_in_background();
        Some(reply)
    }

    /// Prior negotiation turns with a vendor over one item.
    pub async fn negotiation_history(
        &self,
        vendor_id: &VendorId,
        item: &str,
    ) -> Option<Vec<NegotiationTurn>> {
        let _busy = self.begin("negotiation_history");
        let history = self
            .inner
            .transport
            .get::<HistoryBody>(
                &[
                    "negotiate",
                    "history",
                    vendor_id.as_str(),
                    self.inner.player_id.as_str(),
                ],
                &[("item", item)],
            )
            .await;
        match self.check("negotiation_history", history)? {
            HistoryBody::List(turns) | HistoryBody::Wrapped { history: turns } => Some(turns),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle commands
    // -----------------------------------------------------------------------

    /// Reset the playthrough.
    ///
    /// Clears the snapshot and every auxiliary report, and supersedes all
    /// in-flight requests so none of them can repopulate a slot with data
    /// from the previous game.
    pub async fn reset_game(&self) -> bool {
        let _busy = self.begin("reset_game");
        let reset = self
            .inner
            .transport
            .post_empty::<IgnoredAny>(&["reset"])
            .await;
        if self.check("reset_game", reset).is_none() {
            return false;
        }
        self.start_new_playthrough();
        info!("game reset");
        true
    }

    /// Load a named scenario and fetch its first snapshot.
    pub async fn start_scenario(&self, scenario_name: &str) -> bool {
        let _busy = self.begin("start_scenario");
        let request = ScenarioRequest {
            scenario_name: scenario_name.to_owned(),
        };
        let started = self
            .inner
            .transport
            .post::<_, IgnoredAny>(&["start_scenario"], &request)
            .await;
        if self.check("start_scenario", started).is_none() {
            return false;
        }
        self.start_new_playthrough();
        info!(scenario = scenario_name, "scenario started");
        self.refresh_snapshot().await
    }

    // -----------------------------------------------------------------------
    // Auxiliary reports
    // -----------------------------------------------------------------------

    /// Fetch the player's credit report into its slot.
    pub async fn fetch_credit_report(&self) -> bool {
        let _busy = self.begin("fetch_credit_report");
        let ticket = self.inner.sequencer.issue(Slot::Credit);
        let report = self
            .inner
            .transport
            .get::<CreditReport>(&["credit", self.inner.player_id.as_str()], &[])
            .await;
        self.settle("fetch_credit_report", ticket, report, |state, report| {
            state.credit_report = Some(Arc::new(report));
        })
    }

    /// Fetch the player's zone report into its slot.
    pub async fn fetch_zone_info(&self) -> bool {
        let _busy = self.begin("fetch_zone_info");
        let ticket = self.inner.sequencer.issue(Slot::Zone);
        let zone = self
            .inner
            .transport
            .get::<ZoneInfo>(&["zone", self.inner.player_id.as_str()], &[])
            .await;
        self.settle("fetch_zone_info", ticket, zone, |state, zone| {
            state.zone_info = Some(Arc::new(zone));
        })
    }

    /// Fetch the player's calendar into its slot.
    pub async fn fetch_calendar(&self) -> bool {
        let _busy = self.begin("fetch_calendar");
        self.refresh_calendar().await
    }

    /// Add an entry to the calendar, then refetch it.
    pub async fn schedule_action(&self, action: &ScheduledAction) -> bool {
        let _busy = self.begin("schedule_action");
        let created = self
            .inner
            .transport
            .post::<_, IgnoredAny>(&["calendar", self.inner.player_id.as_str()], action)
            .await;
        if self.check("schedule_action", created).is_none() {
            return false;
        }
        debug!(action_type = %action.action_type, week = action.week, "action scheduled");
        self.refresh_calendar().await
    }

    /// Replace a calendar entry, then refetch the calendar.
    pub async fn update_scheduled_action(
        &self,
        id: &ScheduledActionId,
        action: &ScheduledAction,
    ) -> bool {
        let _busy = self.begin("update_scheduled_action");
        let updated = self
            .inner
            .transport
            .put::<_, IgnoredAny>(
                &["calendar", self.inner.player_id.as_str(), id.as_str()],
                action,
            )
            .await;
        if self.check("update_scheduled_action", updated).is_none() {
            return false;
        }
        self.refresh_calendar().await
    }

    /// Remove a calendar entry, then refetch the calendar.
    pub async fn cancel_scheduled_action(&self, id: &ScheduledActionId) -> bool {
        let _busy = self.begin("cancel_scheduled_action");
        let removed = self
            .inner
            .transport
            .delete::<IgnoredAny>(&["calendar", self.inner.player_id.as_str(), id.as_str()])
            .await;
        if self.check("cancel_scheduled_action", removed).is_none() {
            return false;
        }
        self.refresh_calendar().await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn begin(&self, command: &'static str) -> BusyGuard<'_> {
        debug!(command, "command started");
        self.inner.tx.send_modify(|state| {
            state.in_flight = state.in_flight.saturating_add(1);
            state.error = None;
        });
        BusyGuard { tx: &self.inner.tx }
    }

    /// Mark the store busy only if it is idle.
    fn try_begin(&self, command: &'static str) -> Option<BusyGuard<'_>> {
        let acquired = self.inner.tx.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            state.in_flight = 1;
            state.error = None;
            true
        });
        if !acquired {
            debug!(command, "command refused, store busy");
            return None;
        }
        debug!(command, "command started");
        Some(BusyGuard { tx: &self.inner.tx })
    }

    /// GET the snapshot under a fresh ticket and apply it if still current.
    async fn refresh_snapshot(&self) -> bool {
        let ticket = self.inner.sequencer.issue(Slot::Snapshot);
        let snapshot = self
            .inner
            .transport
            .get::<GameState>(&["state"], &[("agent_id", self.inner.player_id.as_str())])
            .await;
        self.settle("fetch_state", ticket, snapshot, |state, game| {
            state.game_state = Some(Arc::new(game));
            state.last_synced_at = Some(Utc::now());
        })
    }

    async fn refresh_calendar(&self) -> bool {
        let ticket = self.inner.sequencer.issue(Slot::Calendar);
        let calendar = self
            .inner
            .transport
            .get::<Calendar>(&["calendar", self.inner.player_id.as_str()], &[])
            .await;
        self.settle("fetch_calendar", ticket, calendar, |state, calendar| {
            state.calendar = Some(Arc::new(calendar));
        })
    }

    fn refresh_in_background(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            store.fetch_state().await;
        });
    }

    /// Supersede every outstanding request and clear all playthrough data
    /// in one published transition.
    fn start_new_playthrough(&self) {
        let sequencer = &self.inner.sequencer;
        self.inner.tx.send_modify(|state| {
            sequencer.invalidate_all();
            state.clear_playthrough();
        });
    }

    /// Apply a slot-writing result if its ticket is still current.
    ///
    /// Returns whether the request itself succeeded; a superseded success
    /// still counts, it just no longer writes the slot.
    fn settle<T>(
        &self,
        command: &'static str,
        ticket: Ticket,
        result: Result<T, ClientError>,
        write: impl FnOnce(&mut StoreState, T),
    ) -> bool {
        let succeeded = result.is_ok();
        if let Err(e) = &result {
            warn!(command, error = %e, "command failed");
        }

        let sequencer = &self.inner.sequencer;
        let applied = self.inner.tx.send_if_modified(|state| {
            if !sequencer.is_current(ticket) {
                return false;
            }
            match result {
                Ok(value) => write(state, value),
                Err(e) => state.error = Some(e.user_message()),
            }
            true
        });

        if !applied {
            debug!(
                command,
                slot = ticket.slot().as_str(),
                seq = ticket.seq(),
                "discarding superseded response"
            );
        }
        succeeded
    }

    /// Pass a success through, or record the failure and return `None`.
    fn check<T>(&self, command: &'static str, result: Result<T, ClientError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.record_error(command, &e);
                None
            }
        }
    }

    fn record_error(&self, command: &'static str, error: &ClientError) {
        warn!(command, error = %error, "command failed");
        self.set_error(error.user_message());
    }

    fn set_error(&self, message: String) {
        self.inner
            .tx
            .send_modify(|state| state.error = Some(message));
    }

    fn week(&self) -> Option<u32> {
        self.inner.tx.borrow().game_state.as_ref().map(|g| g.week)
    }

    fn day(&self) -> Option<laundromat_types::Day> {
        self.inner.tx.borrow().game_state.as_ref().map(|g| g.day)
    }
}
