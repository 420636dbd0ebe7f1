//! State synchronization and turn orchestration for the Laundromat Tycoon
//! client.
//!
//! The remote simulation server owns every game rule. This crate keeps the
//! client's single cached copy of the game in step with it and drives turn
//! advancement.
//!
//! # Architecture
//!
//! ```text
//! consumer --command--> Store --request--> Transport --HTTP--> simulation server
//!     ^                   |
//!     +----watch<StoreState>---- snapshot replaced (if still current)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Environment-driven [`ClientConfig`].
//! - [`error`] -- [`ClientError`] taxonomy for transport failures.
//! - [`transport`] -- One-request-per-command JSON client.
//! - [`sequence`] -- Per-slot request tickets that discard stale responses.
//! - [`selectors`] -- Pure [`GameView`] projections over a snapshot.
//! - [`store`] -- The [`Store`]: cache, commands and subscriptions.
//! - [`turn`] -- [`TurnController`]: manual advance, auto-play, restart.
//!
//! [`ClientConfig`]: config::ClientConfig
//! [`ClientError`]: error::ClientError
//! [`GameView`]: selectors::GameView
//! [`Store`]: store::Store
//! [`TurnController`]: turn::TurnController

pub mod config;
pub mod error;
pub mod selectors;
pub mod sequence;
pub mod store;
pub mod transport;
pub mod turn;

pub use config::ClientConfig;
pub use error::ClientError;
pub use selectors::GameView;
pub use store::{Store, StoreState};
pub use turn::{TurnController, TurnError};
