//! Terminal front-end for Laundromat Tycoon.
//!
//! Runs one command against the simulation server through the shared
//! [`Store`] and prints the result. Every gameplay change goes through a
//! store command; the CLI only reads the published state afterwards.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Parse the command line
//! 3. Load [`ClientConfig`] from environment variables
//! 4. Build the store and turn controller
//! 5. Run the requested command and print its outcome

mod command;

use anyhow::{Context, anyhow};
use clap::Parser;
use laundromat_client::{ClientConfig, Store, TurnController};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::command::{Cli, Command};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("loading client configuration")?;
    info!(
        server_url = %config.server_url,
        player_id = %config.player_id,
        auto_play_interval_ms = config.auto_play_interval.as_millis(),
        "configuration loaded"
    );

    let store = Store::new(&config)?;
    let controller = TurnController::from_config(store.clone(), &config);
    run(&store, &controller, cli.command).await
}

async fn run(store: &Store, controller: &TurnController, command: Command) -> anyhow::Result<()> {
    match command {
        Command::State => {
            succeed(store, store.fetch_state().await)?;
            print_summary(store);
        }
        Command::NextTurn => {
            controller.advance_week().await?;
            print_summary(store);
        }
        Command::NextDay => {
            controller.advance_day().await?;
            print_summary(store);
        }
        Command::Action {
            action_type,
            parameters,
        } => {
            succeed(store, store.send_action(&action_type, parameters).await)?;
            print_summary(store);
        }
        Command::Message {
            recipient,
            text,
            channel,
            intent,
        } => {
            let sent = store.send_message(channel, &recipient, &text, intent).await;
            succeed(store, sent)?;
            println!("message sent to {recipient}");
        }
        Command::Negotiate { vendor, item } => {
            let outcome = store.negotiate(&vendor, &item).await;
            print_json(&present(store, outcome)?)?;
        }
        Command::Chat { vendor, item, text } => {
            let reply = store.negotiate_chat(&vendor, &item, &text).await;
            print_json(&present(store, reply)?)?;
        }
        Command::History { vendor, item } => {
            let turns = store.negotiation_history(&vendor, &item).await;
            print_json(&present(store, turns)?)?;
        }
        Command::Credit => {
            succeed(store, store.fetch_credit_report().await)?;
            print_json(&store.credit_report().as_deref())?;
        }
        Command::Zone => {
            succeed(store, store.fetch_zone_info().await)?;
            print_json(&store.zone_info().as_deref())?;
        }
        Command::Calendar => {
            succeed(store, store.fetch_calendar().await)?;
            print_json(&store.calendar().as_deref())?;
        }
        Command::Reset => {
            let mut reset = false;
            controller.restart(|ok| reset = ok).await;
            succeed(store, reset)?;
            println!("game reset");
        }
        Command::Scenario { name } => {
            succeed(store, store.start_scenario(&name).await)?;
            print_summary(store);
        }
        Command::Autoplay { turns } => auto_play(store, controller, turns).await?,
    }
    Ok(())
}

/// Auto-play until `turns` weeks have passed or ctrl-c is pressed.
async fn auto_play(
    store: &Store,
    controller: &TurnController,
    turns: Option<u32>,
) -> anyhow::Result<()> {
    if store.snapshot().is_none() {
        succeed(store, store.fetch_state().await)?;
    }
    let start_week = store.snapshot().map_or(1, |s| s.week);
    let target = turns.map(|n| start_week.saturating_add(n));

    controller.start_auto_play().await;
    let mut rx = store.subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for ctrl-c")?;
            info!("interrupted");
        }
        () = async {
            loop {
                let reached = {
                    let state = rx.borrow_and_update();
                    match (target, state.game_state.as_ref()) {
                        (Some(target), Some(game)) => game.week >= target,
                        _ => false,
                    }
                };
                if reached || rx.changed().await.is_err() {
                    break;
                }
            }
        } => {}
    }
    controller.stop_auto_play().await;

    info!(
        start_week,
        week = ?store.snapshot().map(|s| s.week),
        "auto-play finished"
    );
    print_summary(store);
    Ok(())
}

fn succeed(store: &Store, ok: bool) -> anyhow::Result<()> {
    if ok {
        Ok(())
    } else {
        Err(command_error(store))
    }
}

fn present<T>(store: &Store, value: Option<T>) -> anyhow::Result<T> {
    value.ok_or_else(|| command_error(store))
}

fn command_error(store: &Store) -> anyhow::Error {
    anyhow!(
        store
            .error()
            .unwrap_or_else(|| "command failed".to_owned())
    )
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(store: &Store) {
    store.view(|view| {
        let Some((week, day, season)) = view.calendar_position() else {
            println!("no game loaded");
            return;
        };
        println!("week {week}, {day:?} ({season:?})");

        if let Some(player) = view.player_laundromat() {
            println!(
                "  {}: balance {} | price {} | machines {}/{} | social {:.1} | open tickets {}",
                player.name,
                player.balance,
                player.price,
                player.working_machines(),
                player.machines,
                player.social_score.total(),
                player.open_ticket_count(),
            );
        }
        for rival in view.competitors() {
            println!(
                "  rival {}: balance {} | price {}",
                rival.name, rival.balance, rival.price
            );
        }
        println!("  unread messages: {}", view.unread_message_count());
        for event in view.events().iter().rev().take(3) {
            println!("  * {event}");
        }
    });
}
