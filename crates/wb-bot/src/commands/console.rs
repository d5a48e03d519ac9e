use std::sync::Arc;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use wb_dice::OsRandom;
use wb_session::{ChannelId, Interaction, Outbound, Prompt, SessionConfig, SessionHub, UserId};

pub fn run(config: SessionConfig, user: &str, channel: &str, json: bool) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    runtime.block_on(serve(
        config,
        UserId::new(user),
        ChannelId::new(channel),
        json,
    ))
}

async fn serve(
    config: SessionConfig,
    user: UserId,
    channel: ChannelId,
    json: bool,
) -> Result<(), String> {
    let (tx, mut rx) = mpsc::channel::<Outbound>(64);
    let hub = SessionHub::new(config, Arc::new(OsRandom::new()), tx);

    if !json {
        println!("  {} dice console as {user} in #{channel}", "Starting".bold());
        println!("  Type 'start' to open a pool, then answer prompts by label or number.");
        println!("  Type 'quit' to exit.\n");
    }

    // The most recent prompt shown; typed answers are applied to it.
    let mut current: Option<Prompt> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            break;
        }

        let event = if input.eq_ignore_ascii_case("start") {
            Interaction::SessionStart {
                invoker: user.clone(),
                channel: channel.clone(),
            }
        } else {
            let Some(prompt) = current.as_ref() else {
                println!("{}\n", "Nothing to answer yet. Type 'start'.".yellow());
                continue;
            };
            let Some(option) = prompt.option_for(input) else {
                println!("{}\n", format!("'{input}' is not one of the options.").yellow());
                continue;
            };
            prompt.interaction_for(option, user.clone())
        };

        if let Err(e) = hub.dispatch(event).await {
            debug!(error = %e, "console event not applied");
        }

        while let Ok(message) = rx.try_recv() {
            if let Some(prompt) = message.prompt() {
                current = Some(prompt.clone());
            }
            super::print_outbound(&message, json)?;
        }
    }

    Ok(())
}
