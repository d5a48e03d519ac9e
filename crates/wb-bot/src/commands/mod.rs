pub mod console;
pub mod dice;
pub mod roll;

use colored::Colorize;

use wb_session::{Outbound, Prompt};

/// Print an outbound message the way a chat client would show it.
fn print_outbound(message: &Outbound, json: bool) -> Result<(), String> {
    if json {
        let line = serde_json::to_string(message).map_err(|e| e.to_string())?;
        println!("{line}");
        return Ok(());
    }

    let header = match message {
        Outbound::Public { channel, .. } => format!("[#{channel}]").bold(),
        Outbound::Ephemeral { target, .. } => format!("[only {target}]").dimmed(),
    };
    println!("{header}");
    for line in message.text().lines() {
        println!("  {line}");
    }
    if let Some(prompt) = message.prompt() {
        println!("  {}", render_options(prompt));
    }
    println!();
    Ok(())
}

/// One line listing a prompt's options with their numbers.
fn render_options(prompt: &Prompt) -> String {
    let options: Vec<String> = prompt
        .body
        .options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("[{}] {}", i + 1, o.label))
        .collect();
    let expiry = prompt
        .timeout
        .map(|t| format!(" (expires in {}s)", t.as_secs()))
        .unwrap_or_default();
    format!("{}{expiry}", options.join("  "))
}
