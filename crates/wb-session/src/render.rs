//! Chat text for roll announcements and failures.

use wb_dice::{DiceError, DicePool, GroupResults, RollOutcome};

use crate::ids::UserId;

/// Platform mention markup for a user.
pub fn mention(user: &UserId) -> String {
    format!("<@{user}>")
}

/// The public summary of a resolved pool.
pub fn roll_announcement(user: &UserId, pool: &DicePool, outcome: &RollOutcome) -> String {
    let mut lines = vec![format!("🎲 {} rolled **{pool}**", mention(user))];

    for group in &outcome.groups {
        let line = match &group.results {
            GroupResults::Numeric { values, subtotal } => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!(
                    "**{} × {}:** {} (subtotal: {subtotal})",
                    group.count(),
                    group.kind.display_name(),
                    values.join(", ")
                )
            }
            GroupResults::Plot { outcomes } => {
                let labels: Vec<String> = outcomes.iter().map(|o| o.to_string()).collect();
                format!(
                    "**{} × {}:** {}",
                    group.count(),
                    group.kind.display_name(),
                    labels.join(", ")
                )
            }
        };
        lines.push(line);
    }

    lines.push(format!("🧮 **Grand Total: {}**", outcome.grand_total));
    lines.join("\n")
}

/// The private notice sent when a roll could not be performed.
pub fn roll_failed(error: &DiceError) -> String {
    format!("⚠️ The dice could not be rolled ({error}). Your pool is unchanged; press **Roll Now!** to try again.")
}
