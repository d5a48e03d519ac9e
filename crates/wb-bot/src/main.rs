//! Chat bot frontend for the Würfelbecher dice-pool engine.

mod commands;

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wb_session::SessionConfig;

#[derive(Parser)]
#[command(
    name = "wb",
    about = "Würfelbecher: build a dice pool and roll it",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice pool once, e.g. `wb roll 3d6 2plot`
    Roll {
        /// Pool notation: `<count><die>` terms such as 3d6, 2plot, d20
        #[arg(required = true)]
        notation: Vec<String>,

        /// Name to credit the roll to
        #[arg(short, long, default_value = "you")]
        user: String,
    },

    /// List the dice that can be added to a pool
    Dice,

    /// Run interactive sessions on stdin/stdout in place of a chat platform
    Console {
        /// User id the console acts as
        #[arg(short, long, default_value = "console")]
        user: String,

        /// Channel id public messages are posted to
        #[arg(short, long, default_value = "general")]
        channel: String,

        /// Print outbound messages as JSON lines
        #[arg(long)]
        json: bool,

        /// Seconds the invitation accepts input (default: forever)
        #[arg(long)]
        invitation_timeout: Option<u64>,

        /// Seconds the die-type prompt accepts input after Add More
        #[arg(long, default_value = "20")]
        die_type_timeout: u64,

        /// Seconds the count prompt accepts input
        #[arg(long, default_value = "20")]
        count_timeout: u64,

        /// Seconds the add-more-or-roll prompt accepts input
        #[arg(long, default_value = "30")]
        decision_timeout: u64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wb_session=info,wb_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Roll { notation, user } => commands::roll::run(&notation.join(" "), &user),
        Commands::Dice => commands::dice::run(),
        Commands::Console {
            user,
            channel,
            json,
            invitation_timeout,
            die_type_timeout,
            count_timeout,
            decision_timeout,
        } => {
            let config = SessionConfig::default()
                .with_invitation_timeout(invitation_timeout.map(Duration::from_secs))
                .with_die_type_timeout(Duration::from_secs(die_type_timeout))
                .with_count_timeout(Duration::from_secs(count_timeout))
                .with_decision_timeout(Duration::from_secs(decision_timeout));
            commands::console::run(config, &user, &channel, json)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
