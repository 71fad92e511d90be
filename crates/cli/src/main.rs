mod config;
mod format_cmd;
mod output;
mod timeline_cmd;

use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatline", about = "chatline - chat timeline formatting and grouping")]
struct Cli {
    /// Use this config file instead of ~/.config/chatline/chatline.toml
    #[arg(long, global = true, env = "CHATLINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format an epoch-seconds timestamp
    Format {
        /// Epoch seconds
        timestamp: String,

        /// Selector code (t, T, d, D, f, F, R) or name; unknown values use the default layout
        #[arg(long, short)]
        style: Option<String>,

        /// Locale tag, e.g. en-US or de-DE
        #[arg(long)]
        locale: Option<String>,

        /// Render in UTC instead of the system time zone
        #[arg(long)]
        utc: bool,
    },

    /// Replace <t:EPOCH:CODE> tokens in a line of message text
    Markup {
        /// Message text
        text: String,

        #[arg(long)]
        locale: Option<String>,

        #[arg(long)]
        utc: bool,
    },

    /// Group a message file into a timeline with day and unread dividers
    Timeline {
        /// JSON array, {"messages": [...]} object, or JSON lines
        file: PathBuf,

        /// Maximum gap in seconds between messages of one run
        #[arg(long)]
        window: Option<i64>,

        /// Id of the first unread message
        #[arg(long)]
        first_unread: Option<String>,

        /// Input order
        #[arg(long, value_enum)]
        order: Option<timeline_cmd::OrderArg>,

        /// Viewer is signed in (enables start-of-conversation and loading rows)
        #[arg(long)]
        authenticated: bool,

        /// More history exists before the first message
        #[arg(long)]
        has_more: bool,

        /// Older history is being fetched
        #[arg(long)]
        loading_older: bool,

        #[arg(long)]
        utc: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = config::load_config(cli.config.as_deref()).and_then(|cfg| match cli.command {
        Commands::Format {
            timestamp,
            style,
            locale,
            utc,
        } => format_cmd::run_format(
            &cfg,
            &timestamp,
            format_cmd::FormatOptions { style, locale, utc },
        ),
        Commands::Markup { text, locale, utc } => format_cmd::run_markup(
            &cfg,
            &text,
            format_cmd::FormatOptions {
                style: None,
                locale,
                utc,
            },
        ),
        Commands::Timeline {
            file,
            window,
            first_unread,
            order,
            authenticated,
            has_more,
            loading_older,
            utc,
            format,
        } => timeline_cmd::run_timeline(
            &cfg,
            &file,
            timeline_cmd::TimelineOptions {
                window,
                first_unread,
                order,
                authenticated,
                has_more,
                loading_older,
                utc,
                format,
            },
        ),
        Commands::Config => config::show_config(&cfg),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
