use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod commands;
pub mod config;
pub mod errors;
pub mod fonts;
pub(crate) mod logging;
pub mod picker;
pub(crate) mod tui;

/// Terminal font picker for Google Fonts.
#[derive(Parser)]
#[command(name = "fontpick", version, about, long_about = None, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Choose the active font in an interactive dropdown.
    Pick(config::PickerArgs),

    /// Print the fonts the picker would offer, in list order.
    List {
        #[command(flatten)]
        picker: config::PickerArgs,

        /// Print full font metadata as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => commands::help::run(),
        Some(Command::Pick(args)) => commands::pick::run(args),
        Some(Command::List { picker, json }) => commands::list::run(picker, json),
        Some(Command::Completions { shell }) => commands::completions::run(shell),
    }
}
