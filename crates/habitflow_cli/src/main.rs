use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "habitflow", version, about = "Calendar-based habit tracker")]
struct Cli {
    /// Directory holding the persisted records.
    #[arg(long, global = true, default_value = ".habitflow")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a habit
    Add(commands::AddArgs),
    /// List all habits
    List,
    /// Show habits due on a date
    Due {
        /// Date to check (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Toggle a habit's completion for a date
    Toggle {
        id: String,
        /// Date key (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Skip a habit on a single date
    Skip {
        id: String,
        /// Date key (YYYY-MM-DD)
        date: String,
    },
    /// Stop a habit from a date onwards
    Stop {
        id: String,
        /// First date (YYYY-MM-DD) the habit should no longer appear on
        from: String,
    },
    /// Delete a habit
    Delete { id: String },
    /// Print the month calendar grid
    Month {
        #[arg(long)]
        year: Option<i32>,
        /// Month number 1..=12
        #[arg(long)]
        month: Option<u32>,
    },
    /// Print the week containing a date, with due habits per day
    Week {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Completion counts over a time window
    Stats {
        #[arg(long, value_enum, default_value = "month")]
        window: commands::WindowArg,
    },
    /// Set which day the week starts on
    WeekStart {
        #[arg(value_enum)]
        value: commands::WeekStartArg,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut store = commands::open_store(&cli.data_dir);

    let result = match cli.command {
        Commands::Add(args) => commands::add(&mut store, args),
        Commands::List => commands::list(&store),
        Commands::Due { date } => commands::due(&store, date.as_deref()),
        Commands::Toggle { id, date } => commands::toggle(&mut store, &id, date.as_deref()),
        Commands::Skip { id, date } => commands::skip(&mut store, &id, &date),
        Commands::Stop { id, from } => commands::stop(&mut store, &id, &from),
        Commands::Delete { id } => commands::delete(&mut store, &id),
        Commands::Month { year, month } => commands::month(&store, year, month),
        Commands::Week { date } => commands::week(&store, date.as_deref()),
        Commands::Stats { window } => commands::stats(&store, window),
        Commands::WeekStart { value } => commands::week_start(&mut store, value),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
