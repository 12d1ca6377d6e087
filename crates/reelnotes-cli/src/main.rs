use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, movie, review, search, session, sync, watch};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelnotes")]
#[command(about = "ReelNotes - Find movies, read reviews, keep your own")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search the movie catalogue. Every hit is cached locally as a stub and shown together with your own review of it, if you wrote one.")]
    Search {
        /// Search query
        query: String,

        /// Result page (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a movie with its reviews
    #[command(long_about = "Show the full details of a movie, your own review of it and everyone else's reviews. Details are served from the local cache when they are complete.")]
    Movie {
        /// Movie id
        id: u64,
    },
    /// Follow a movie and its reviews until interrupted
    #[command(long_about = "Fetch a movie with its reviews once, then print it again every time your own review of it changes. Stops on Ctrl-C.")]
    Watch {
        /// Movie id
        id: u64,
    },
    /// Write a review for a movie
    Review {
        /// Movie id
        id: u64,

        /// Rating from 1 to 10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,

        /// Review text
        #[arg(long)]
        text: String,
    },
    /// Download all of your reviews into the local cache
    #[command(long_about = "Fetch every review you wrote and store it locally. Unless disabled in the configuration, the details of each reviewed movie are fetched too. Failures are reported but do not abort the sync.")]
    Sync,
    /// Store the session used to write reviews
    Login {
        /// Your user id
        #[arg(long)]
        user_id: String,

        /// Your email address
        #[arg(long)]
        email: String,

        /// API access token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the session and every locally stored review
    Logout,
    /// View or create the configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear cached data
    #[command(long_about = "Clear the local movie and review cache or the stored credentials. Use --cache, --credentials or --all.")]
    Clear {
        /// Clear cache and credentials
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["cache", "credentials"])]
        all: bool,

        /// Clear the cache snapshot
        #[arg(long, action = ArgAction::SetTrue)]
        cache: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the access token)
    Show {
        /// Show the access token unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a configuration file with default values
    Init {
        /// API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query, page } => search::run_search(&query, page, &output).await,
        Commands::Movie { id } => movie::run_movie(id, &output).await,
        Commands::Watch { id } => watch::run_watch(id, &output).await,
        Commands::Review { id, rating, text } => review::run_review(id, rating, text, &output).await,
        Commands::Sync => sync::run_sync(&output).await,
        Commands::Login { user_id, email, token } => session::run_login(user_id, email, token, &output).await,
        Commands::Logout => session::run_logout(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { all, cache, credentials } => clear::run_clear(all, cache, credentials, &output).await,
    }
}
