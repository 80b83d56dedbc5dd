//! quizdrop CLI: author, replay, and submit drag-and-drop quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizdrop", version, about = "Drag-and-drop quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config, example form, and gesture script
    Init,

    /// Validate form TOML files
    Validate {
        /// Path to form file or directory
        #[arg(long)]
        form: PathBuf,
    },

    /// Replay a gesture script against a local form and print the answers
    Play {
        /// Path to .toml form
        #[arg(long)]
        form: PathBuf,

        /// Path to .toml gesture script
        #[arg(long)]
        gestures: PathBuf,

        /// Output format: table, json, markdown
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Save a form to the API
    Publish {
        /// Path to .toml form
        #[arg(long)]
        form: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List forms stored in the API
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Answer a stored form with a gesture script and submit the response
    Submit {
        /// Id of the form to answer
        #[arg(long)]
        form_id: String,

        /// Path to .toml gesture script
        #[arg(long)]
        gestures: PathBuf,

        /// Also write the response JSON here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "quizdrop=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { form } => commands::validate::execute(form),
        Commands::Play {
            form,
            gestures,
            format,
            config,
        } => commands::play::execute(form, gestures, format, config),
        Commands::Publish { form, config } => commands::publish::execute(form, config).await,
        Commands::List { config } => commands::list::execute(config).await,
        Commands::Submit {
            form_id,
            gestures,
            output,
            config,
        } => commands::submit::execute(form_id, gestures, output, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
