use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueHint};
use tracing::info;

use lesson_summary::commands::{form, generate};
use lesson_summary::config::{Overrides, Settings};
use lesson_summary::grade::GradeLevel;
use lesson_summary::{llm, logging};

#[derive(Parser, Debug)]
#[command(
    name = "lesson-summary",
    version,
    about = "Turn learning targets into a lesson summary.",
    long_about = None,
    propagate_version = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Model to request the summary from
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,
    /// Upper bound on the length of the generated summary, in tokens
    #[arg(long, global = true, value_name = "COUNT")]
    max_tokens: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the form (the default when no command is given)
    Form {
        /// Grade level selected when the form opens
        #[arg(long, value_name = "GRADE")]
        grade: Option<GradeLevel>,
    },
    /// Generate a summary without the form and print it
    Generate {
        /// Grade level, e.g. "Grade 3", "Algebra 1" or "K"
        #[arg(long, short, value_name = "GRADE")]
        grade: GradeLevel,
        /// Learning targets as text. Read from stdin when neither this nor --file is given.
        #[arg(long, short, value_name = "TEXT", conflicts_with = "file")]
        targets: Option<String>,
        /// File containing the learning targets
        #[arg(long, short, value_name = "PATH", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    /// List the available grade levels
    Grades,
    /// Manage the Anthropic API key
    Key {
        /// Store a key in the local auth file. Prompts when no key is given.
        #[arg(long, value_name = "KEY", num_args = 0..=1, conflicts_with = "clear")]
        set: Option<Option<String>>,
        /// Remove the stored key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured key with a minimal API call
        #[arg(long)]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_path) = logging::init() {
        info!(log = %log_path.display(), "lesson-summary starting");
    }

    let overrides = Overrides {
        model: cli.model,
        max_tokens: cli.max_tokens,
    };

    match cli.command.unwrap_or(Command::Form { grade: None }) {
        Command::Form { grade } => {
            let settings = Settings::load(&overrides)?;
            let (client, _) = llm::ensure_client(settings)?;
            form::run(client, grade.unwrap_or_default()).await?;
        }
        Command::Generate {
            grade,
            targets,
            file,
        } => {
            let settings = Settings::load(&overrides)?;
            let (client, _) = llm::ensure_client(settings)?;
            let input = generate::TargetsInput::from_args(targets, file);
            generate::run(&client, grade, input).await?;
        }
        Command::Grades => {
            for label in GradeLevel::labels() {
                println!("{label}");
            }
        }
        Command::Key { set, clear, test } => handle_key_command(set, clear, test, &overrides).await?,
    }

    Ok(())
}

async fn handle_key_command(
    set: Option<Option<String>>,
    clear: bool,
    test: bool,
    overrides: &Overrides,
) -> Result<()> {
    let mut action_taken = false;

    if let Some(value) = set {
        let key = match value {
            Some(key) => key,
            None => llm::prompt_for_api_key()?,
        };
        llm::store_api_key(&key)?;
        println!("Stored Anthropic API key in the local auth file.");
        action_taken = true;
    }

    if clear {
        if llm::clear_api_key()? {
            println!("Removed the stored Anthropic API key.");
        } else {
            println!("No Anthropic API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let settings = Settings::load(overrides)?;
        let source = llm::test_configured_api_key(settings).await?;
        println!("Anthropic API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
