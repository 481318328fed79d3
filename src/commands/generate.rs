use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::grade::GradeLevel;
use crate::llm::LessonClient;
use crate::palette::Palette;
use crate::prompt::LessonRequest;
use crate::tui::view::{PENDING_MESSAGE, SUCCESS_MESSAGE};

/// Where the learning targets come from on the command line.
#[derive(Debug, Clone)]
pub enum TargetsInput {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl TargetsInput {
    pub fn from_args(targets: Option<String>, file: Option<PathBuf>) -> Self {
        match (targets, file) {
            (Some(text), _) => TargetsInput::Inline(text),
            (None, Some(path)) => TargetsInput::File(path),
            (None, None) => TargetsInput::Stdin,
        }
    }

    fn read(self) -> Result<String> {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        self.read_with(stdin.lock(), interactive)
    }

    fn read_with(self, mut stdin: impl Read, interactive: bool) -> Result<String> {
        match self {
            TargetsInput::Inline(text) => Ok(text),
            TargetsInput::File(path) => fs::read_to_string(&path).with_context(|| {
                format!("Failed to read learning targets from {}", path.display())
            }),
            TargetsInput::Stdin => {
                if interactive {
                    bail!("No learning targets given. Pass --targets, --file, or pipe them on stdin.");
                }
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .context("Failed to read learning targets from stdin")?;
                Ok(text)
            }
        }
    }
}

pub async fn run(client: &LessonClient, grade: GradeLevel, input: TargetsInput) -> Result<()> {
    let targets = input.read()?;
    let request = LessonRequest::new(grade, &targets)?;

    eprintln!(
        "{} {}",
        Palette::INFO.paint(grade),
        Palette::dim(PENDING_MESSAGE)
    );

    let summary = client
        .summarize(&request)
        .await
        .context("An error occurred")?;

    eprintln!("{}", Palette::SUCCESS.paint(SUCCESS_MESSAGE));
    println!("{summary}");
    Ok(())
}
