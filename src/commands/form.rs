use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::grade::GradeLevel;
use crate::llm::{LessonClient, LlmError};
use crate::tui::view::render_form;
use crate::tui::{Focus, FormState};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const SUMMARY_PAGE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Submit,
    Quit,
}

pub async fn run(client: LessonClient, grade: GradeLevel) -> Result<()> {
    info!(model = %client.settings().model, grade = %grade, "opening form");
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.show_cursor()?;

    let form_result = run_form_loop(&mut terminal, client, grade).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    form_result
}

async fn run_form_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: LessonClient,
    grade: GradeLevel,
) -> Result<()> {
    let mut state = FormState::new(grade);
    let mut pending: Option<SummaryTask> = None;

    loop {
        collect_finished(&mut state, &mut pending).await?;

        let now = Instant::now();
        terminal.draw(|frame| render_form(frame, &mut state, now))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match handle_key(&mut state, key) {
            KeyAction::Continue => {}
            KeyAction::Quit => break,
            KeyAction::Submit => {
                let Some(submission) = state.submit(Instant::now()) else {
                    continue;
                };
                match submission {
                    Ok(request) => {
                        let client = client.clone();
                        pending = Some(tokio::spawn(async move {
                            client.summarize(&request).await
                        }));
                    }
                    Err(err) => info!(reason = %err, "submission rejected"),
                }
            }
        }
    }

    cancel_pending(&mut pending);
    Ok(())
}

type SummaryTask = JoinHandle<Result<String, LlmError>>;

/// Moves a finished request's result into the form. Leaves a running request alone.
async fn collect_finished(state: &mut FormState, pending: &mut Option<SummaryTask>) -> Result<()> {
    let Some(handle) = pending.take_if(|handle| handle.is_finished()) else {
        return Ok(());
    };

    let result = handle
        .await
        .map_err(|err| anyhow!("summary task failed: {err}"))?;
    if let Err(err) = &result {
        warn!(error = %err, "lesson summary request failed");
    }
    state.finish(result.map_err(|err| err.to_string()));
    Ok(())
}

fn cancel_pending(pending: &mut Option<SummaryTask>) {
    if let Some(handle) = pending.take() {
        info!("abandoning lesson summary request");
        handle.abort();
    }
}

/// Applies one key press to the form and says what the loop should do next.
pub fn handle_key(state: &mut FormState, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Continue;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('c') if ctrl => return KeyAction::Quit,
        KeyCode::Char('g') | KeyCode::Char('s') if ctrl => return KeyAction::Submit,
        KeyCode::Char('l') if ctrl => {
            state.clear_targets();
            return KeyAction::Continue;
        }
        KeyCode::Tab => {
            state.focus_next();
            return KeyAction::Continue;
        }
        KeyCode::BackTab => {
            state.focus_previous();
            return KeyAction::Continue;
        }
        _ => {}
    }

    match state.focus {
        Focus::Grade => match key.code {
            KeyCode::Up | KeyCode::Char('k') => state.select_previous_grade(),
            KeyCode::Down | KeyCode::Char('j') => state.select_next_grade(),
            KeyCode::Home => state.select_first_grade(),
            KeyCode::End => state.select_last_grade(),
            KeyCode::Enter => state.focus_next(),
            _ => {}
        },
        Focus::Targets => edit_targets(state, key, ctrl),
        Focus::Summary => match key.code {
            KeyCode::Up | KeyCode::Char('k') => state.scroll_summary(-1),
            KeyCode::Down | KeyCode::Char('j') => state.scroll_summary(1),
            KeyCode::PageUp => state.scroll_summary(-SUMMARY_PAGE),
            KeyCode::PageDown => state.scroll_summary(SUMMARY_PAGE),
            KeyCode::Home => state.scroll_summary(i32::MIN / 2),
            _ => {}
        },
    }

    KeyAction::Continue
}

fn edit_targets(state: &mut FormState, key: KeyEvent, ctrl: bool) {
    let editor = &mut state.editor;
    match key.code {
        KeyCode::Char(c) if !ctrl => {
            let shifted = key.modifiers.contains(KeyModifiers::SHIFT) && c.is_lowercase();
            if shifted {
                c.to_uppercase().for_each(|upper| editor.insert_char(upper));
            } else {
                editor.insert_char(c);
            }
        }
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}
