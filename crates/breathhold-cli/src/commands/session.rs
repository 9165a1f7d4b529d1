use std::io::{BufRead, Write};
use std::time::Duration;

use breathhold_core::display::{self, format_hold};
use breathhold_core::storage::{BackgroundWriter, Database, ProgressStore};
use breathhold_core::{
    Config, Event, MachineSettings, PatternVariant, SessionMachine, SessionState, SystemClock,
};
use clap::Subcommand;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run an interactive session (Enter ends the hold, q + Enter cancels)
    Run {
        /// Breathing pattern: standard, box or multi-hold
        #[arg(long)]
        variant: Option<PatternVariant>,
        /// Print events as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// List breathing patterns and their timings
    Variants,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run { variant, json } => run_session(variant, json),
        SessionAction::Variants => {
            for variant in PatternVariant::ALL {
                let config = variant.config();
                let hold = config
                    .hold_secs
                    .map(|h| format!("{h}s"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<10}  in {}s / hold {} / out {}s  x{}  {}",
                    variant.as_str(),
                    config.inhale_secs,
                    hold,
                    config.exhale_secs,
                    config.cycles,
                    variant.description(),
                );
            }
            Ok(())
        }
    }
}

enum Input {
    Enter,
    Quit,
}

/// Forward stdin lines so the frame loop never blocks on the terminal.
fn spawn_input() -> UnboundedReceiver<Input> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let input = match line {
                Ok(line) if line.trim().eq_ignore_ascii_case("q") => Input::Quit,
                Ok(_) => Input::Enter,
                Err(_) => break,
            };
            if tx.send(input).is_err() {
                return;
            }
        }
        let _ = tx.send(Input::Quit);
    });
    rx
}

fn run_session(
    variant: Option<PatternVariant>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let variant = variant.unwrap_or(config.session.default_variant);
    tracing::debug!(%variant, "Starting interactive session");

    let db = Database::open()?.with_history_limit(config.storage.history_limit);
    let progress = db.load_progress();
    let writer = BackgroundWriter::spawn(db)?;

    let mut machine = SessionMachine::new(SystemClock::new(), progress)
        .with_settings(MachineSettings::from(&config.session))
        .with_sink(writer);
    let frame = machine.settings().frame_tick;

    let mut input = spawn_input();
    let mut printer = Printer::new(json);

    printer.print_all(&machine.start_session(variant))?;
    loop {
        printer.print_all(&machine.tick())?;

        match input.try_recv() {
            Ok(Input::Enter) if machine.state() == SessionState::Holding => {
                printer.print_all(&machine.end_hold())?;
            }
            Ok(Input::Quit) | Err(TryRecvError::Disconnected) => {
                printer.print_all(&machine.cancel_session())?;
            }
            Ok(Input::Enter) | Err(TryRecvError::Empty) => {}
        }

        match machine.state() {
            SessionState::Holding => printer.hold_clock(machine.hold_elapsed())?,
            SessionState::Completed | SessionState::Ready => break,
            SessionState::Breathing | SessionState::Transitioning => {}
        }
        std::thread::sleep(frame);
    }

    if let Some(category) = machine.completion_category() {
        if !json {
            println!("{}", category.message());
        }
    }
    printer.print_all(&machine.return_to_main())?;
    // Dropping the machine drops the writer, which drains pending saves.
    drop(machine);
    Ok(())
}

struct Printer {
    json: bool,
    last_tenths: Option<u128>,
}

impl Printer {
    fn new(json: bool) -> Self {
        Self {
            json,
            last_tenths: None,
        }
    }

    fn print_all(&mut self, events: &[Event]) -> std::io::Result<()> {
        for event in events {
            self.print(event)?;
        }
        Ok(())
    }

    fn print(&mut self, event: &Event) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        if self.json {
            let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
            return writeln!(out, "{line}");
        }
        if self.last_tenths.take().is_some() {
            writeln!(out)?;
        }
        match event {
            Event::SessionStarted { variant, .. } => {
                writeln!(out, "{} - {}", variant.display_name(), variant.description())
            }
            Event::PhaseChanged {
                phase,
                remaining_secs,
                ..
            } => {
                let caption = display::cycle_caption(*phase)
                    .map(|c| format!("  ({c})"))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "{:<12} {:>2}s  {}{caption}",
                    display::phase_label(*phase),
                    remaining_secs,
                    display::phase_instruction(*phase),
                )
            }
            Event::BreathingCompleted { .. } => writeln!(out, "Breathing complete."),
            Event::HoldStarted { .. } => writeln!(
                out,
                "{}. Press Enter when you breathe.",
                display::state_instruction(SessionState::Holding)
            ),
            Event::HoldCompleted { hold_secs, .. } => {
                writeln!(out, "Held for {}", format_hold(*hold_secs))
            }
            Event::PersonalBest {
                hold_secs,
                previous_secs,
                ..
            } => writeln!(
                out,
                "New personal best: {} (was {})",
                format_hold(*hold_secs),
                format_hold(*previous_secs)
            ),
            Event::FeatureUnlocked {
                feature, streak, ..
            } => writeln!(
                out,
                "Unlocked {} at a {streak}-day streak: {}",
                feature.display_name(),
                feature.description()
            ),
            Event::SessionCancelled { .. } => writeln!(out, "Session cancelled."),
            Event::ReturnedToReady { .. } | Event::StateSnapshot { .. } => Ok(()),
        }
    }

    /// Redraw the running hold clock in place, once per tenth of a second.
    fn hold_clock(&mut self, elapsed: Duration) -> std::io::Result<()> {
        if self.json {
            return Ok(());
        }
        let tenths = elapsed.as_millis() / 100;
        if self.last_tenths == Some(tenths) {
            return Ok(());
        }
        self.last_tenths = Some(tenths);
        let mut out = std::io::stdout().lock();
        write!(out, "\r  {}", format_hold(elapsed.as_secs_f64()))?;
        out.flush()
    }
}
