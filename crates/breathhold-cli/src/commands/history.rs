use breathhold_core::display::{format_hold, CompletionCategory};
use breathhold_core::storage::{Database, ProgressStore};
use chrono::Local;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Maximum number of sessions to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::List { limit, json } => {
            let sessions: Vec<_> = db.load_history().into_iter().rev().take(limit).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            if sessions.is_empty() {
                println!("No sessions recorded yet.");
                return Ok(());
            }
            for session in &sessions {
                let category = CompletionCategory::for_hold(session.hold_secs);
                println!(
                    "{}  {:<10}  {:>8}  {:?}",
                    session.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    session.variant.as_str(),
                    format_hold(session.hold_secs),
                    category,
                );
            }
        }
    }
    Ok(())
}
