use breathhold_core::display::format_hold;
use breathhold_core::storage::{Database, ProgressStore};
use chrono::Local;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Ledger summary
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let progress = db.load_progress();

    match action {
        StatsAction::Show { json: true } => {
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        StatsAction::Show { json: false } => {
            println!("Current streak:  {} day(s)", progress.current_streak());
            println!("Longest streak:  {} day(s)", progress.longest_streak());
            println!("Total sessions:  {}", progress.total_sessions());
            println!("Personal best:   {}", format_hold(progress.personal_best_secs()));
            match progress.last_session_date() {
                Some(at) => println!(
                    "Last session:    {}",
                    at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                ),
                None => println!("Last session:    never"),
            }
            println!("Unlocked:        {}", progress.unlocked().len());
        }
    }
    Ok(())
}
