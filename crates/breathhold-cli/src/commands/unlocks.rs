use breathhold_core::storage::{Database, ProgressStore};
use breathhold_core::UnlockFeature;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let progress = db.load_progress();

    println!("Current streak: {} day(s)\n", progress.current_streak());
    for feature in UnlockFeature::ALL {
        let mark = if progress.is_unlocked(feature) { "x" } else { " " };
        println!(
            "[{mark}] {:<16} {:>2}-day streak  {}",
            feature.display_name(),
            feature.required_streak(),
            feature.description(),
        );
    }
    Ok(())
}
