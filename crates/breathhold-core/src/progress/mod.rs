mod ledger;
mod unlock;

pub use ledger::{local_day, FoldOutcome, Progress};
pub use unlock::UnlockFeature;
