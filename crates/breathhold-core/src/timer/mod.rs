mod clock;
mod pattern;
mod sequencer;
mod stopwatch;
mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use pattern::{PatternConfig, PatternVariant};
pub use sequencer::{BreathingPhase, BreathingSequencer, SequencerEvent};
pub use stopwatch::HoldStopwatch;
pub use tick::{FrameTicker, IntervalTicker, TickSource, BREATHING_TICK, FRAME_TICK};
