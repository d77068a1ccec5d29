pub mod clock;
pub mod frames;
pub mod timer;

pub use clock::SessionClock;
pub use frames::{FrameLog, FrameStats};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
