pub mod color;
pub mod enums;
pub mod task;

pub use color::{hue_for, hue_to_rgb};
pub use enums::TimerState;
pub use task::{format_clock, format_duration, split_hours_minutes, Task, MILLIS_PER_HOUR};
