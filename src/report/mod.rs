pub mod calendar;
pub mod generator;
pub mod stats;

pub use calendar::{day_total, group_by_date, local_date, CalendarEntry, CalendarMonth};
pub use generator::MonthReport;
pub use stats::{target_percentage, Statistics};
