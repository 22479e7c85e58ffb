pub mod months;

pub use months::{month_range, months_between_inclusive, MonthKey, START_MONTH};
