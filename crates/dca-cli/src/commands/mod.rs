pub mod analytics;
pub mod calendar;
pub mod ledger;
pub mod time_value;

use chrono::NaiveDate;

/// `--as-of` if given, otherwise today's local date.
pub fn as_of_or_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}
