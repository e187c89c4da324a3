//! Due-date presentation helpers. All comparisons are on local calendar
//! dates; callers pass `today` so results are deterministic.

use chrono::{Local, NaiveDate};

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// `"Today"`, `"Tomorrow"`, or an abbreviated month and day such as `"Mar 1"`.
pub fn due_label(due: NaiveDate, today: NaiveDate) -> String {
    if due == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(due) {
        return "Tomorrow".to_string();
    }
    due.format("%b %-d").to_string()
}

/// Strictly before today and still open. Completed tasks are never overdue.
pub fn is_overdue(due: Option<NaiveDate>, completed: bool, today: NaiveDate) -> bool {
    match due {
        Some(date) => !completed && date < today,
        None => false,
    }
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got {raw:?}: {err}"))
}
