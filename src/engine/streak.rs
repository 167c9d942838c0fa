//! Streak continuation and decay rules.
//!
//! Both functions take an explicit `today` so the calendar math never reads
//! the wall clock. `advance` runs on exercise completion; `decay_on_load`
//! runs once when stored progress is loaded.

use chrono::{Days, NaiveDate};

use crate::progress::state::Streak;

/// Apply an exercise completion on `today`.
///
/// Same-day repeats leave the streak unchanged; a completion exactly one day
/// after the last active date continues the streak; anything else starts a
/// new streak of 1.
pub fn advance(streak: &Streak, today: NaiveDate) -> Streak {
    if streak.last_date == Some(today) {
        return streak.clone();
    }

    let continued = streak
        .last_date
        .and_then(|last| last.checked_add_days(Days::new(1)))
        .is_some_and(|next| next == today);

    Streak {
        count: if continued { streak.count + 1 } else { 1 },
        last_date: Some(today),
    }
}

/// Elapsed-time decay applied at load, independent of any action.
///
/// If the stored last active date is neither today nor yesterday, the streak
/// is dead: count resets to 0 and the date clears.
pub fn decay_on_load(streak: &Streak, today: NaiveDate) -> Streak {
    match streak.last_date {
        Some(last) if is_today_or_yesterday(last, today) => streak.clone(),
        Some(_) => Streak::default(),
        None => streak.clone(),
    }
}

fn is_today_or_yesterday(date: NaiveDate, today: NaiveDate) -> bool {
    date == today || date.checked_add_days(Days::new(1)) == Some(today)
}
