//! Subscription model and interval helpers

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::catalog::ReminderType;
use crate::core::IntervalError;

/// Interval choices offered as buttons, in minutes
pub const PRESET_INTERVALS: [u32; 4] = [15, 30, 60, 120];

/// A persisted recurring delivery for one user and reminder type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub user_id: String,
    pub reminder_type: ReminderType,
    pub interval_minutes: u32,
    pub next_due_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_due_at <= as_of
    }

    /// Next due time when delivered at `delivered_at`
    pub fn rescheduled_from(&self, delivered_at: DateTime<Utc>) -> DateTime<Utc> {
        next_due_after(delivered_at, self.interval_minutes)
    }
}

pub fn next_due_after(from: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
    from + Duration::minutes(i64::from(interval_minutes))
}

pub fn is_preset_interval(minutes: u32) -> bool {
    PRESET_INTERVALS.contains(&minutes)
}

fn digits_only() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"^[0-9]+$").expect("static pattern compiles"))
}

/// Map Arabic-Indic (U+0660..) and Extended Arabic-Indic (U+06F0..) digits to ASCII
fn ascii_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            '۰'..='۹' => char::from(b'0' + (c as u32 - '۰' as u32) as u8),
            _ => c,
        })
        .collect()
}

/// Validate free-text interval input from the custom entry step
pub fn parse_custom_interval(input: &str, max_minutes: u32) -> Result<u32, IntervalError> {
    let input = ascii_digits(input.trim());
    let input = input.as_str();
    if !digits_only().is_match(input) {
        return Err(IntervalError::NotANumber(input.to_string()));
    }

    // All digits but too long for u32 is still out of range
    let minutes = match input.parse::<u32>() {
        Ok(m) => m,
        Err(_) => return Err(IntervalError::TooLarge { max: max_minutes }),
    };

    if minutes == 0 {
        return Err(IntervalError::NotPositive);
    }
    if minutes > max_minutes {
        return Err(IntervalError::TooLarge { max: max_minutes });
    }
    Ok(minutes)
}

/// Format an interval in minutes into a human-readable string
pub fn format_interval(minutes: u32) -> String {
    let plural = |n: u32| if n == 1 { "" } else { "s" };

    if minutes < 60 {
        format!("{} minute{}", minutes, plural(minutes))
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let mins = minutes % 60;
        if mins > 0 {
            format!("{} hour{} {} minute{}", hours, plural(hours), mins, plural(mins))
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    } else {
        let days = minutes / 1440;
        let hours = (minutes % 1440) / 60;
        if hours > 0 {
            format!("{} day{} {} hour{}", days, plural(days), hours, plural(hours))
        } else {
            format!("{} day{}", days, plural(days))
        }
    }
}
