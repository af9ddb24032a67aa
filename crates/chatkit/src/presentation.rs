//! Small formatting rules shared by every renderer.

use chrono::{DateTime, Datelike, Utc};

use crate::model::{MessageStatus, Sender};

pub fn timestamp_label(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

/// "Today", "Yesterday", or a short calendar date.
pub fn day_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let day = timestamp.date_naive();
    let today = now.date_naive();

    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

/// A row opens a new day section when its calendar day differs from the previous row's.
pub fn starts_new_day(previous: Option<DateTime<Utc>>, current: DateTime<Utc>) -> bool {
    match previous {
        None => true,
        Some(previous) => {
            previous.year() != current.year() || previous.ordinal() != current.ordinal()
        }
    }
}

/// Delivery glyph, shown only under the current user's own messages.
pub fn status_glyph(sender: Sender, status: MessageStatus) -> Option<&'static str> {
    match sender {
        Sender::CurrentUser => Some(status.glyph()),
        Sender::OtherUser | Sender::System => None,
    }
}

pub fn format_byte_size(size_bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = size_bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{size_bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 5, 0).unwrap()
    }

    #[test]
    fn day_labels_are_relative_to_now() {
        let now = at(10, 18);
        assert_eq!(day_label(at(10, 1), now), "Today");
        assert_eq!(day_label(at(9, 23), now), "Yesterday");
        assert_eq!(day_label(at(2, 8), now), "Mar 2, 2026");
    }

    #[test]
    fn first_row_and_day_changes_open_sections() {
        assert!(starts_new_day(None, at(3, 9)));
        assert!(!starts_new_day(Some(at(3, 1)), at(3, 23)));
        assert!(starts_new_day(Some(at(3, 23)), at(4, 0)));
    }

    #[test]
    fn only_outgoing_messages_show_delivery_glyphs() {
        assert_eq!(
            status_glyph(Sender::CurrentUser, MessageStatus::Delivered),
            Some("✓✓")
        );
        assert_eq!(status_glyph(Sender::OtherUser, MessageStatus::Read), None);
        assert_eq!(status_glyph(Sender::System, MessageStatus::Failed), None);
    }

    #[test]
    fn byte_sizes_use_binary_units() {
        assert_eq!(format_byte_size(512), "512 B");
        assert_eq!(format_byte_size(2048), "2.0 KB");
        assert_eq!(format_byte_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn timestamps_render_as_clock_time() {
        assert_eq!(timestamp_label(at(3, 7)), "07:05");
    }
}
