//! Clock display strings

use crate::state::TimerMode;

/// Zero-padded `HH:MM:SS`. Hours are not capped.
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Timer face for a mode: `HH:MM:SS` when tracking, `MM:SS` when counting down
pub fn format_clock(mode: TimerMode, seconds: u64) -> String {
    match mode {
        TimerMode::Tracker => format_hms(seconds),
        TimerMode::Pomodoro => format!("{:02}:{:02}", seconds / 60, seconds % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_face_pads_every_field() {
        assert_eq!(format_clock(TimerMode::Tracker, 0), "00:00:00");
        assert_eq!(format_clock(TimerMode::Tracker, 3_723), "01:02:03");
        assert_eq!(format_hms(100 * 3600 + 59), "100:00:59");
    }

    #[test]
    fn pomodoro_face_is_minutes_and_seconds() {
        assert_eq!(format_clock(TimerMode::Pomodoro, 1_500), "25:00");
        assert_eq!(format_clock(TimerMode::Pomodoro, 61), "01:01");
        assert_eq!(format_clock(TimerMode::Pomodoro, 9), "00:09");
    }
}
