use time::macros::offset;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// India Standard Time, which submission dates are reported in.
pub const REPORT_OFFSET: UtcOffset = offset!(+5:30);

/// `REPORT_OFFSET` as a SQLite date modifier, e.g. `+330 minutes`.
pub fn report_offset_modifier() -> String {
    format!("{:+} minutes", REPORT_OFFSET.whole_minutes())
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn today() -> Date {
    now().date()
}

/// Formats a stored UTC timestamp the way an `en-IN` locale prints
/// date-times, e.g. `5/1/2025, 3:04:09 pm`.
pub fn format_en_in(timestamp: PrimitiveDateTime) -> String {
    let local = timestamp.assume_utc().to_offset(REPORT_OFFSET);
    let (hour, suffix) = match local.hour() {
        0 => (12, "am"),
        hour @ 1..=11 => (hour, "am"),
        12 => (12, "pm"),
        hour => (hour - 12, "pm"),
    };

    format!(
        "{}/{}/{}, {}:{:02}:{:02} {}",
        local.day(),
        u8::from(local.month()),
        local.year(),
        hour,
        local.minute(),
        local.second(),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn the_offset_is_a_sqlite_modifier() {
        assert_eq!(report_offset_modifier(), "+330 minutes");
    }

    #[test]
    fn formats_in_india_standard_time() {
        assert_eq!(
            format_en_in(datetime!(2025-01-04 21:04:09)),
            "5/1/2025, 2:34:09 am"
        );
        assert_eq!(
            format_en_in(datetime!(2025-10-18 08:00:00)),
            "18/10/2025, 1:30:00 pm"
        );
    }

    #[test]
    fn midnight_and_noon_use_twelve() {
        assert_eq!(
            format_en_in(datetime!(2025-03-01 18:30:00)),
            "2/3/2025, 12:00:00 am"
        );
        assert_eq!(
            format_en_in(datetime!(2025-03-01 06:30:05)),
            "1/3/2025, 12:00:05 pm"
        );
    }
}
