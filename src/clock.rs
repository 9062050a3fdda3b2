//! Wall clock abstraction so timestamps can be pinned in tests.

use std::fmt::Debug;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `2024-05-01T12:30:00.123Z`
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Source of the current instant.
pub trait Clock: Send + Sync + Debug {
    /// Current instant.
    fn now(&self) -> OffsetDateTime;

    /// Current instant as an ISO-8601 UTC string with millisecond precision.
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Format an instant as ISO-8601 UTC with millisecond precision.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(UtcOffset::UTC);
    utc.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_with_millis_in_utc() {
        let at = datetime!(2024-05-01 14:30:00.123456 +02:00);
        assert_eq!(format_timestamp(at), "2024-05-01T12:30:00.123Z");
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock(datetime!(2024-01-01 00:00:00 UTC));
        assert_eq!(clock.timestamp(), "2024-01-01T00:00:00.000Z");
        assert_eq!(clock.timestamp(), clock.timestamp());
    }
}
