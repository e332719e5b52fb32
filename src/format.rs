use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const SHORT_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month padding:none]/[day padding:none]/[year]");
const MONTH_NAME: &[BorrowedFormatItem<'static>] = format_description!("[month repr:long]");
const YEAR_AND_CLOCK: &[BorrowedFormatItem<'static>] = format_description!(
    "[year], [hour repr:12 padding:none]:[minute]:[second] [period case:lower]"
);

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// `6/15/2024`
pub fn short_date(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let local = timestamp.to_offset(offset);
    local
        .format(SHORT_DATE)
        .unwrap_or_else(|_| local.date().to_string())
}

/// `June 15th 2024, 3:04:05 pm`
pub fn history_timestamp(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let local = timestamp.to_offset(offset);
    let month = local
        .format(MONTH_NAME)
        .unwrap_or_else(|_| local.month().to_string());
    let rest = local
        .format(YEAR_AND_CLOCK)
        .unwrap_or_else(|_| local.time().to_string());
    let day = local.day();
    format!("{month} {day}{} {rest}", ordinal_suffix(day))
}

fn ordinal_suffix(day: u8) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn short_date_drops_padding_and_time() {
        let ts = datetime!(2024-06-05 23:10:00 UTC);
        assert_eq!(short_date(ts, UtcOffset::UTC), "6/5/2024");
    }

    #[test]
    fn short_date_uses_given_offset() {
        let ts = datetime!(2024-06-05 23:10:00 UTC);
        assert_eq!(short_date(ts, offset!(+2)), "6/6/2024");
    }

    #[test]
    fn history_timestamp_matches_long_form() {
        let ts = datetime!(2024-06-15 15:04:05 UTC);
        assert_eq!(
            history_timestamp(ts, UtcOffset::UTC),
            "June 15th 2024, 3:04:05 pm"
        );
    }

    #[test]
    fn history_timestamp_midnight_is_twelve_am() {
        let ts = datetime!(2023-01-01 00:00:09 UTC);
        assert_eq!(
            history_timestamp(ts, UtcOffset::UTC),
            "January 1st 2023, 12:00:09 am"
        );
    }

    #[test]
    fn ordinal_suffixes() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }
}
