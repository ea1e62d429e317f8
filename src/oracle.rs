//! Row-order verification oracle
//!
//! Recomputes the expected ordering of the timezone table independently of
//! the application: each row's displayed time (the third tab-separated cell)
//! is parsed against an injected calendar date, and the observed order must
//! equal the stable ascending sort by that instant.
//!
//! Known limitations: all compared times must fall on the same calendar day
//! (midnight rollover is not handled) and cell order is assumed to be
//! label, zone, time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{E2eError, E2eResult};

/// Column index of the time cell within a row's tab-separated text
const TIME_CELL: usize = 2;

/// Time renderings the board is known to produce
const TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Check that `rows` appear in ascending order of their displayed time
pub fn rows_in_time_order(rows: &[String], today: NaiveDate) -> E2eResult<bool> {
    match verify_time_order(rows, today) {
        Ok(()) => Ok(true),
        Err(E2eError::OrderViolation(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Like [`rows_in_time_order`], but reports the first out-of-order pair
pub fn verify_time_order(rows: &[String], today: NaiveDate) -> E2eResult<()> {
    let mut instants = Vec::with_capacity(rows.len());
    for row in rows {
        instants.push(row_instant(row, today)?);
    }

    // Adjacent non-decreasing instants are exactly what a stable ascending
    // sort would leave unchanged.
    for (i, pair) in instants.windows(2).enumerate() {
        if pair[0] > pair[1] {
            return Err(E2eError::OrderViolation(format!(
                "{:?} ({}) appears before {:?} ({})",
                rows[i],
                pair[0].time(),
                rows[i + 1],
                pair[1].time(),
            )));
        }
    }

    Ok(())
}

/// Parse the displayed time of one row into an instant on `today`
pub fn row_instant(row: &str, today: NaiveDate) -> E2eResult<NaiveDateTime> {
    let cell = row
        .split('\t')
        .nth(TIME_CELL)
        .ok_or_else(|| E2eError::TimeParse(row.to_string()))?;

    let time = parse_time(cell.trim()).ok_or_else(|| E2eError::TimeParse(row.to_string()))?;

    Ok(today.and_time(time))
}

fn parse_time(cell: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(cell, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn row(label: &str, zone: &str, time: &str) -> String {
        format!("{}\t{}\t{}", label, zone, time)
    }

    #[test_case("9:03:12 AM", 9, 3, 12 ; "twelve hour clock")]
    #[test_case("12:00:01 AM", 0, 0, 1 ; "just after midnight")]
    #[test_case("11:59:59 PM", 23, 59, 59 ; "just before midnight")]
    #[test_case("13:45:10", 13, 45, 10 ; "twenty four hour clock")]
    #[test_case("9:41 AM", 9, 41, 0 ; "no seconds")]
    fn test_parse_time_formats(cell: &str, h: u32, m: u32, s: u32) {
        let parsed = parse_time(cell).unwrap();
        assert_eq!(parsed, NaiveTime::from_hms_opt(h, m, s).unwrap());
    }

    #[test]
    fn test_ordered_rows_pass() {
        let rows = vec![
            row("Honululu HQ", "Pacific/Honolulu", "4:05:00 AM"),
            row("Pacific HQ", "America/Los_Angeles", "6:05:00 AM"),
            row("Mountain HQ", "America/Denver", "7:05:00 AM"),
            row("Eastern HQ", "America/New_York", "9:05:00 AM"),
        ];
        assert!(rows_in_time_order(&rows, day()).unwrap());
        verify_time_order(&rows, day()).unwrap();
    }

    #[test]
    fn test_unordered_rows_fail_with_offending_pair() {
        let rows = vec![
            row("Eastern HQ", "America/New_York", "9:05:00 AM"),
            row("Mountain HQ", "America/Denver", "7:05:00 AM"),
        ];
        assert!(!rows_in_time_order(&rows, day()).unwrap());

        let err = verify_time_order(&rows, day()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Eastern HQ"), "unexpected message: {}", msg);
        assert!(msg.contains("Mountain HQ"), "unexpected message: {}", msg);
    }

    #[test]
    fn test_noon_and_midnight_are_twelve_hour_aware() {
        // 12-hour renderings wrap: 11:59 PM is the end of the day, not
        // before 1:00 AM.
        let rows = vec![
            row("Late", "Pacific/Kiritimati", "11:59:00 PM"),
            row("Early", "Pacific/Honolulu", "1:00:00 AM"),
        ];
        assert!(!rows_in_time_order(&rows, day()).unwrap());
    }

    #[test]
    fn test_equal_times_keep_observed_order() {
        let rows = vec![
            row("Pacific HQ", "America/Los_Angeles", "6:05:00 AM"),
            row("Campus", "America/Vancouver", "6:05:00 AM"),
        ];
        assert!(rows_in_time_order(&rows, day()).unwrap());
    }

    #[test]
    fn test_empty_table_is_trivially_ordered() {
        assert!(rows_in_time_order(&[], day()).unwrap());
    }

    #[test]
    fn test_missing_time_cell_is_an_error() {
        let rows = vec!["You\tlocal".to_string()];
        let err = rows_in_time_order(&rows, day()).unwrap_err();
        assert!(matches!(err, E2eError::TimeParse(_)));
    }

    #[test]
    fn test_garbage_time_cell_is_an_error() {
        let rows = vec![row("HQ", "America/Denver", "noon")];
        let err = verify_time_order(&rows, day()).unwrap_err();
        assert!(matches!(err, E2eError::TimeParse(_)));
    }

    #[test]
    fn test_row_instant_lands_on_injected_date() {
        let instant = row_instant(&row("HQ", "America/Denver", "7:05:00 AM"), day()).unwrap();
        assert_eq!(instant.date(), day());
        assert_eq!(instant.time(), NaiveTime::from_hms_opt(7, 5, 0).unwrap());
    }
}
