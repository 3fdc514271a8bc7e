//! Date predicates for collection sub-selection.

use eofloods_core::models::{DateFilter, DateInput, DateWindow};
use eofloods_core::Result;

/// OR of per-date windows
///
/// A date-only input selects its whole calendar day. An input with a time of
/// day selects that single second.
pub fn date_filter<S: AsRef<str>>(dates: &[S]) -> Result<DateFilter> {
    let windows = dates
        .iter()
        .map(|date| DateInput::parse(date.as_ref()).map(|input| DateWindow::for_input(&input)))
        .collect::<Result<Vec<_>>>()?;
    Ok(DateFilter::any_of(windows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 4, day).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_day_and_second_windows() {
        let filter = date_filter(&["2023-04-02", "2023-04-08 05:50:00"]).unwrap();
        assert_eq!(filter.windows.len(), 2);

        assert!(filter.matches(&at(2, 0, 0, 0)));
        assert!(filter.matches(&at(2, 23, 59, 59)));
        assert!(!filter.matches(&at(3, 0, 0, 0)));

        assert!(filter.matches(&at(8, 5, 50, 0)));
        assert!(!filter.matches(&at(8, 5, 50, 1)));
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(date_filter(&["April 2nd"]).is_err());
    }
}
