//! Availability tokens.
//!
//! A token is a weekday letter concatenated with a time-band code, matched
//! as a substring of a worker's declared weekly availability string. The
//! band boundaries come from the legacy system: hour strictly between 6 and 14
//! is the morning band, `[14, 22)` the afternoon band, everything else the
//! night band.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

/// Compact day+band code, e.g. `W14` for Wednesday afternoon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvailabilityToken(String);

impl AvailabilityToken {
    /// Build the token for a shift's local scheduled time.
    #[must_use]
    pub fn for_local_time(local: NaiveDateTime) -> Self {
        let day = day_letter(local.weekday());
        let band = band_code(local.hour());
        Self(format!("{day}{band}"))
    }

    /// Borrow the token text, as matched against availability strings.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for AvailabilityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn day_letter(weekday: Weekday) -> char {
    match weekday {
        Weekday::Sun => 'D',
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'H',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
    }
}

fn band_code(hour: u32) -> &'static str {
    if hour > 6 && hour < 14 {
        "6"
    } else if (14..22).contains(&hour) {
        "14"
    } else {
        "22"
    }
}

#[cfg(test)]
mod tests {
    //! Day letters and band boundary coverage.

    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn local(day: u32, hour: u32) -> NaiveDateTime {
        // March 2026: the 1st is a Sunday.
        NaiveDate::from_ymd_opt(2026, 3, day)
            .expect("valid date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid time")
    }

    #[rstest]
    #[case(1, "D")] // Sunday
    #[case(2, "M")]
    #[case(3, "T")]
    #[case(4, "W")]
    #[case(5, "H")]
    #[case(6, "F")]
    #[case(7, "S")]
    fn weekday_letters(#[case] day: u32, #[case] letter: &str) {
        let token = AvailabilityToken::for_local_time(local(day, 10));
        assert!(token.as_str().starts_with(letter), "token {token}");
    }

    #[rstest]
    #[case(6, "22")] // hour 6 is outside the open (6, 14) interval
    #[case(7, "6")]
    #[case(13, "6")]
    #[case(14, "14")]
    #[case(21, "14")]
    #[case(22, "22")]
    #[case(0, "22")]
    #[case(5, "22")]
    fn band_boundaries(#[case] hour: u32, #[case] band: &str) {
        let token = AvailabilityToken::for_local_time(local(2, hour));
        assert!(token.as_str().ends_with(band), "hour {hour} → {token}");
    }

    #[test]
    fn wednesday_afternoon_is_w14() {
        assert_eq!(AvailabilityToken::for_local_time(local(4, 15)).as_str(), "W14");
    }
}
