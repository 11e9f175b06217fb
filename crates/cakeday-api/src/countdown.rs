use chrono::{Datelike, NaiveDate};

/// Days until the next anniversary of `birthday`, relative to `today`.
/// Returns 0 on the anniversary itself. A Feb-29 birthday is observed on
/// March 1 in non-leap years.
pub fn calculate_birthday_countdown(birthday: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = observed(birthday, today.year());
    let next = if this_year >= today {
        this_year
    } else {
        observed(birthday, today.year() + 1)
    };
    (next - today).num_days()
}

fn observed(birthday: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        // Only Feb 29 fails to land in some years; observe it on Mar 1.
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 3, 1).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn anniversary_today_is_zero() {
        assert_eq!(
            calculate_birthday_countdown(date(1990, 6, 15), date(2025, 6, 15)),
            0
        );
    }

    #[test]
    fn upcoming_anniversary_counts_down_within_the_year() {
        assert_eq!(
            calculate_birthday_countdown(date(1990, 6, 20), date(2025, 6, 15)),
            5
        );
    }

    #[test]
    fn passed_anniversary_rolls_to_next_year() {
        // Jun 14 passed on Jun 15, 2025; next is Jun 14, 2026 — 364 days.
        assert_eq!(
            calculate_birthday_countdown(date(1990, 6, 14), date(2025, 6, 15)),
            364
        );
    }

    #[test]
    fn year_boundary_rolls_correctly() {
        assert_eq!(
            calculate_birthday_countdown(date(1990, 1, 1), date(2025, 12, 31)),
            1
        );
    }

    #[test]
    fn leap_day_is_observed_on_march_first_in_non_leap_years() {
        // 2025 is not a leap year: Feb 29 is observed Mar 1.
        assert_eq!(
            calculate_birthday_countdown(date(1992, 2, 29), date(2025, 2, 27)),
            2
        );
        assert_eq!(
            calculate_birthday_countdown(date(1992, 2, 29), date(2025, 3, 1)),
            0
        );
    }

    #[test]
    fn leap_day_uses_the_real_date_in_leap_years() {
        // 2028 is a leap year.
        assert_eq!(
            calculate_birthday_countdown(date(1992, 2, 29), date(2028, 2, 27)),
            2
        );
    }
}
