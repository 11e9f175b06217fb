use chrono::NaiveDate;

use cakeday_types::api::BirthdayRequest;

/// Full names that may not be used for a record. Exact, case-sensitive
/// matches only.
pub const RESERVED_FULL_NAMES: [&str; 4] = [
    "Джон Леннон",
    "Пол Маккартни",
    "Джордж Харрисон",
    "Ринго Старр",
];

pub const RESERVED_NAME_MESSAGE: &str =
    "Мы тоже любим Битлз, но введите, пожалуйста, настоящее имя!";

pub const DEFAULT_MAX_AGE_YEARS: i32 = 120;

/// A birthday submission that passed validation, with cleaned field values.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanBirthday {
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub tags: Vec<String>,
}

pub type FieldErrors = Vec<(&'static str, String)>;

/// Keep only the first whitespace-separated token of the first name.
/// Extra tokens are dropped without feedback. Returns None when the input
/// is blank.
pub fn clean_first_name(raw: &str) -> Option<String> {
    raw.split_whitespace().next().map(str::to_string)
}

/// Reject dates that imply an implausible age: anything in the future, or
/// more than `max_age_years` before today.
pub fn real_age(date: NaiveDate, today: NaiveDate, max_age_years: i32) -> Result<(), String> {
    if date > today {
        return Err("birthday cannot be in the future".to_string());
    }

    let oldest = earliest_plausible(today, max_age_years);
    if date < oldest {
        return Err(format!("age cannot exceed {} years", max_age_years));
    }

    Ok(())
}

fn earliest_plausible(today: NaiveDate, max_age_years: i32) -> NaiveDate {
    use chrono::Datelike;
    NaiveDate::from_ymd_opt(today.year() - max_age_years, today.month(), today.day())
        // Feb 29 minus N years can land in a non-leap year
        .unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(today.year() - max_age_years, 3, 1)
                .unwrap_or(NaiveDate::MIN)
        })
}

/// Validate a birthday submission: field cleaners first (first-name
/// truncation, blank checks, the age rule), then the cross-field
/// reserved-name check. All applicable field errors are collected; any
/// error means nothing gets persisted.
pub fn validate(
    req: &BirthdayRequest,
    today: NaiveDate,
    max_age_years: i32,
) -> Result<CleanBirthday, FieldErrors> {
    let mut errors: FieldErrors = Vec::new();

    let first_name = clean_first_name(&req.first_name);
    if first_name.is_none() {
        errors.push(("first_name", "must not be blank".to_string()));
    }

    let last_name = req.last_name.trim();
    if last_name.is_empty() {
        errors.push(("last_name", "must not be blank".to_string()));
    }

    if let Err(msg) = real_age(req.birthday, today, max_age_years) {
        errors.push(("birthday", msg));
    }

    // Cross-field check runs after the field cleaners, on cleaned values.
    if let Some(ref first) = first_name {
        if !last_name.is_empty() {
            let full_name = format!("{} {}", first, last_name);
            if RESERVED_FULL_NAMES.contains(&full_name.as_str()) {
                errors.push(("__all__", RESERVED_NAME_MESSAGE.to_string()));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CleanBirthday {
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.to_string(),
        birthday: req.birthday,
        tags: req.tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
    })
}

/// A congratulation is valid when its text is non-blank after trimming.
pub fn clean_congratulation(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(first: &str, last: &str, birthday: NaiveDate) -> BirthdayRequest {
        BirthdayRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthday,
            tags: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_name_keeps_only_the_first_token() {
        assert_eq!(clean_first_name("Анна Мария Тереза"), Some("Анна".to_string()));
        assert_eq!(clean_first_name("  John   Paul "), Some("John".to_string()));
        assert_eq!(clean_first_name("Ann"), Some("Ann".to_string()));
        assert_eq!(clean_first_name("   "), None);
    }

    #[test]
    fn reserved_names_are_rejected_with_the_fixed_message() {
        for (first, last) in [
            ("Джон", "Леннон"),
            ("Пол", "Маккартни"),
            ("Джордж", "Харрисон"),
            ("Ринго", "Старр"),
        ] {
            let errors = validate(&request(first, last, date(1990, 1, 1)), today(), 120)
                .unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].0, "__all__");
            assert_eq!(errors[0].1, RESERVED_NAME_MESSAGE);
        }
    }

    #[test]
    fn reserved_name_check_is_exact_and_case_sensitive() {
        // Different case or partial match must pass.
        assert!(validate(&request("джон", "леннон", date(1990, 1, 1)), today(), 120).is_ok());
        assert!(validate(&request("Джон", "Старр", date(1990, 1, 1)), today(), 120).is_ok());
        assert!(validate(&request("Ivan", "Petrov", date(1990, 1, 1)), today(), 120).is_ok());
    }

    #[test]
    fn reserved_name_check_runs_on_the_cleaned_first_name() {
        // Truncation happens first, so "Джон Уинстон" cleans to "Джон".
        let errors =
            validate(&request("Джон Уинстон", "Леннон", date(1990, 1, 1)), today(), 120)
                .unwrap_err();
        assert_eq!(errors[0].1, RESERVED_NAME_MESSAGE);
    }

    #[test]
    fn real_age_rejects_future_and_ancient_dates() {
        assert!(real_age(date(2025, 6, 16), today(), 120).is_err());
        assert!(real_age(date(1905, 6, 14), today(), 120).is_err());
        assert!(real_age(date(1905, 6, 15), today(), 120).is_ok());
        assert!(real_age(date(1990, 1, 1), today(), 120).is_ok());
        assert!(real_age(today(), today(), 120).is_ok());
    }

    #[test]
    fn real_age_honours_a_configured_bound() {
        assert!(real_age(date(1990, 1, 1), today(), 30).is_err());
        assert!(real_age(date(2000, 1, 1), today(), 30).is_ok());
    }

    #[test]
    fn all_field_errors_are_collected() {
        let errors = validate(&request("", "", date(2030, 1, 1)), today(), 120).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, ["first_name", "last_name", "birthday"]);
    }

    #[test]
    fn valid_submission_is_cleaned() {
        let mut req = request("Анна  Мария", "Иванова ", date(1990, 1, 1));
        req.tags = vec!["  friends ".to_string(), "".to_string(), "work".to_string()];

        let clean = validate(&req, today(), 120).unwrap();
        assert_eq!(clean.first_name, "Анна");
        assert_eq!(clean.last_name, "Иванова");
        assert_eq!(clean.tags, ["friends", "work"]);
    }

    #[test]
    fn congratulation_text_must_be_non_blank() {
        assert_eq!(clean_congratulation("  с днём рождения!  "), Some("с днём рождения!".to_string()));
        assert_eq!(clean_congratulation("   "), None);
        assert_eq!(clean_congratulation(""), None);
    }
}
