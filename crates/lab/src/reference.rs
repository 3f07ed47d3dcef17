//! Reference range resolution and result classification.
//!
//! Given a patient's age-in-days and gender, pick the single applicable range
//! from a parameter's configured table and band the measured value against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parameter::{Gender, LabParameter, LabParameterRange, NormalSpec};

/// Classification of a measured value against its resolved range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFlag {
    Low,
    Normal,
    High,
    /// Text-defined range, unparseable value, or no reference available.
    Unclassified,
}

/// Patient age in whole days, as the **ceiling** of the absolute calendar
/// difference between `now` and the date of birth.
///
/// The ceiling is deliberate: a patient born exactly N days ago is N days old,
/// but any additional fraction of a day rounds up to N+1. This shifts patients
/// at an age-band edge by one day versus a floor computation and must not be
/// changed.
pub fn age_in_days(date_of_birth: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const DAY_MS: i64 = 86_400_000;
    let ms = (now - date_of_birth).num_milliseconds().abs();
    let days = ms / DAY_MS;
    if ms % DAY_MS != 0 { days + 1 } else { days }
}

/// Select the applicable range for a patient, if any.
///
/// Two passes over the age-covering candidates, in stored order (ascending
/// `age_min_days` at load time):
/// 1. first range whose gender matches the patient;
/// 2. failing that, first gender-neutral range.
///
/// `None` is a valid "no reference available" outcome, not an error. When
/// overlapping ranges tie within a pass the first in stored order wins; the
/// source configuration does not disambiguate further.
pub fn resolve(
    parameter: &LabParameter,
    patient_age_in_days: i64,
    patient_gender: Gender,
) -> Option<&LabParameterRange> {
    let candidates = || {
        parameter
            .normal_ranges()
            .iter()
            .filter(move |r| r.covers_age(patient_age_in_days))
    };

    candidates()
        .find(|r| r.gender == Some(patient_gender))
        .or_else(|| candidates().find(|r| r.gender.is_none()))
}

/// Band a raw result value against a resolved range.
///
/// Numeric bands parse the raw text as a number; text-defined normals and
/// unparseable values are recorded without a flag.
pub fn classify(range: &LabParameterRange, raw_value: &str) -> ResultFlag {
    match &range.normal {
        NormalSpec::Numeric { min, max } => match raw_value.trim().parse::<f64>() {
            Ok(v) if v < *min => ResultFlag::Low,
            Ok(v) if v > *max => ResultFlag::High,
            Ok(_) => ResultFlag::Normal,
            Err(_) => ResultFlag::Unclassified,
        },
        NormalSpec::Text(_) => ResultFlag::Unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterId;
    use chrono::Duration;
    use clinicore_core::AggregateId;

    fn range(
        gender: Option<Gender>,
        age_min_days: i64,
        age_max_days: i64,
        normal: NormalSpec,
    ) -> LabParameterRange {
        LabParameterRange {
            gender,
            age_min_days,
            age_max_days,
            normal,
        }
    }

    fn parameter(ranges: Vec<LabParameterRange>) -> LabParameter {
        LabParameter::new(
            ParameterId::new(AggregateId::new()),
            "Hemoglobin",
            Some("g/dL".to_string()),
            ranges,
        )
        .unwrap()
    }

    #[test]
    fn gender_specific_beats_gender_neutral() {
        let param = parameter(vec![
            range(None, 0, 36500, NormalSpec::Text("see physician".to_string())),
            range(
                Some(Gender::Female),
                6570,
                25550,
                NormalSpec::Numeric { min: 12.0, max: 15.5 },
            ),
        ]);

        // ~30-year-old female patient.
        let resolved = resolve(&param, 10950, Gender::Female).unwrap();
        assert_eq!(resolved.gender, Some(Gender::Female));
        assert_eq!(resolved.normal, NormalSpec::Numeric { min: 12.0, max: 15.5 });
    }

    #[test]
    fn gender_neutral_applies_to_any_gender() {
        let param = parameter(vec![range(
            None,
            0,
            36500,
            NormalSpec::Numeric { min: 4.0, max: 11.0 },
        )]);

        assert!(resolve(&param, 5000, Gender::Male).is_some());
        assert!(resolve(&param, 5000, Gender::Female).is_some());
    }

    #[test]
    fn no_covering_range_resolves_to_none() {
        let param = parameter(vec![range(
            None,
            0,
            365,
            NormalSpec::Numeric { min: 9.0, max: 14.0 },
        )]);

        assert!(resolve(&param, 10950, Gender::Female).is_none());
    }

    #[test]
    fn wrong_gender_with_no_neutral_fallback_resolves_to_none() {
        let param = parameter(vec![range(
            Some(Gender::Female),
            0,
            36500,
            NormalSpec::Numeric { min: 12.0, max: 15.5 },
        )]);

        assert!(resolve(&param, 10950, Gender::Male).is_none());
    }

    #[test]
    fn overlapping_ranges_first_in_stored_order_wins() {
        // Both cover the age and gender; ascending age_min puts the 0-based
        // band first, so it must win.
        let param = parameter(vec![
            range(
                Some(Gender::Male),
                100,
                40000,
                NormalSpec::Numeric { min: 2.0, max: 3.0 },
            ),
            range(
                Some(Gender::Male),
                0,
                40000,
                NormalSpec::Numeric { min: 1.0, max: 2.0 },
            ),
        ]);

        let resolved = resolve(&param, 5000, Gender::Male).unwrap();
        assert_eq!(resolved.age_min_days, 0);
    }

    #[test]
    fn age_is_exact_on_whole_day_boundaries() {
        let now = Utc::now();
        let dob = now - Duration::days(365);
        assert_eq!(age_in_days(dob, now), 365);
    }

    #[test]
    fn partial_days_round_up() {
        let now = Utc::now();
        let dob = now - Duration::days(365) - Duration::hours(3);
        assert_eq!(age_in_days(dob, now), 366);
    }

    #[test]
    fn age_uses_absolute_difference() {
        let now = Utc::now();
        let later = now + Duration::days(2);
        assert_eq!(age_in_days(later, now), 2);
    }

    #[test]
    fn numeric_band_classifies_low_normal_high() {
        let r = range(None, 0, 36500, NormalSpec::Numeric { min: 12.0, max: 15.5 });
        assert_eq!(classify(&r, "11.2"), ResultFlag::Low);
        assert_eq!(classify(&r, "13.8"), ResultFlag::Normal);
        assert_eq!(classify(&r, " 15.5 "), ResultFlag::Normal);
        assert_eq!(classify(&r, "17.0"), ResultFlag::High);
    }

    #[test]
    fn text_ranges_and_unparseable_values_stay_unclassified() {
        let text = range(None, 0, 36500, NormalSpec::Text("negative".to_string()));
        assert_eq!(classify(&text, "negative"), ResultFlag::Unclassified);

        let numeric = range(None, 0, 36500, NormalSpec::Numeric { min: 1.0, max: 2.0 });
        assert_eq!(classify(&numeric, "trace"), ResultFlag::Unclassified);
    }
}
