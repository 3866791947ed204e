//! # Observation Policy
//!
//! Pure functions that turn boundary input into canonical observations
//! and decide when an observation has outlived its durability.
//!
//! | durability | outdated when age exceeds |
//! |------------|---------------------------|
//! | permanent  | never                     |
//! | long-term  | 24 months                 |
//! | short-term | 6 months                  |
//! | temporary  | 1 month                   |
//!
//! A month is 30 days and age is counted in whole days. Unrecognized
//! durabilities are never outdated.

pub mod clock;

use chrono::{DateTime, Utc};

use crate::model::{Durability, Entity, NewEntity, Observation, ObservationInput, RawObservation};

pub use clock::{Clock, FixedClock, SystemClock};

/// Days in one policy month.
pub const DAYS_PER_MONTH: i64 = 30;

/// Stamp caller input with `now`; durability defaults to long-term.
pub fn canonicalize(input: ObservationInput, now: DateTime<Utc>) -> Observation {
    match input {
        ObservationInput::Text(content) => Observation::new(content, Durability::LongTerm, now),
        ObservationInput::Detailed {
            content,
            durability,
        } => Observation::new(content, durability.unwrap_or_default(), now),
    }
}

/// Canonical input passes through untouched; anything else is
/// canonicalized at `now`.
pub fn normalize(raw: RawObservation, now: DateTime<Utc>) -> Observation {
    match raw {
        RawObservation::Canonical(obs) => obs,
        RawObservation::Input(input) => canonicalize(input, now),
    }
}

/// Normalize every observation of a boundary entity, keeping order.
pub fn normalize_entity(entity: NewEntity, now: DateTime<Utc>) -> Entity {
    Entity {
        name: entity.name,
        entity_type: entity.entity_type,
        observations: entity
            .observations
            .into_iter()
            .map(|raw| normalize(raw, now))
            .collect(),
    }
}

/// Whole days elapsed between the observation's timestamp and `now`.
/// Negative for timestamps in the future.
pub fn age_in_days(obs: &Observation, now: DateTime<Utc>) -> i64 {
    (now - obs.timestamp).num_days()
}

/// True when the observation's age strictly exceeds its durability's
/// threshold.
pub fn is_outdated(obs: &Observation, now: DateTime<Utc>) -> bool {
    match obs.durability.threshold_months() {
        Some(months) => age_in_days(obs, now) > months * DAYS_PER_MONTH,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn aged(durability: Durability, days: i64) -> Observation {
        Observation::new("x", durability, now() - Duration::days(days))
    }

    #[test]
    fn test_canonicalize_defaults_to_long_term() {
        let obs = canonicalize(ObservationInput::from("hi"), now());
        assert_eq!(obs, Observation::new("hi", Durability::LongTerm, now()));

        let obs = canonicalize(
            ObservationInput::Detailed {
                content: "hi".into(),
                durability: None,
            },
            now(),
        );
        assert_eq!(obs.durability, Durability::LongTerm);
    }

    #[test]
    fn test_canonicalize_keeps_given_durability() {
        let input = ObservationInput::with_durability("Training for a marathon", Durability::ShortTerm);
        let obs = canonicalize(input, now());
        assert_eq!(obs.durability, Durability::ShortTerm);
        assert_eq!(obs.timestamp, now());
    }

    #[test]
    fn test_normalize_leaves_canonical_alone() {
        let original = aged(Durability::Temporary, 400);
        let out = normalize(RawObservation::Canonical(original.clone()), now());
        assert_eq!(out, original);
    }

    #[test]
    fn test_short_term_boundary_is_strict() {
        assert!(!is_outdated(&aged(Durability::ShortTerm, 180), now()));
        assert!(is_outdated(&aged(Durability::ShortTerm, 181), now()));
    }

    #[test]
    fn test_thresholds_per_durability() {
        assert!(!is_outdated(&aged(Durability::Permanent, 100_000), now()));
        assert!(!is_outdated(&aged(Durability::LongTerm, 720), now()));
        assert!(is_outdated(&aged(Durability::LongTerm, 721), now()));
        assert!(!is_outdated(&aged(Durability::Temporary, 30), now()));
        assert!(is_outdated(&aged(Durability::Temporary, 40), now()));
        assert!(!is_outdated(&aged(Durability::Other("forever-ish".into()), 5_000), now()));
    }

    #[test]
    fn test_partial_days_do_not_count() {
        let obs = Observation::new(
            "x",
            Durability::ShortTerm,
            now() - Duration::days(180) - Duration::hours(23),
        );
        assert_eq!(age_in_days(&obs, now()), 180);
        assert!(!is_outdated(&obs, now()));
    }

    #[test]
    fn test_future_timestamp_not_outdated() {
        let obs = aged(Durability::Temporary, -90);
        assert!(age_in_days(&obs, now()) < 0);
        assert!(!is_outdated(&obs, now()));
    }

    fn durability_strategy() -> impl Strategy<Value = Durability> {
        prop_oneof![
            Just(Durability::Permanent),
            Just(Durability::LongTerm),
            Just(Durability::ShortTerm),
            Just(Durability::Temporary),
            "[a-z]{1,8}".prop_map(|s| Durability::from(format!("x-{s}"))),
        ]
    }

    fn raw_strategy() -> impl Strategy<Value = RawObservation> {
        prop_oneof![
            ".{0,24}".prop_map(|s| RawObservation::Input(ObservationInput::Text(s))),
            (".{0,24}", proptest::option::of(durability_strategy())).prop_map(
                |(content, durability)| RawObservation::Input(ObservationInput::Detailed {
                    content,
                    durability,
                })
            ),
            (".{0,24}", durability_strategy(), 0i64..10_000).prop_map(|(c, d, days)| {
                RawObservation::Canonical(Observation::new(c, d, now() - Duration::days(days)))
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in raw_strategy()) {
            let once = normalize(raw, now());
            let twice = normalize(RawObservation::Canonical(once.clone()), now());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_outdated_matches_threshold(d in durability_strategy(), days in 0i64..2_000) {
            let obs = aged(d.clone(), days);
            let expected = d.threshold_months().is_some_and(|m| days > m * DAYS_PER_MONTH);
            prop_assert_eq!(is_outdated(&obs, now()), expected);
        }
    }
}
