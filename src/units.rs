//! Singular/plural vocabulary for dayjs unit tokens.
//!
//! dayjs accessors and `add`/`subtract`/`set` arguments use singular unit
//! names where moment accepted both spellings, so every pass that touches a
//! unit token funnels through [`to_singular`].

/// Singular unit names, see <https://day.js.org/>.
pub const SINGULAR_UNITS: &[&str] = &[
    "year",
    "month",
    "week",
    "date",
    "day",
    "hour",
    "minute",
    "second",
    "millisecond",
    "quarter",
    "weekday",
];

/// True for both spellings of a known unit.
pub fn is_unit(token: &str) -> bool {
    SINGULAR_UNITS.contains(&token) || is_plural_unit(token)
}

/// True only for the plural spelling of a known unit.
pub fn is_plural_unit(token: &str) -> bool {
    token
        .strip_suffix('s')
        .is_some_and(|stem| SINGULAR_UNITS.contains(&stem))
}

/// Maps a plural unit token to its singular form (`"days"` -> `"day"`).
///
/// Anything outside the vocabulary passes through untouched, including
/// strings that merely end in `s` (`"address"`) and abbreviations (`"ms"`).
pub fn to_singular(token: &str) -> &str {
    if let Some(stem) = token.strip_suffix('s') {
        if let Some(singular) = SINGULAR_UNITS.iter().find(|unit| **unit == stem) {
            return singular;
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_plural_maps_to_its_singular() {
        for unit in SINGULAR_UNITS {
            let plural = format!("{unit}s");
            assert_eq!(to_singular(&plural), *unit);
            assert!(is_plural_unit(&plural));
            assert!(is_unit(unit) && is_unit(&plural));
        }
    }

    #[test]
    fn singular_forms_are_fixed_points() {
        for unit in SINGULAR_UNITS {
            assert_eq!(to_singular(unit), *unit);
        }
    }

    #[test]
    fn unknown_tokens_pass_through() {
        for token in ["ms", "address", "isoWeek", "YYYY-MM-DD", "", "s"] {
            assert_eq!(to_singular(token), token);
            assert!(!is_unit(token));
        }
    }

    proptest! {
        #[test]
        fn to_singular_is_idempotent(token in "[a-zA-Z]{0,16}") {
            let once = to_singular(&token);
            prop_assert_eq!(to_singular(once), once);
        }

        #[test]
        fn out_of_vocabulary_tokens_are_never_mangled(token in "[a-zA-Z]{0,16}") {
            prop_assume!(!is_plural_unit(&token));
            prop_assert_eq!(to_singular(&token), token.as_str());
        }
    }
}
