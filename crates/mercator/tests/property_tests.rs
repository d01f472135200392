//! Property-based tests for Mercator.
//!
//! These tests use proptest to generate random inputs and verify that
//! profiling, coercion and enhancement keep their invariants.
//!
//! # Running Property Tests
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p mercator --test property_tests
//! ```

use proptest::prelude::*;

use mercator::inference::split_list_value;
use mercator::llm::{MockResponse, clamp_text};
use mercator::mapping::coerce_price;
use mercator::schema::ValueType;
use mercator::{
    CanonicalField, CanonicalProduct, ColumnClassifier, Mercator, MarketplaceSchema,
    MockProvider, StaticRequirementTable,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Cells as they show up in catalog exports: blanks, placeholders, text.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("N/A".to_string()),
        "[ -~]{0,24}",
    ]
}

fn decimal_like() -> impl Strategy<Value = String> {
    "[0-9]{1,4}\\.[0-9]{2}"
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{3,8}"
}

/// Decimal values followed by at most a quarter as many words.
fn mostly_decimal_column() -> impl Strategy<Value = Vec<String>> {
    (4usize..=16).prop_flat_map(|n| {
        (
            prop::collection::vec(decimal_like(), n),
            prop::collection::vec(word(), 0..=n / 4),
        )
            .prop_map(|(mut decimals, words)| {
                decimals.extend(words);
                decimals
            })
    })
}

// =============================================================================
// Column Profiling Properties
// =============================================================================

mod profiling_tests {
    use super::*;

    proptest! {
        /// Fill rate is always a fraction, whatever the column holds.
        #[test]
        fn fill_rate_is_bounded(
            name in "[A-Za-z _-]{0,16}",
            values in prop::collection::vec(cell(), 0..40),
        ) {
            let refs: Vec<&str> = values.iter().map(String::as_str).collect();
            let profile = ColumnClassifier::new().classify(&name, 0, &refs);

            prop_assert!((0.0..=1.0).contains(&profile.fill_rate));
            for candidate in &profile.candidates {
                prop_assert!((0.0..=1.0).contains(&candidate.confidence));
            }
        }

        /// At least 80% decimals classifies the column as decimal.
        #[test]
        fn mostly_decimal_columns_are_decimal(values in mostly_decimal_column()) {
            let refs: Vec<&str> = values.iter().map(String::as_str).collect();
            let profile = ColumnClassifier::new().classify("value", 0, &refs);
            prop_assert_eq!(profile.value_type, ValueType::Decimal);
        }

        /// A column with no non-empty values is never mapped.
        #[test]
        fn blank_columns_have_no_candidates(count in 0usize..30) {
            let values = vec![""; count];
            let profile = ColumnClassifier::new().classify("title", 0, &values);
            prop_assert_eq!(profile.value_type, ValueType::Unknown);
            prop_assert_eq!(profile.fill_rate, 0.0);
            prop_assert!(profile.candidates.is_empty());
        }
    }
}

// =============================================================================
// Coercion Properties
// =============================================================================

mod coercion_tests {
    use super::*;

    proptest! {
        /// Splitting on a delimiter recovers the tokens.
        #[test]
        fn list_splitting_recovers_tokens(
            tokens in prop::collection::vec(word(), 2..6),
            delimiter in prop::sample::select(vec![";", ",", "\n", " ; "]),
        ) {
            let joined = tokens.join(delimiter);
            prop_assert_eq!(split_list_value(&joined), tokens);
        }

        /// Price coercion never panics and only yields finite numbers.
        #[test]
        fn price_coercion_is_total(input in "\\PC{0,24}") {
            if let Some(price) = coerce_price(&input) {
                prop_assert!(price.is_finite());
            }
        }

        /// Clamped text never exceeds the limit.
        #[test]
        fn clamp_respects_limit(text in "\\PC{0,80}", max in 1usize..40) {
            prop_assert!(clamp_text(&text, max).chars().count() <= max);
        }
    }
}

// =============================================================================
// Enhancement Properties
// =============================================================================

mod enhancement_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// A non-empty title survives enhancement unchanged.
        #[test]
        fn existing_title_is_preserved(
            title in "[A-Za-z][A-Za-z0-9 ]{0,30}",
            generated in "[ -~]{0,30}",
        ) {
            let table = StaticRequirementTable::new().with_schema(MarketplaceSchema::requiring(
                "shop",
                &[CanonicalField::Title, CanonicalField::Description, CanonicalField::Brand],
            ));
            let mercator = Mercator::new()
                .with_requirements(table)
                .with_provider(MockProvider::new("mock").with_default(MockResponse::Text(generated)));

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let product = CanonicalProduct::new("P1").with_title(title.clone());
            let outcome = runtime
                .block_on(mercator.enhance(vec![product], "shop"))
                .unwrap();

            prop_assert_eq!(outcome.products[0].title.as_deref(), Some(title.as_str()));
        }
    }
}
