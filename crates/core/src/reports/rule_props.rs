//! Property-based tests for the mapping-rule engine.
//!
//! Feature: report-generation
//! - Property: Prefix rules sum every matching account
//! - Property: Negation flips the sign
//! - Property: ABS is never negative

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::rule::{MappingRule, evaluate};

/// Strategy to generate signed amounts with two decimals.
fn amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate `{code → net balance}` maps over short numeric codes.
fn balances() -> impl Strategy<Value = BTreeMap<String, Decimal>> {
    prop::collection::btree_map("[1-8][0-9]{1,4}", amount(), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* prefix and balances, `evaluate("{prefix}*")` SHALL equal the
    /// sum of net balances of every code starting with the prefix.
    #[test]
    fn prop_prefix_sums_matching_codes(prefix in "[1-8][0-9]{0,2}", balances in balances()) {
        let expected: Decimal = balances
            .iter()
            .filter(|(code, _)| code.starts_with(&prefix))
            .map(|(_, amount)| *amount)
            .sum();

        prop_assert_eq!(evaluate(&format!("{prefix}*"), &balances).unwrap(), expected);
    }

    /// *For any* rule, the negated rule SHALL evaluate to the opposite value.
    #[test]
    fn prop_negation_flips_sign(prefix in "[1-8][0-9]{0,2}", balances in balances()) {
        let plain = evaluate(&format!("{prefix}*"), &balances).unwrap();
        let negated = evaluate(&format!("-{prefix}*"), &balances).unwrap();

        prop_assert_eq!(negated, -plain);
    }

    /// *For any* rule, the ABS form SHALL be the absolute value of the plain form.
    #[test]
    fn prop_abs_is_non_negative(prefix in "[1-8][0-9]{0,2}", balances in balances()) {
        let plain = evaluate(&format!("{prefix}*"), &balances).unwrap();
        let abs = evaluate(&format!("ABS({prefix}*)"), &balances).unwrap();

        prop_assert!(abs >= Decimal::ZERO);
        prop_assert_eq!(abs, plain.abs());
    }

    /// *For any* parsed rule, its display form SHALL parse back to the same rule.
    #[test]
    fn prop_display_reparses(
        codes in prop::collection::vec(("[1-8][0-9]{0,3}", any::<bool>(), any::<bool>()), 1..6),
        abs in any::<bool>(),
    ) {
        let body = codes
            .iter()
            .map(|(code, negate, wildcard)| {
                format!("{}{code}{}", if *negate { "-" } else { "" }, if *wildcard { "*" } else { "" })
            })
            .collect::<Vec<_>>()
            .join(", ");
        let text = if abs { format!("ABS({body})") } else { body };

        let rule: MappingRule = text.parse().unwrap();
        let reparsed: MappingRule = rule.to_string().parse().unwrap();
        prop_assert_eq!(rule, reparsed);
    }
}
