//! Property-based tests for family version ordering.
//!
//! These tests use proptest to verify that the family sorter only ever
//! reorders names within runs of the same family, and that the numeric key
//! orders versions the way release numbers are read.

use proptest::prelude::*;

use obs_origin::origin::family::{family_of, family_sort_key, family_sorted, FamilyName};

/// Strategy for tails found behind versioned project names.
fn tail() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("Update")),
        Just(Some("GA")),
        Just(Some("Update:Products")),
        Just(Some("Update:workarounds")),
    ]
}

/// Strategy for `SUSE:SLE-<major>[-SP<minor>][:<tail>]` names.
fn sle_name() -> impl Strategy<Value = String> {
    (12u32..20, prop::option::of(0u32..10), tail()).prop_map(|(major, minor, tail)| {
        let mut name = format!("SUSE:SLE-{}", major);
        if let Some(minor) = minor {
            name.push_str(&format!("-SP{}", minor));
        }
        if let Some(tail) = tail {
            name.push(':');
            name.push_str(tail);
        }
        name
    })
}

/// Strategy for `openSUSE:Leap:<major>.<minor>[:<tail>]` names.
fn leap_name() -> impl Strategy<Value = String> {
    (15u32..17, 0u32..7, tail()).prop_map(|(major, minor, tail)| match tail {
        Some(tail) => format!("openSUSE:Leap:{}.{}:{}", major, minor, tail),
        None => format!("openSUSE:Leap:{}.{}", major, minor),
    })
}

/// Strategy for names that are not part of any family.
fn other_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<devel>".to_string()),
        Just("openSUSE:Factory".to_string()),
        Just("*~".to_string()),
        "[a-z]{1,8}".prop_map(|user| format!("home:{}", user)),
    ]
}

fn project_name() -> impl Strategy<Value = String> {
    prop_oneof![sle_name(), leap_name(), other_name()]
}

fn origin_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(project_name(), 0..12)
}

fn sorted(names: &[String]) -> Vec<String> {
    family_sorted(names).cloned().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn sorting_is_a_permutation(names in origin_list()) {
        let mut before = names.clone();
        let mut after = sorted(&names);
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn sorting_is_idempotent(names in origin_list()) {
        let once = sorted(&names);
        let twice = sorted(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn non_family_names_keep_their_position(names in origin_list()) {
        let after = sorted(&names);
        for (index, name) in names.iter().enumerate() {
            if family_of(name).is_none() {
                prop_assert_eq!(&after[index], name);
            }
        }
    }

    #[test]
    fn family_membership_per_position_is_unchanged(names in origin_list()) {
        let after = sorted(&names);
        let families_before: Vec<Option<&str>> = names.iter().map(|n| family_of(n)).collect();
        let families_after: Vec<Option<&str>> = after.iter().map(|n| family_of(n)).collect();
        prop_assert_eq!(families_before, families_after);
    }

    #[test]
    fn runs_are_in_descending_key_order(names in origin_list()) {
        let after = sorted(&names);
        for pair in after.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if family_of(a).is_some() && family_of(a) == family_of(b) {
                prop_assert!(family_sort_key(a) >= family_sort_key(b), "{} before {}", a, b);
            }
        }
    }

    #[test]
    fn higher_major_always_sorts_first(
        low in 12u32..19,
        bump in 1u32..5,
        minor_low in 0u32..10,
        minor_high in 0u32..10,
        tail_low in tail(),
        tail_high in tail(),
    ) {
        let name = |major: u32, minor: u32, tail: Option<&str>| match tail {
            Some(tail) => format!("SUSE:SLE-{}-SP{}:{}", major, minor, tail),
            None => format!("SUSE:SLE-{}-SP{}", major, minor),
        };
        let older = name(low, minor_low, tail_low);
        let newer = name(low + bump, minor_high, tail_high);
        prop_assert!(family_sort_key(&newer) > family_sort_key(&older));
    }

    #[test]
    fn higher_minor_sorts_first_with_same_tail(
        major in 12u32..20,
        minor in 0u32..9,
        bump in 1u32..3,
        tail in tail(),
    ) {
        let suffix = tail.map(|t| format!(":{}", t)).unwrap_or_default();
        let older = format!("SUSE:SLE-{}-SP{}{}", major, minor, suffix);
        let newer = format!("SUSE:SLE-{}-SP{}{}", major, minor + bump, suffix);
        prop_assert!(family_sort_key(&newer) > family_sort_key(&older));
    }

    #[test]
    fn non_family_names_have_zero_key(name in other_name()) {
        prop_assert!(FamilyName::parse(&name).is_none());
        prop_assert_eq!(family_sort_key(&name), 0.0);
    }

    #[test]
    fn update_outranks_bare_version(name in sle_name()) {
        if let Some(family) = FamilyName::parse(&name) {
            if family.tail.is_none() {
                let update = format!("{}:Update", name);
                prop_assert!(family_sort_key(&update) > family_sort_key(&name));
            }
        }
    }
}
