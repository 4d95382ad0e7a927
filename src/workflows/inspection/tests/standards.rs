use super::common::*;

use crate::workflows::inspection::catalog::VehicleAspect;
use crate::workflows::inspection::domain::OrganizationId;
use crate::workflows::inspection::standards::StandardsRegistry;

#[test]
fn lookup_matches_on_category_and_requirement_substring() {
    let registry = registry(vec![standard(
        "std-brakes",
        None,
        "mechanical",
        "brakes service condition",
        25,
        None,
    )]);

    let matched = registry.lookup(VehicleAspect::Brakes).expect("match");
    assert_eq!(matched.id, "std-brakes");
    assert!(registry.lookup(VehicleAspect::Tires).is_none());
}

#[test]
fn lookup_matches_when_requirement_is_substring_of_aspect_key() {
    // Admins write "brake", the aspect key is "brakes".
    let registry = registry(vec![standard(
        "std-brake",
        None,
        "mechanical",
        "brake",
        25,
        None,
    )]);

    assert!(registry.lookup(VehicleAspect::Brakes).is_some());
}

#[test]
fn lookup_requires_category_equality() {
    // Right name, wrong category: brakes are mechanical, not safety.
    let registry = registry(vec![standard(
        "std-brakes",
        None,
        "safety",
        "brakes",
        25,
        None,
    )]);

    assert!(registry.lookup(VehicleAspect::Brakes).is_none());
}

#[test]
fn organization_scoped_standard_beats_global() {
    let registry = registry(vec![
        standard("std-global", None, "mechanical", "brakes", 10, None),
        standard(
            "std-scoped",
            Some(org()),
            "mechanical",
            "brakes",
            30,
            Some("Org brake policy"),
        ),
    ]);

    let matched = registry.lookup(VehicleAspect::Brakes).expect("match");
    assert_eq!(matched.id, "std-scoped");
    assert_eq!(matched.points_deduction, 30);
}

#[test]
fn first_match_in_list_order_wins_within_a_scope() {
    let registry = registry(vec![
        standard("std-first", Some(org()), "mechanical", "brakes", 20, None),
        standard("std-second", Some(org()), "mechanical", "brakes", 40, None),
    ]);

    let matched = registry.lookup(VehicleAspect::Brakes).expect("match");
    assert_eq!(matched.id, "std-first");
}

#[test]
fn other_organizations_standards_are_invisible() {
    let registry = registry(vec![standard(
        "std-other",
        Some(OrganizationId("org-999".to_string())),
        "mechanical",
        "brakes",
        50,
        None,
    )]);

    assert!(registry.lookup(VehicleAspect::Brakes).is_none());
    assert!(registry.is_empty());
}

#[test]
fn registry_partitions_scoped_and_global_entries() {
    let registry = StandardsRegistry::new(
        &org(),
        vec![
            standard("std-a", Some(org()), "mechanical", "engine", 10, None),
            standard("std-b", None, "safety", "tires", 10, None),
            standard(
                "std-c",
                Some(OrganizationId("org-999".to_string())),
                "visual",
                "exterior",
                10,
                None,
            ),
        ],
    );

    // The foreign-org entry is dropped entirely.
    assert_eq!(registry.len(), 2);
    assert!(registry.lookup(VehicleAspect::Engine).is_some());
    assert!(registry.lookup(VehicleAspect::Tires).is_some());
    assert!(registry.lookup(VehicleAspect::Exterior).is_none());
}

#[test]
fn category_match_is_case_insensitive() {
    let registry = registry(vec![standard(
        "std-caps",
        None,
        "MECHANICAL",
        "Engine Mounts",
        15,
        None,
    )]);

    assert!(registry.lookup(VehicleAspect::Engine).is_some());
}
