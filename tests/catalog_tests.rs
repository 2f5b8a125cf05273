use std::collections::HashMap;

use rstest::rstest;

use homescope::api::next_after;
use homescope::entities::catalog::search::{fold_unit_prices, merge_search_hits};
use homescope::entities::catalog::{MediaKind, PriceRange, Property, PropertyStatus, UnitStatus};

#[test]
fn test_fold_unit_prices_takes_min_and_max_per_property() {
    let rows = vec![(1, 250_000.0), (1, 180_000.0), (2, 90_000.0), (1, 310_000.0)];
    let folded = fold_unit_prices(&rows);

    assert_eq!(folded.len(), 2);
    assert_eq!(folded[&1].min, 180_000.0);
    assert_eq!(folded[&1].max, 310_000.0);
    assert_eq!(folded[&2].min, 90_000.0);
    assert_eq!(folded[&2].max, 90_000.0);
}

#[test]
fn test_fold_unit_prices_on_empty_rows() {
    let folded: HashMap<i32, PriceRange> = fold_unit_prices(&[]);

    assert!(folded.is_empty());
}

#[test]
fn test_merge_search_hits_ranks_title_before_location() {
    let by_title = vec![(3, "Sunrise Tower"), (7, "Lakeside Villa")];
    let by_location = vec![(5, "District One Loft"), (3, "Sunrise Tower")];

    let merged = merge_search_hits(by_title, by_location, 10, |hit| hit.0);

    assert_eq!(
        merged.iter().map(|hit| hit.0).collect::<Vec<_>>(),
        vec![3, 7, 5],
    );
}

#[test]
fn test_merge_search_hits_respects_limit() {
    let by_title = vec![(1, ()), (2, ())];
    let by_location = vec![(3, ()), (4, ())];

    let merged = merge_search_hits(by_title, by_location, 3, |hit| hit.0);

    assert_eq!(merged.len(), 3);
    assert_eq!(merged.last().map(|hit| hit.0), Some(3));
}

#[rstest]
#[case(0, "Draft")]
#[case(1, "Published")]
#[case(2, "Archived")]
fn test_property_status_roundtrip(#[case] code: i32, #[case] label: &str) {
    let status = PropertyStatus::try_from(code).unwrap();

    assert_eq!(status.to_string(), label);
    assert_eq!(
        PropertyStatus::try_from(label.to_string()).unwrap() as i32,
        code,
    );
}

#[rstest]
#[case(0, "Available")]
#[case(1, "Reserved")]
#[case(2, "Sold")]
fn test_unit_status_roundtrip(#[case] code: i32, #[case] label: &str) {
    let status = UnitStatus::try_from(code).unwrap();

    assert_eq!(status.to_string(), label);
    assert_eq!(UnitStatus::try_from(label.to_string()).unwrap() as i32, code);
}

#[rstest]
#[case(0, "Image")]
#[case(1, "Video")]
#[case(2, "Floorplan")]
fn test_media_kind_roundtrip(#[case] code: i32, #[case] label: &str) {
    let kind = MediaKind::try_from(code).unwrap();

    assert_eq!(kind.to_string(), label);
    assert_eq!(MediaKind::try_from(label.to_string()).unwrap() as i32, code);
}

#[test]
fn test_status_conversions_reject_unknown_values() {
    assert!(PropertyStatus::try_from(9).is_err());
    assert!(PropertyStatus::try_from("Pending".to_string()).is_err());
    assert!(UnitStatus::try_from(-1).is_err());
    assert!(MediaKind::try_from("Document".to_string()).is_err());
}

#[test]
fn test_next_after_echo_only_on_full_page() {
    let page = vec![Some(4), Some(9), Some(12)];

    assert_eq!(next_after(&page, 3, |it| *it), Some(12));
    assert_eq!(next_after(&page, 10, |it| *it), None);
}

#[test]
fn test_property_serialization_skips_missing_fields() {
    let property = Property {
        id: None,
        listing_type_id: None,
        listing_type: None,
        location_id: None,
        location: None,
        description: None,
        status: None,
        featured: None,
        cover: None,
        price_range: None,
        media: None,
        units: None,
        amenities: None,
        title: "Sunrise Tower".to_string(),
    };

    let json = serde_json::to_value(&property).unwrap();

    assert_eq!(json, serde_json::json!({"title": "Sunrise Tower"}));
}
