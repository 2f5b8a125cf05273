use lazy_static::lazy_static;

use homescope::entities::compare::{apply_add, apply_remove, COMPARE_CAP};

lazy_static! {
    static ref FULL_SELECTION: Vec<i32> = vec![11, 22, 33];
}

#[test]
fn test_apply_add_appends_until_cap() {
    let first = apply_add(&[], 11, COMPARE_CAP).unwrap();
    assert_eq!(first, vec![11]);

    let second = apply_add(&first, 22, COMPARE_CAP).unwrap();
    assert_eq!(second, vec![11, 22]);

    let third = apply_add(&second, 33, COMPARE_CAP).unwrap();
    assert_eq!(third, *FULL_SELECTION);
}

#[test]
fn test_apply_add_rejects_when_full() {
    let result = apply_add(&FULL_SELECTION, 44, COMPARE_CAP);

    assert!(result.is_err());
    assert!(result.err().unwrap().message.contains("maximum 3"));
}

#[test]
fn test_apply_add_is_idempotent_on_duplicates() {
    let unchanged = apply_add(&FULL_SELECTION, 22, COMPARE_CAP).unwrap();

    assert_eq!(unchanged, *FULL_SELECTION);
}

#[test]
fn test_apply_remove_drops_only_the_given_id() {
    assert_eq!(apply_remove(&FULL_SELECTION, 22), vec![11, 33]);
    assert_eq!(apply_remove(&FULL_SELECTION, 99), *FULL_SELECTION);
    assert_eq!(apply_remove(&[], 1), Vec::<i32>::new());
}

#[test]
fn test_selection_order_survives_add_and_remove() {
    let mut selection = Vec::new();

    for id in [7, 5, 9] {
        selection = apply_add(&selection, id, COMPARE_CAP).unwrap();
    }

    assert_eq!(selection, vec![7, 5, 9]);

    selection = apply_remove(&selection, 5);
    assert_eq!(selection, vec![7, 9]);

    selection = apply_add(&selection, 2, COMPARE_CAP).unwrap();
    assert_eq!(selection, vec![7, 9, 2]);
}
