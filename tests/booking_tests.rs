use rstest::rstest;

use homescope::entities::booking::AppointmentStatus;

#[rstest]
#[case("Pending", "Confirmed", true)]
#[case("Pending", "Cancelled", true)]
#[case("Confirmed", "Completed", true)]
#[case("Confirmed", "Cancelled", true)]
#[case("Pending", "Completed", false)]
#[case("Pending", "Expired", false)]
#[case("Confirmed", "Pending", false)]
#[case("Completed", "Cancelled", false)]
#[case("Cancelled", "Confirmed", false)]
#[case("Expired", "Confirmed", false)]
fn test_appointment_transitions(#[case] from: &str, #[case] to: &str, #[case] allowed: bool) {
    let from = AppointmentStatus::try_from(from.to_string()).unwrap();
    let to = AppointmentStatus::try_from(to.to_string()).unwrap();

    assert_eq!(from.can_move_to(&to), allowed);
}

#[rstest]
#[case(0, "Pending")]
#[case(1, "Confirmed")]
#[case(2, "Completed")]
#[case(3, "Cancelled")]
#[case(4, "Expired")]
fn test_appointment_status_roundtrip(#[case] code: i32, #[case] label: &str) {
    let status = AppointmentStatus::try_from(code).unwrap();

    assert_eq!(status.to_string(), label);
    assert_eq!(
        AppointmentStatus::try_from(label.to_string()).unwrap() as i32,
        code,
    );
}

#[test]
fn test_appointment_status_rejects_unknown_values() {
    assert!(AppointmentStatus::try_from(5).is_err());
    assert!(AppointmentStatus::try_from("Done".to_string()).is_err());
}

#[test]
fn test_terminal_states_accept_no_transition() {
    for terminal in ["Completed", "Cancelled", "Expired"] {
        let from = AppointmentStatus::try_from(terminal.to_string()).unwrap();

        for next in ["Pending", "Confirmed", "Completed", "Cancelled", "Expired"] {
            let to = AppointmentStatus::try_from(next.to_string()).unwrap();

            assert!(
                !from.can_move_to(&to),
                "Expected {} -> {} to be rejected",
                terminal,
                next,
            );
        }
    }
}
