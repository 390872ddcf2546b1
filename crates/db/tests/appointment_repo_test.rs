use barbershop_db::repositories::appointment::is_active_slot_constraint;
use barbershop_db::schema::ACTIVE_SLOT_INDEX;
use rstest::rstest;

#[test]
fn test_active_slot_index_is_a_slot_violation() {
    assert!(is_active_slot_constraint(Some(ACTIVE_SLOT_INDEX)));
}

#[rstest]
#[case(None)]
#[case(Some("clients_pkey"))]
#[case(Some("appointment_extras_pkey"))]
#[case(Some("days_weekday_key"))]
fn test_other_unique_violations_are_storage_errors(#[case] constraint: Option<&str>) {
    assert!(!is_active_slot_constraint(constraint));
}
