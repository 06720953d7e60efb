use super::*;

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_use_ptyp_false_is_absent() {
    let signal = resolve_ptyp("r1", Some(false), &tags(&["Randomized Controlled Trial"]), true);
    assert_eq!(signal.unwrap(), PtypSignal::Absent);
}

#[test]
fn test_rct_tag_confirms() {
    let signal = resolve_ptyp("r1", Some(true), &tags(&["randomized controlled trial"]), true);
    assert_eq!(signal.unwrap(), PtypSignal::ConfirmedRct);
}

#[test]
fn test_mesh_code_confirms() {
    let signal = resolve_ptyp("r1", Some(true), &tags(&["Journal Article", "D016449"]), true);
    assert_eq!(signal.unwrap(), PtypSignal::ConfirmedRct);
}

#[test]
fn test_capitalized_term_confirms() {
    let signal = resolve_ptyp("r1", Some(true), &tags(&["Randomized Controlled Trial"]), true);
    assert_eq!(signal.unwrap(), PtypSignal::ConfirmedRct);
}

#[test]
fn test_non_rct_tags_do_not_confirm() {
    let signal = resolve_ptyp("r1", Some(true), &tags(&["Cohort Study"]), true);
    assert_eq!(signal.unwrap(), PtypSignal::NotRct);
}

#[test]
fn test_no_tags_do_not_confirm() {
    let signal = resolve_ptyp("r1", Some(true), &[], true);
    assert_eq!(signal.unwrap(), PtypSignal::NotRct);
}

#[test]
fn test_missing_flag_fails_under_strict() {
    let err = resolve_ptyp("r42", None, &[], true).unwrap_err();
    assert_eq!(err.id, "r42");
}

#[test]
fn test_missing_flag_is_absent_when_lenient() {
    let signal = resolve_ptyp("r42", None, &tags(&["D016449"]), false);
    assert_eq!(signal.unwrap(), PtypSignal::Absent);
}

#[test]
fn test_wire_encoding() {
    assert_eq!(PtypSignal::Absent.as_int(), -1);
    assert_eq!(PtypSignal::NotRct.as_int(), 0);
    assert_eq!(PtypSignal::ConfirmedRct.as_int(), 1);
    assert!(PtypSignal::Absent.is_absent());
    assert!(!PtypSignal::NotRct.is_absent());
}
