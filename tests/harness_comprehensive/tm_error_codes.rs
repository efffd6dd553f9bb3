//! Failure paths map onto the documented transaction-manager codes

use std::time::Duration;

use crate::common::*;

#[test]
fn nested_begin_is_a_protocol_error() {
    let h = Harness::with_table();
    h.begin();
    let err = h.tm.begin(Duration::from_secs(1)).unwrap_err();
    assert_eq!(err.code, TmErrorCode::Proto);
    assert_eq!(err.name(), Some("TPEPROTO"));
    h.tm.abort().unwrap();
}

#[test]
fn commit_and_abort_without_transaction() {
    let h = Harness::with_table();
    assert_eq!(h.tm.commit().unwrap_err().code, TmErrorCode::Proto);
    assert_eq!(h.tm.abort().unwrap_err().code, TmErrorCode::Proto);
}

#[test]
fn unknown_service_is_noent() {
    let h = Harness::with_table();
    let err = h.tm.call("SERV_NOPE", b"1:x").unwrap_err();
    assert_eq!(err.code, TmErrorCode::NoEnt);
    assert_eq!(err.method, "SERV_NOPE");
}

#[test]
fn missing_table_fails_the_service() {
    let h = Harness::start();
    let err = h.call(ServiceName::UpdateData, RECORD_ID, "ABCD").unwrap_err();
    assert_eq!(err.code, TmErrorCode::SvcFail);
    assert!(h
        .server_log
        .failure_tags()
        .contains(&"Test table not found.".to_string()));
}

#[test]
fn expired_transaction_times_out_then_aborts() {
    let h = Harness::with_table();
    h.tm.begin(Duration::from_millis(1)).unwrap();
    std::thread::sleep(Duration::from_millis(20));

    let err = h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap_err();
    assert_eq!(err.code, TmErrorCode::Time);
    assert_eq!(h.tm.commit().unwrap_err().code, TmErrorCode::Abort);
    assert!(h.store.committed_rows(TABLE_NAME).unwrap().is_empty());
}

#[test]
fn undocumented_codes_render_raw_value() {
    let err = TmError::new(TmErrorCode::RmErr, "tpbegin");
    assert_eq!(err.name(), None);
    assert_eq!(err.to_string(), "UNDOCUMENTED ERROR: tpbegin returned 16");
}
