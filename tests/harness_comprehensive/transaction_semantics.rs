//! Branch isolation and rollback-only transactions

use crate::common::*;

#[test]
fn branch_writes_are_invisible_until_commit() {
    let h = Harness::with_table();
    h.begin();
    h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap();

    assert!(h.store.committed_rows(TABLE_NAME).unwrap().is_empty());
    // inside the branch the row is already there
    assert!(h.check("AAAA"));

    h.tm.commit().unwrap();
    assert_eq!(h.store.committed_rows(TABLE_NAME).unwrap().len(), 1);
    assert_eq!(h.store.active_branches(), 0);
}

#[test]
fn abort_discards_every_call_in_the_branch() {
    let h = Harness::with_table();
    h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap();

    h.begin();
    h.call(ServiceName::UpdateData, RECORD_ID, "EFGH").unwrap();
    h.call(ServiceName::InsertData, 2000, "BBBB").unwrap();
    h.call(ServiceName::DeleteData, RECORD_ID, "").unwrap();
    h.tm.abort().unwrap();

    let rows = h.store.committed_rows(TABLE_NAME).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].payload, "AAAA");
    assert_eq!(h.tm.current(), None);
}

#[test]
fn failed_check_makes_transaction_rollback_only() {
    let h = Harness::with_table();
    h.begin();
    h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap();
    assert!(!h.check("ZZZZ"));

    let err = h.tm.commit().unwrap_err();
    assert_eq!(err.code, TmErrorCode::Abort);
    assert!(h.store.committed_rows(TABLE_NAME).unwrap().is_empty());

    let stats = h.tm.stats();
    assert_eq!((stats.begun, stats.committed, stats.aborted), (1, 0, 1));
}

#[test]
fn sequential_transactions_reuse_the_association() {
    let h = Harness::with_table();
    for (i, payload) in ["A", "B", "C"].iter().enumerate() {
        h.begin();
        h.call(ServiceName::InsertData, i as i32, payload).unwrap();
        h.tm.commit().unwrap();
    }
    assert_eq!(h.store.committed_rows(TABLE_NAME).unwrap().len(), 3);
    assert_eq!(h.tm.stats().committed, 3);
}

#[test]
fn server_counts_every_service_assertion() {
    let h = Harness::with_table();
    let before = h.server.summary().assertions;
    h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap();
    let after = h.server.summary();

    // decode, table presence, insert result
    assert_eq!(after.assertions - before, 3);
    assert_eq!(after.failures, 0);
}
