//! Request buffers as the transaction manager carries them

use crate::common::*;

#[test]
fn trailing_nul_padding_is_ignored() {
    let h = Harness::with_table();
    let mut buffer = RequestMessage::new(RECORD_ID, "AAAA").to_bytes();
    buffer.resize(64, 0);

    h.tm.call(ServiceName::InsertData.as_str(), &buffer).unwrap();
    assert!(h.check("AAAA"));
}

#[test]
fn payload_keeps_embedded_colons() {
    let h = Harness::with_table();
    h.call(ServiceName::InsertData, RECORD_ID, "a:b:c").unwrap();

    let rows = h.store.committed_rows(TABLE_NAME).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].payload, "a:b:c");
}

#[test]
fn malformed_buffers_fail_the_service() {
    let h = Harness::with_table();
    let buffers: [&[u8]; 4] = [b"no separator", b"key:AAAA", b"", &[0xff, 0xfe, b':']];
    for buffer in buffers {
        let err = h.tm.call(ServiceName::InsertData.as_str(), buffer).unwrap_err();
        assert_eq!(err.code, TmErrorCode::SvcFail);
    }
    assert!(h.store.committed_rows(TABLE_NAME).unwrap().is_empty());
    assert_eq!(
        h.server_log
            .failure_tags()
            .iter()
            .filter(|t| t.as_str() == "Malformed request message.")
            .count(),
        4
    );
}

#[test]
fn check_reads_expected_payload_after_first_colon() {
    let h = Harness::with_table();
    h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap();

    // the key half of a check request is ignored
    assert!(h.call(ServiceName::CheckData, 42, "AAAA").is_ok());
    assert!(h.call(ServiceName::CheckData, 0, "BBBB").is_err());
    assert!(h
        .server_log
        .failure_tags()
        .contains(&"Wrong data in test table: found AAAA, expected BBBB".to_string()));
}

#[test]
fn services_reply_with_empty_payload() {
    let h = Harness::with_table();
    for service in ServiceName::ALL {
        let reply = h.call(service, RECORD_ID, "").unwrap();
        assert!(reply.is_empty(), "{} replied with data", service);
    }
}

#[test]
fn server_advertises_the_data_services() {
    let h = Harness::start();
    let mut names = h.tm.services().names();
    names.sort();
    assert_eq!(
        names,
        vec!["SERV_CHK_DATA", "SERV_DEL_DATA", "SERV_INS_DATA", "SERV_UPD_DATA"]
    );
}

#[test]
fn leftover_bytes_after_the_terminator_are_ignored() {
    let h = Harness::with_table();
    h.call(ServiceName::InsertData, RECORD_ID, "AAAA").unwrap();

    // a check request written over the earlier insert buffer
    let mut buffer = RequestMessage::new(RECORD_ID, "AAAA").to_bytes();
    buffer[..7].copy_from_slice(b"0:AAAA\0");
    h.tm.call(ServiceName::CheckData.as_str(), &buffer).unwrap();
}
