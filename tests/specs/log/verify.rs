//! Verify specs
//!
//! Block signatures and framing checks.

use crate::prelude::*;

#[test]
fn signed_log_verifies() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 4, 2);

    let out = temp.lumity().args(["verify", "app.log"]).passes();
    let lines = out.stdout_lines();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("block 1 bytes 0.."), "{}", lines[0]);
    assert!(lines[0].ends_with(" transactions=5 ok"), "{}", lines[0]);
    assert!(lines[1].starts_with("block 2 bytes "), "{}", lines[1]);
    assert!(lines[1].ends_with(" transactions=2 ok"), "{}", lines[1]);
    assert_eq!(lines[2], "app.log: 9 transactions, framing ok");
}

#[test]
fn unsigned_log_checks_framing_only() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 3, 0);

    temp.lumity()
        .args(["verify", "app.log"])
        .passes()
        .stdout_eq("app.log: 6 transactions, framing ok\n");
}

#[test]
fn altered_payload_fails_its_block() {
    let temp = Workspace::empty();
    let mut bytes = people_log(4, 2);
    patch(&mut bytes, &[3, b'p', b'3', 3], &[3, b'q', b'3', 3]);
    temp.file("app.log", &bytes);

    temp.lumity()
        .args(["verify", "app.log"])
        .fails()
        .stdout_has("transactions=5 ok")
        .stdout_has("transactions=2 FAILED (signature)")
        .stderr_has("1 block(s) in app.log failed verification");
}

#[test]
fn json_reports_each_block() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 4, 2);

    let out = temp
        .lumity()
        .args(["verify", "app.log", "--format", "json"])
        .passes();
    let checks = out.json_lines();

    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0]["block_id"], 1);
    assert_eq!(checks[0]["block_start"], 0);
    assert!(checks[1]["block_start"].as_u64() > checks[0]["offset"].as_u64());
    assert!(checks.iter().all(|c| c["signature_ok"] == true));
}

#[test]
fn broken_framing_is_a_read_error() {
    let temp = Workspace::empty();
    let mut bytes = people_log(2, 0);
    bytes[0] = 255;
    temp.file("app.log", &bytes);

    temp.lumity()
        .args(["verify", "app.log"])
        .fails()
        .stderr_has("the log is damaged at byte");
}
