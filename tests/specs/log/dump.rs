//! Dump specs
//!
//! Reading logs forward and backward, limits, and damaged logs.

use crate::prelude::*;

#[test]
fn forward_dump_prints_transactions_in_log_order() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 3, 0);

    let out = temp.lumity().args(["dump", "app.log"]).passes();
    let headers = out.headers();

    assert_eq!(headers.len(), 6);
    assert!(headers[0].starts_with("#0 Blockchain.Type (def 3) offset=0 "));
    assert!(headers[1].contains("Blockchain.Field (def 2)"));
    assert!(headers[3..].iter().all(|h| h.contains(" Person (def 9) ")));
    out.stdout_has("  Name (2) = \"Person\"")
        .stdout_has("  Age (23) = 20")
        .stdout_has("  Nickname (24) = \"p2\"")
        .stdout_lacks("INVALID");
}

#[test]
fn backward_dump_reverses_the_forward_order() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 4, 2);

    let forward = temp.lumity().args(["dump", "app.log"]).passes();
    let backward = temp
        .lumity()
        .args(["dump", "app.log", "--backward"])
        .passes();

    let mut expected = forward.headers();
    expected.reverse();
    similar_asserts::assert_eq!(backward.headers(), expected);
}

#[test]
fn transaction_ids_are_byte_offsets() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 2, 0);

    let out = temp
        .lumity()
        .args(["dump", "app.log", "--format", "json"])
        .passes();
    let mut next = 0;
    for tx in out.json_lines() {
        assert_eq!(tx["transaction_id"], tx["offset"]);
        assert_eq!(tx["offset"].as_u64().unwrap(), next);
        next += tx["length"].as_u64().unwrap();
    }
    assert_eq!(next, people_log(2, 0).len() as u64);
}

#[test]
fn block_size_does_not_change_the_output() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 4, 2);

    let whole = temp.lumity().args(["dump", "app.log"]).passes();
    for size in ["1", "3", "17"] {
        temp.lumity()
            .args(["dump", "app.log", "--block-size", size])
            .passes()
            .stdout_eq(&whole.stdout);
    }
}

#[test]
fn limit_stops_early() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 5, 0);

    let out = temp
        .lumity()
        .args(["dump", "app.log", "--limit", "2"])
        .passes();
    assert_eq!(out.headers().len(), 2);

    temp.lumity()
        .args(["dump", "app.log", "--backward", "--limit", "1"])
        .passes()
        .stdout_has("\"p4\"")
        .stdout_lacks("\"p3\"");
}

#[test]
fn json_prints_one_document_per_transaction() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 2, 0);

    let out = temp
        .lumity()
        .args(["dump", "app.log", "--format", "json"])
        .passes();
    let docs = out.json_lines();

    assert_eq!(docs.len(), 5);
    let person = &docs[3];
    assert_eq!(person["definition"], "Person");
    assert_eq!(person["definition_id"], PERSON);
    assert_eq!(person["timestamp"], 1000);
    assert_eq!(person["valid"], true);
    assert_eq!(person["fields"][1]["name"], "Age");
    assert_eq!(person["fields"][1]["id"], AGE);
    assert_eq!(person["fields"][2]["value"]["value"], "p0");
}

#[test]
fn block_ids_follow_boundaries() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 2, 1);

    let out = temp.lumity().args(["dump", "app.log"]).passes();
    let people: Vec<&str> = out
        .headers()
        .into_iter()
        .filter(|h| h.contains(" Person "))
        .collect();

    assert!(people[0].ends_with(" block=1"), "{}", people[0]);
    assert!(people[1].ends_with(" block=2"), "{}", people[1]);
    out.stdout_has("Blockchain.BlockBoundary (def 6)")
        .stdout_has("  BlockId (11) = 2");
}

#[test]
fn truncated_log_names_the_partial_transaction() {
    let temp = Workspace::empty();
    let mut bytes = people_log(2, 0);
    bytes.truncate(bytes.len() - 3);
    temp.file("app.log", &bytes);
    let start = people_log(1, 0).len();

    temp.lumity()
        .args(["dump", "app.log"])
        .fails()
        .stdout_has("\"p0\"")
        .stderr_has(&format!("inside a transaction that starts at byte {}", start))
        .stderr_has(&format!("truncate -s {} app.log", start));
}

#[test]
fn damaged_log_suggests_reading_backward() {
    let temp = Workspace::empty();
    let mut bytes = people_log(6, 0);
    // trailing id of p3's nickname now claims Age
    patch(&mut bytes, &[3, b'p', b'3', 3, 24], &[3, b'p', b'3', 3, 23]);
    temp.file("app.log", &bytes);

    temp.lumity()
        .args(["dump", "app.log"])
        .fails()
        .stdout_has("\"p2\"")
        .stdout_lacks("\"p4\"")
        .stderr_has("the log is damaged at byte")
        .stderr_has("lumity dump app.log --backward");

    temp.lumity()
        .args(["dump", "app.log", "--backward"])
        .fails()
        .stdout_has("\"p5\"")
        .stdout_has("\"p4\"")
        .stdout_lacks("\"p2\"");
}
