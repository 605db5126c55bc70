//! Trace Parsing Unit Tests.

use cachesim_core::cache::Access;
use cachesim_core::common::error::TraceError;
use cachesim_core::sim::trace::{TraceReader, TraceRequest};

fn parse_all(text: &str) -> Vec<Result<TraceRequest, TraceError>> {
    TraceReader::new(text.as_bytes()).collect()
}

#[test]
fn test_parses_reads_and_writes() {
    let reqs: Vec<_> = parse_all("r 10\nw 20\n")
        .into_iter()
        .map(|r| r.expect("valid line"))
        .collect();
    assert_eq!(
        reqs,
        vec![
            TraceRequest {
                access: Access::Read,
                addr: 0x10,
            },
            TraceRequest {
                access: Access::Write,
                addr: 0x20,
            },
        ]
    );
}

#[test]
fn test_accepts_hex_prefixes_and_extra_tokens() {
    let reqs: Vec<_> = parse_all("r 0x1f\nw 0X2F trailing comment\n")
        .into_iter()
        .map(|r| r.expect("valid line"))
        .collect();
    assert_eq!(reqs[0].addr, 0x1f);
    assert_eq!(reqs[1].addr, 0x2f);
}

#[test]
fn test_skips_blank_lines_but_keeps_numbering() {
    let results = parse_all("r 10\n\n  \nz 30\n");
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    match &results[1] {
        Err(TraceError::UnknownOp { line, op }) => {
            assert_eq!(*line, 4);
            assert_eq!(op, "z");
        }
        other => panic!("expected UnknownOp, got {other:?}"),
    }
}

#[test]
fn test_missing_address() {
    match parse_all("r\n").remove(0) {
        Err(TraceError::MissingAddress { line: 1 }) => {}
        other => panic!("expected MissingAddress, got {other:?}"),
    }
}

#[test]
fn test_malformed_address() {
    match parse_all("w zz\n").remove(0) {
        Err(TraceError::BadAddress { line, text }) => {
            assert_eq!(line, 1);
            assert_eq!(text, "zz");
        }
        other => panic!("expected BadAddress, got {other:?}"),
    }
}

#[test]
fn test_last_line_without_newline() {
    let results = parse_all("r 10");
    assert_eq!(results.len(), 1);
    assert!(results[0].is_ok());
}
