//! Event decoding from complete 650 replies.

use rstest::rstest;
use torctl_core::{
    CircuitStatus, Event, EventError, EventKind, NetworkLiveness, OrConnStatus, Reply, Severity,
    StatusKind,
};

fn decode(raw: &str) -> Result<Event, EventError> {
    Event::decode(&Reply::parse(raw).expect("reply"))
}

#[rstest]
#[case("650 CIRC 1 LAUNCHED PURPOSE=GENERAL\r\n", EventKind::Circ)]
#[case("650 ORCONN $AAAA~x NEW ID=3\r\n", EventKind::OrConn)]
#[case("650 NETWORK_LIVENESS DOWN\r\n", EventKind::NetworkLiveness)]
#[case("650 STATUS_GENERAL NOTICE CLOCK_JUMPED TIME=30\r\n", EventKind::StatusGeneral)]
#[case("650 STATUS_CLIENT NOTICE CIRCUIT_ESTABLISHED\r\n", EventKind::StatusClient)]
#[case(
    "650 STATUS_SERVER WARN BAD_SERVER_DESCRIPTOR DIRAUTH=x REASON=y\r\n",
    EventKind::StatusServer
)]
#[case("650 BW 0 0\r\n", EventKind::Bw)]
fn dispatches_on_event_name(#[case] raw: &str, #[case] kind: EventKind) {
    let event = decode(raw).expect("decode");
    assert_eq!(event.kind(), kind);
}

#[test]
fn circuit_event_fields() {
    let event = decode(
        "650 CIRC 42 FAILED $AAAA~guard,$BBBB~middle PURPOSE=GENERAL REASON=TIMEOUT REMOTE_REASON=DESTROYED\r\n",
    )
    .expect("decode");
    let Event::Circuit(circ) = event else {
        panic!("expected circuit event");
    };
    assert_eq!(circ.id.to_string(), "42");
    assert_eq!(circ.status, CircuitStatus::Failed);
    assert_eq!(circ.path.len(), 2);
    assert_eq!(circ.reason.as_deref(), Some("TIMEOUT"));
    assert_eq!(circ.remote_reason.as_deref(), Some("DESTROYED"));
}

#[test]
fn orconn_event_fields() {
    let raw = "650 ORCONN $AAAA~guard CLOSED REASON=DONE NCIRCS=0\r\n";
    let Event::OrConnection(conn) = decode(raw).expect("decode") else {
        panic!("expected orconn event");
    };
    assert_eq!(conn.status, OrConnStatus::Closed);
    assert_eq!(conn.circuit_count, Some(0));
}

#[test]
fn liveness_event() {
    assert_eq!(
        decode("650 NETWORK_LIVENESS UP\r\n").expect("decode"),
        Event::NetworkLiveness {
            liveness: NetworkLiveness::Up
        }
    );
}

#[test]
fn status_event_with_quoted_summary() {
    let Event::Status(status) = decode(
        "650 STATUS_CLIENT NOTICE BOOTSTRAP PROGRESS=85 TAG=ap_conn_done SUMMARY=\"Connected to a relay to build circuits\"\r\n",
    )
    .expect("decode") else {
        panic!("expected status event");
    };
    assert_eq!(status.kind, StatusKind::Client);
    assert_eq!(status.severity, Severity::Notice);
    assert_eq!(status.bootstrap_progress(), Some(85));
    assert_eq!(
        status.arguments.get("SUMMARY").map(String::as_str),
        Some("Connected to a relay to build circuits")
    );
}

#[rstest]
#[case("650 STREAM 1 NEW 0 example.com:80\r\n", "STREAM")]
#[case("650 HS_DESC RECEIVED abc\r\n", "HS_DESC")]
#[case("650 \r\n", "")]
fn unknown_events_are_unsupported(#[case] raw: &str, #[case] expected: &str) {
    match decode(raw) {
        Err(EventError::Unsupported { name, raw: text }) => {
            assert_eq!(name, expected);
            assert!(text.starts_with("650 "));
        }
        other => panic!("expected unsupported, got {other:?}"),
    }
}

#[rstest]
#[case("650 NETWORK_LIVENESS MAYBE\r\n")]
#[case("650 CIRC\r\n")]
#[case("650 BW x y\r\n")]
fn malformed_known_events_keep_raw_text(#[case] raw: &str) {
    let err = decode(raw).expect_err("malformed");
    assert!(matches!(err, EventError::Malformed { .. }), "got: {err}");
    assert!(err.to_string().contains(raw.trim_end()));
}

#[test]
fn events_serialize_with_tag() {
    let event = decode("650 BW 10 20\r\n").expect("decode");
    let json = serde_json::to_value(&event).expect("json");
    assert_eq!(json["event"], "bandwidth");
    assert_eq!(json["bytes_read"], 10);
    assert_eq!(json["bytes_written"], 20);
}
