//! Reply assembly over realistic daemon output.
//!
//! Each case feeds raw lines through a fresh `ReplyAssembler`.

use rstest::rstest;
use torctl_core::{Reply, ReplyAssembler, ReplyParseError, StatusCode};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Feed every line and collect the replies produced, failing on any error.
fn assemble(raw: &str) -> Result<Vec<Reply>, ReplyParseError> {
    let mut assembler = ReplyAssembler::new();
    let mut replies = Vec::new();
    for line in raw.split_inclusive('\n') {
        if let Some(reply) = assembler.push_line(line)? {
            replies.push(reply);
        }
    }
    assembler.finish()?;
    Ok(replies)
}

// ---------------------------------------------------------------------------
// 1. Single and multi-line replies
// ---------------------------------------------------------------------------

#[rstest]
#[case("250 OK\r\n", StatusCode::Ok, "OK")]
#[case(
    "515 Authentication failed: Wrong length on authentication cookie.\r\n",
    StatusCode::BadAuthentication,
    "Authentication failed: Wrong length on authentication cookie."
)]
#[case(
    "552 Unrecognized key \"nope\"\r\n",
    StatusCode::UnrecognizedEntity,
    "Unrecognized key \"nope\""
)]
#[case("650 NETWORK_LIVENESS UP\r\n", StatusCode::AsyncEventNotify, "NETWORK_LIVENESS UP")]
#[case("250 \r\n", StatusCode::Ok, "")]
fn single_line_reply_has_one_line(
    #[case] raw: &str,
    #[case] status: StatusCode,
    #[case] text: &str,
) {
    let replies = assemble(raw).expect("assemble");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].status(), status);
    assert_eq!(replies[0].lines(), [text]);
}

#[test]
fn continuation_lines_keep_input_order() {
    let raw = "250-PROTOCOLINFO 1\r\n\
               250-AUTH METHODS=COOKIE,SAFECOOKIE COOKIEFILE=\"/run/tor/control.authcookie\"\r\n\
               250-VERSION Tor=\"0.4.8.12\"\r\n\
               250 OK\r\n";
    let replies = assemble(raw).expect("assemble");
    assert_eq!(replies.len(), 1);
    let lines = replies[0].lines();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "PROTOCOLINFO 1");
    assert_eq!(lines[2], "VERSION Tor=\"0.4.8.12\"");
    assert_eq!(lines[3], "OK");
}

#[test]
fn consecutive_replies_are_separated() {
    let raw = "250-a\r\n250 OK\r\n650 BW 1 2\r\n250 OK\r\n";
    let replies = assemble(raw).expect("assemble");
    let statuses: Vec<u16> = replies.iter().map(|r| r.status().as_u16()).collect();
    assert_eq!(statuses, vec![250, 650, 250]);
}

// ---------------------------------------------------------------------------
// 2. Data blocks
// ---------------------------------------------------------------------------

#[test]
fn data_block_lines_are_verbatim_and_terminator_dropped() {
    let raw = "250+config-text=\r\n\
               ControlPort 9051\r\n\
               250-looks like a status line\r\n\
               +also verbatim\r\n\
               .\r\n\
               250 OK\r\n";
    let replies = assemble(raw).expect("assemble");
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0].lines(),
        [
            "config-text=",
            "ControlPort 9051",
            "250-looks like a status line",
            "+also verbatim",
            "OK",
        ]
    );
}

#[test]
fn empty_data_block() {
    let replies = assemble("250+info/names=\r\n.\r\n250 OK\r\n").expect("assemble");
    assert_eq!(replies[0].lines(), ["info/names=", "OK"]);
}

#[test]
fn multi_line_event_with_data_block() {
    let raw = "650+NS\r\nr relay AAAA\r\ns Fast Running\r\n.\r\n650 OK\r\n";
    let replies = assemble(raw).expect("assemble");
    assert!(replies[0].is_event());
    assert_eq!(replies[0].lines().len(), 4);
}

// ---------------------------------------------------------------------------
// 3. Framing errors
// ---------------------------------------------------------------------------

#[rstest]
#[case("250-a\r\n251 OK\r\n")]
#[case("650-CIRC 1 BUILT\r\n250 OK\r\n")]
fn status_change_within_reply_is_rejected(#[case] raw: &str) {
    let err = assemble(raw).unwrap_err();
    assert!(matches!(err, ReplyParseError::StatusMismatch { .. }), "got: {err}");
}

#[rstest]
#[case("250*OK\r\n")]
#[case("250_OK\r\n")]
#[case("250=OK\r\n")]
fn unknown_marker_is_rejected(#[case] raw: &str) {
    let err = assemble(raw).unwrap_err();
    assert!(matches!(err, ReplyParseError::InvalidMarker { .. }), "got: {err}");
}

#[rstest]
#[case("OK 250\r\n")]
#[case("2 5 OK\r\n")]
fn non_digit_code_is_rejected(#[case] raw: &str) {
    let err = assemble(raw).unwrap_err();
    assert!(matches!(err, ReplyParseError::InvalidStatusCode { .. }), "got: {err}");
}

#[test]
fn eof_before_final_line_is_rejected() {
    let err = assemble("250-a\r\n250-b\r\n").unwrap_err();
    assert_eq!(err, ReplyParseError::UnexpectedEof { received: 2 });
}

#[test]
fn eof_inside_data_block_is_rejected() {
    let err = assemble("250+data=\r\nline\r\n").unwrap_err();
    assert!(matches!(err, ReplyParseError::UnterminatedDataBlock { .. }));
}

#[test]
fn clean_eof_between_replies_is_fine() {
    assert_eq!(assemble("").expect("empty").len(), 0);
    assert_eq!(assemble("250 OK\r\n").expect("one").len(), 1);
}
