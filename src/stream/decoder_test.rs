use super::*;

// =============================================================================
// decode_line
// =============================================================================

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(decode_line(""), DecodedEvent::Ignore);
    assert_eq!(decode_line("   \t"), DecodedEvent::Ignore);
}

#[test]
fn comments_are_ignored() {
    assert_eq!(decode_line(": keep-alive"), DecodedEvent::Ignore);
    assert_eq!(decode_line(":data: {}"), DecodedEvent::Ignore);
}

#[test]
fn non_data_fields_are_ignored() {
    assert_eq!(decode_line("event: message"), DecodedEvent::Ignore);
    assert_eq!(decode_line("id: 7"), DecodedEvent::Ignore);
    assert_eq!(decode_line("data:{\"no\":\"space\"}"), DecodedEvent::Ignore);
}

#[test]
fn data_payload_is_trimmed() {
    assert_eq!(decode_line("data:  {\"a\":1}  "), DecodedEvent::Data("{\"a\":1}".into()));
}

#[test]
fn done_is_terminator() {
    assert_eq!(decode_line("data: [DONE]"), DecodedEvent::Terminator);
    assert_eq!(decode_line("data: [DONE] "), DecodedEvent::Terminator);
}

#[test]
fn continuation_detection() {
    assert!(is_continuation("ces\":[]}"));
    assert!(!is_continuation("data: {}"));
    assert!(!is_continuation(": ping"));
    assert!(!is_continuation("  "));
}

#[test]
fn field_lines_are_not_continuations() {
    assert!(!is_continuation("event: message"));
    assert!(!is_continuation("id: 7"));
    assert!(!is_continuation("retry: 3000"));
    assert!(!is_continuation("data:{}"));
    assert!(is_continuation("{\"content\":\"ok\"}}]}"));
    assert!(is_continuation("lo world"));
}

// =============================================================================
// RetryBuffer
// =============================================================================

#[test]
fn retry_buffer_joins_continuation() {
    let mut retry = RetryBuffer::default();
    assert!(retry.hold("{\"a\":\"b".into()));
    assert!(retry.is_pending());
    assert_eq!(retry.join("c\"}").as_deref(), Some("{\"a\":\"bc\"}"));
    assert!(!retry.is_pending());
}

#[test]
fn retry_buffer_join_without_pending_is_none() {
    let mut retry = RetryBuffer::default();
    assert_eq!(retry.join("tail"), None);
}

#[test]
fn retry_buffer_refuses_oversized_payload() {
    let mut retry = RetryBuffer::with_limit(4);
    assert!(retry.hold("abcd".into()));
    assert!(!retry.hold("abcde".into()));
    assert!(!retry.is_pending());
}
