use super::*;

#[test]
fn extracts_content_delta() {
    let json = serde_json::json!({
        "id": "chatcmpl-1",
        "model": "google/gemini-2.5-flash",
        "choices": [{ "index": 0, "delta": { "role": "assistant", "content": "Hel" }, "finish_reason": null }]
    })
    .to_string();
    assert_eq!(extract_fragment(&json).unwrap().as_deref(), Some("Hel"));
}

#[test]
fn only_first_choice_is_read() {
    let json = serde_json::json!({
        "choices": [
            { "delta": { "content": "first" } },
            { "delta": { "content": "second" } }
        ]
    })
    .to_string();
    assert_eq!(extract_fragment(&json).unwrap().as_deref(), Some("first"));
}

#[test]
fn absent_null_and_empty_content_yield_nothing() {
    let cases = [
        serde_json::json!({ "choices": [{ "delta": {} }] }),
        serde_json::json!({ "choices": [{ "delta": { "content": null } }] }),
        serde_json::json!({ "choices": [{ "delta": { "content": "" } }] }),
        serde_json::json!({ "choices": [{ "delta": { "content": 42 } }] }),
        serde_json::json!({ "choices": [] }),
        serde_json::json!({ "usage": { "total_tokens": 9 } }),
    ];
    for case in cases {
        assert_eq!(extract_fragment(&case.to_string()).unwrap(), None, "{case}");
    }
}

#[test]
fn finish_chunk_yields_nothing() {
    let json = serde_json::json!({ "choices": [{ "delta": {}, "finish_reason": "stop" }] }).to_string();
    assert_eq!(extract_fragment(&json).unwrap(), None);
}

#[test]
fn truncated_json_is_malformed() {
    let err = extract_fragment("{\"choices\":[{\"delta\":{\"content\":\"Hel").unwrap_err();
    assert!(matches!(err, ChatError::MalformedRecord(_)));
}

#[test]
fn whitespace_and_unicode_are_preserved() {
    let json = serde_json::json!({ "choices": [{ "delta": { "content": " नमस्ते\n" } }] }).to_string();
    assert_eq!(extract_fragment(&json).unwrap().as_deref(), Some(" नमस्ते\n"));
}
