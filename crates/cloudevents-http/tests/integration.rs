use cloudevents_core::{CloudEvent, Data, EventError, SpecVersion};
use cloudevents_http::{
    ContentMode, EmitterOptions, Headers, HttpEmitter, HttpError, HttpReceiver, ReceiverOptions,
    STRUCTURED_MEDIA_TYPE,
};
use serde_json::{json, Value};

fn headers(pairs: &[(&str, &str)]) -> Headers {
    pairs.iter().copied().collect()
}

fn sample(version: SpecVersion) -> CloudEvent {
    let mut event = CloudEvent::builder()
        .spec_version(version)
        .id("evt-1")
        .source("https://example.com/orders")
        .ty("com.example.order.created")
        .subject("orders/42")
        .time("2024-05-01T10:00:00Z")
        .data_content_type("application/json")
        .data(json!({"order": 42, "items": ["a", "b"]}))
        .build()
        .unwrap();
    event.add_extension("tenant", "acme").unwrap();
    event
}

#[test]
fn binary_mode_receive_builds_the_event() {
    let headers = headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", "1.0"),
        ("Content-Type", "application/json"),
    ]);

    let event = HttpReceiver::default().parse(&headers, br#"{"a":1}"#).unwrap();
    assert_eq!(event.id(), Some("1"));
    assert_eq!(event.source(), Some("/s"));
    assert_eq!(event.ty(), Some("t"));
    assert_eq!(event.data_content_type(), Some("application/json"));
    assert_eq!(event.data(), &Data::Structured(json!({"a": 1})));
}

#[test]
fn binary_mode_header_names_are_case_insensitive() {
    let headers = headers(&[
        ("CE-ID", "1"),
        ("Ce-Source", "/s"),
        ("ce-TYPE", "t"),
        ("CE-SpecVersion", "1.0"),
    ]);
    let event = HttpReceiver::default().parse(&headers, b"").unwrap();
    assert_eq!(event.ty(), Some("t"));
    assert!(event.data().is_empty());
}

#[test]
fn binary_mode_unknown_headers_become_extensions() {
    let headers = headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", "1.0"),
        ("ce-traceparent", "00-abc-def-01"),
        ("x-request-id", "ignored"),
    ]);
    let event = HttpReceiver::default().parse(&headers, b"").unwrap();
    assert_eq!(event.extension("traceparent"), Some(&json!("00-abc-def-01")));
    assert!(event.extension("x-request-id").is_none());
}

#[test]
fn other_version_attributes_are_rejected_in_both_modes() {
    let receiver = HttpReceiver::default();

    let binary = headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", "1.0"),
        ("ce-schemaurl", "https://example.com/schema"),
    ]);
    assert!(matches!(
        receiver.parse(&binary, b""),
        Err(HttpError::Event(EventError::ExtensionNameCollision(name))) if name == "schemaurl"
    ));

    let structured = headers(&[("content-type", STRUCTURED_MEDIA_TYPE)]);
    let body = br#"{"id":"1","source":"/s","type":"t","specversion":"1.0","schemaurl":"https://example.com/schema"}"#;
    assert!(matches!(
        receiver.parse(&structured, body),
        Err(HttpError::Event(EventError::VersionMismatch { .. }))
    ));

    let body = br#"{"id":"1","source":"/s","type":"t","specversion":"0.3","datacontentencoding":"base64","dataschema":"https://example.com/schema"}"#;
    assert!(matches!(
        receiver.parse(&structured, body),
        Err(HttpError::Event(EventError::VersionMismatch { .. }))
    ));
}

#[test]
fn malformed_extension_names_are_rejected() {
    let headers = headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", "1.0"),
        ("ce-trace-parent", "00-abc"),
    ]);
    assert!(matches!(
        HttpReceiver::default().parse(&headers, b""),
        Err(HttpError::Event(EventError::InvalidAttributeValue { .. }))
    ));
}

#[test]
fn binary_mode_keeps_opaque_bodies_as_bytes() {
    let headers = headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", "0.3"),
        ("content-type", "application/octet-stream"),
    ]);
    let body = [0u8, 0xff, 0x10];
    let event = HttpReceiver::default().parse(&headers, &body).unwrap();
    assert_eq!(event.spec_version(), SpecVersion::V03);
    assert_eq!(event.data(), &Data::Binary(body.to_vec()));
}

#[test]
fn binary_mode_requires_specversion() {
    let headers = headers(&[("ce-id", "1"), ("ce-source", "/s"), ("ce-type", "t")]);
    let err = HttpReceiver::default().parse(&headers, b"").unwrap_err();
    assert!(matches!(err, HttpError::MalformedMessage(_)));

    let headers = headers_with_version("9.9");
    let err = HttpReceiver::default().parse(&headers, b"").unwrap_err();
    assert!(matches!(err, HttpError::MalformedMessage(_)));
}

fn headers_with_version(version: &str) -> Headers {
    headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", version),
    ])
}

#[test]
fn binary_mode_missing_source_surfaces_the_envelope_error() {
    let headers = headers(&[("ce-id", "1"), ("ce-type", "t"), ("ce-specversion", "1.0")]);
    let err = HttpReceiver::default().parse(&headers, b"").unwrap_err();
    assert!(matches!(
        err,
        HttpError::Event(EventError::MissingRequiredAttribute("source"))
    ));
}

#[test]
fn structured_mode_round_trips_both_versions() {
    for version in [SpecVersion::V1, SpecVersion::V03] {
        let event = sample(version);
        let body = serde_json::to_vec(&event.format().unwrap()).unwrap();
        let headers = headers(&[("Content-Type", STRUCTURED_MEDIA_TYPE)]);

        let received = HttpReceiver::default().parse(&headers, &body).unwrap();
        assert_eq!(received, event);
    }
}

#[test]
fn structured_mode_decodes_data_base64() {
    let body = json!({
        "id": "1",
        "source": "/s",
        "type": "t",
        "specversion": "1.0",
        "data_base64": "SGk="
    });
    let headers = headers(&[("content-type", "application/cloudevents+json; charset=utf-8")]);
    let event = HttpReceiver::default()
        .parse(&headers, body.to_string().as_bytes())
        .unwrap();
    assert_eq!(event.data(), &Data::Binary(b"Hi".to_vec()));
}

#[test]
fn structured_mode_rejects_bad_bodies() {
    let headers = headers(&[("content-type", STRUCTURED_MEDIA_TYPE)]);
    let receiver = HttpReceiver::default();

    assert!(matches!(
        receiver.parse(&headers, b"{not json"),
        Err(HttpError::MalformedMessage(_))
    ));
    assert!(matches!(
        receiver.parse(&headers, b"[1,2]"),
        Err(HttpError::MalformedMessage(_))
    ));
    assert!(matches!(
        receiver.parse(&headers, br#"{"id":"1","source":"/s","type":"t"}"#),
        Err(HttpError::MalformedMessage(_))
    ));
    assert!(matches!(
        receiver.parse(&headers, br#"{"id":"1","source":"/s","type":"t","specversion":"2.0"}"#),
        Err(HttpError::MalformedMessage(_))
    ));
}

#[test]
fn oversized_bodies_are_rejected() {
    let receiver = HttpReceiver::new(ReceiverOptions {
        max_body_size: Some(4),
    });
    let err = receiver
        .parse(&headers_with_version("1.0"), b"too long")
        .unwrap_err();
    assert!(matches!(err, HttpError::BodyTooLarge { size: 8, max: 4 }));
}

#[test]
fn structured_emit_sets_content_type_and_canonical_body() {
    let event = sample(SpecVersion::V1);
    let message = HttpEmitter::default()
        .emit(&event, ContentMode::Structured)
        .unwrap();
    assert_eq!(
        message.headers.get("content-type"),
        Some("application/cloudevents+json; charset=utf-8")
    );

    let body = String::from_utf8(message.body).unwrap();
    assert!(body.starts_with(r#"{"data":{"items":["a","b"],"order":42},"datacontenttype""#));
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["tenant"], "acme");
    assert_eq!(parsed["specversion"], "1.0");
}

#[test]
fn structured_emit_without_charset() {
    let emitter = HttpEmitter::new(EmitterOptions { charset: None });
    let message = emitter
        .emit(&sample(SpecVersion::V1), ContentMode::Structured)
        .unwrap();
    assert_eq!(message.headers.get("Content-Type"), Some(STRUCTURED_MEDIA_TYPE));
}

#[test]
fn structured_emit_frames_binary_data() {
    let event = CloudEvent::builder()
        .source("/s")
        .ty("t")
        .data(vec![0x48, 0x69])
        .build()
        .unwrap();
    let message = HttpEmitter::default()
        .emit(&event, ContentMode::Structured)
        .unwrap();
    let parsed: Value = serde_json::from_slice(&message.body).unwrap();
    assert_eq!(parsed["data_base64"], "SGk=");
    assert!(parsed.get("data").is_none());
}

#[test]
fn binary_emit_maps_attributes_to_headers() {
    let event = sample(SpecVersion::V03);
    let message = HttpEmitter::default()
        .emit(&event, ContentMode::Binary)
        .unwrap();

    assert_eq!(message.headers.get("ce-id"), Some("evt-1"));
    assert_eq!(message.headers.get("ce-specversion"), Some("0.3"));
    assert_eq!(message.headers.get("ce-time"), Some("2024-05-01T10:00:00Z"));
    assert_eq!(message.headers.get("ce-tenant"), Some("acme"));
    assert_eq!(message.headers.get("content-type"), Some("application/json"));
    assert!(!message.headers.contains("ce-datacontenttype"));
    assert!(!message.headers.contains("ce-data"));

    let body: Value = serde_json::from_slice(&message.body).unwrap();
    assert_eq!(body, json!({"order": 42, "items": ["a", "b"]}));
}

#[test]
fn binary_emit_sends_raw_bytes_and_stringified_extensions() {
    let mut event = CloudEvent::builder()
        .source("/s")
        .ty("t")
        .data_content_type("application/octet-stream")
        .data(vec![0x00, 0x9f, 0xff])
        .build()
        .unwrap();
    event.add_extension("sequence", 7).unwrap();
    event.add_extension("sampled", true).unwrap();

    let message = HttpEmitter::default()
        .emit(&event, ContentMode::Binary)
        .unwrap();
    assert_eq!(message.body, vec![0x00, 0x9f, 0xff]);
    assert_eq!(message.headers.get("ce-sequence"), Some("7"));
    assert_eq!(message.headers.get("ce-sampled"), Some("true"));
}

#[test]
fn emit_refuses_invalid_events() {
    let mut event = sample(SpecVersion::V1);
    event.set("type", None::<String>).unwrap();

    for mode in [ContentMode::Structured, ContentMode::Binary] {
        let err = HttpEmitter::default().emit(&event, mode).unwrap_err();
        assert!(matches!(err, HttpError::Event(EventError::Validation(_))));
    }
}

#[test]
fn binary_emit_rejects_values_that_change_as_headers() {
    let emitter = HttpEmitter::default();

    let padded = CloudEvent::builder()
        .source("/s")
        .ty("t")
        .subject(" padded ")
        .build()
        .unwrap();
    assert!(matches!(
        emitter.emit(&padded, ContentMode::Binary),
        Err(HttpError::InvalidHeaderValue { name, .. }) if name == "subject"
    ));
    // Structured mode carries the value untouched.
    let message = emitter.emit(&padded, ContentMode::Structured).unwrap();
    let received = HttpReceiver::default()
        .parse(&message.headers, &message.body)
        .unwrap();
    assert_eq!(received.subject(), Some(" padded "));

    let mut split = CloudEvent::builder().source("/s").ty("t").build().unwrap();
    split.add_extension("tenant", "acme\r\nx-injected: 1").unwrap();
    assert!(matches!(
        emitter.emit(&split, ContentMode::Binary),
        Err(HttpError::InvalidHeaderValue { name, .. }) if name == "tenant"
    ));
}

#[test]
fn binary_mode_keeps_encoded_payloads_as_bytes() {
    let headers = headers(&[
        ("ce-id", "1"),
        ("ce-source", "/s"),
        ("ce-type", "t"),
        ("ce-specversion", "0.3"),
        ("ce-datacontentencoding", "base64"),
        ("content-type", "text/plain"),
    ]);
    let event = HttpReceiver::default().parse(&headers, b"SGk=").unwrap();
    // The body is the payload itself; only structured bodies are base64 framed.
    assert_eq!(event.data(), &Data::Binary(b"SGk=".to_vec()));
}

#[test]
fn emit_then_receive_is_identity() {
    let emitter = HttpEmitter::default();
    let receiver = HttpReceiver::default();

    let text = CloudEvent::builder()
        .spec_version(SpecVersion::V03)
        .source("/s")
        .ty("t")
        .data_content_type("text/plain; charset=utf-8")
        .data("hello there")
        .build()
        .unwrap();
    let bytes = CloudEvent::builder()
        .source("/s")
        .ty("t")
        .data_content_type("image/png")
        .data(vec![0x89, 0x50, 0x4e, 0x47])
        .build()
        .unwrap();

    let encoded = CloudEvent::builder()
        .spec_version(SpecVersion::V03)
        .source("/s")
        .ty("t")
        .data_content_type("text/plain")
        .data_content_encoding("base64")
        .data(vec![0x48, 0x69])
        .build()
        .unwrap();

    for event in [
        sample(SpecVersion::V1),
        sample(SpecVersion::V03),
        text,
        bytes,
        encoded,
    ] {
        for mode in [ContentMode::Structured, ContentMode::Binary] {
            let message = emitter.emit(&event, mode).unwrap();
            let received = receiver.parse(&message.headers, &message.body).unwrap();
            assert_eq!(received, event, "mode {mode:?}");
        }
    }
}
