use crate::{
    codec::Document,
    serialize::{
        SerializeError, SerializeErrorKind, from_cbor_bounded, from_json_bounded, to_cbor, to_json,
    },
};
use std::collections::BTreeMap;

fn sample() -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("kind".to_string(), Document::from("Constant"));
    fields.insert("type".to_string(), Document::from("Int"));
    fields.insert("value".to_string(), Document::Int(-7));
    fields.insert(
        "items".to_string(),
        Document::List(vec![Document::Bool(true), Document::Null, Document::Float(1.5)]),
    );

    Document::Record(fields)
}

#[test]
fn cbor_carries_a_document() {
    let bytes = to_cbor(&sample()).expect("serialize");
    let back: Document = from_cbor_bounded(&bytes, 1024).expect("deserialize");

    assert_eq!(back, sample());
}

#[test]
fn json_carries_a_document() {
    let text = to_json(&sample()).expect("serialize");
    let back: Document = from_json_bounded(&text, 1024).expect("deserialize");

    assert_eq!(back, sample());
}

#[test]
fn oversized_input_is_rejected_before_parsing() {
    let bytes = to_cbor(&sample()).expect("serialize");
    let err = from_cbor_bounded::<Document>(&bytes, 4).expect_err("limit");

    assert_eq!(err.kind(), SerializeErrorKind::DeserializeSizeLimitExceeded);
    assert_eq!(
        err,
        SerializeError::DeserializeSizeLimitExceeded {
            len: bytes.len(),
            max_bytes: 4
        }
    );

    let err = from_json_bounded::<Document>("[1,2,3]", 3).expect_err("limit");
    assert_eq!(err.kind(), SerializeErrorKind::DeserializeSizeLimitExceeded);
}

#[test]
fn garbage_is_a_deserialize_error() {
    let err = from_cbor_bounded::<Document>(&[0xff, 0x00, 0x13], 1024).expect_err("garbage");
    assert_eq!(err.kind().as_str(), "deserialize");

    let err = from_json_bounded::<Document>("{\"kind\":", 1024).expect_err("truncated");
    assert_eq!(err.kind(), SerializeErrorKind::Deserialize);
}
