use loadreport_common::{is_known_metric, MetricRecord, SampleData, LATENCY_METRIC, POINT_TYPE};
use serde_json::json;

#[test]
fn test_record_from_k6_line() {
    let line = r#"{"metric":"http_req_duration","type":"Point","data":{"time":"2024-05-01T10:00:00.123+02:00","value":87.5,"tags":{"status":"200"}}}"#;
    let record: MetricRecord = serde_json::from_str(line).unwrap();
    assert_eq!(record.metric, LATENCY_METRIC);
    assert_eq!(record.kind, POINT_TYPE);
    assert_eq!(record.data.number(), Some(87.5));
    assert_eq!(record.data.time, Some(json!("2024-05-01T10:00:00.123+02:00")));
}

#[test]
fn test_record_without_time() {
    let json = r#"{"metric":"http_reqs","type":"Point","data":{"value":1}}"#;
    let record: MetricRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.data, SampleData { value: Some(json!(1)), time: None });
}

#[test]
fn test_point_constructor_matches_decoded_record() {
    let json = r#"{"metric":"http_req_duration","type":"Point","data":{"value":12.0,"time":"2024-01-01T00:00:00Z"}}"#;
    let decoded: MetricRecord = serde_json::from_str(json).unwrap();
    let built = MetricRecord::point(LATENCY_METRIC, 12.0, Some("2024-01-01T00:00:00Z"));
    assert_eq!(decoded, built);
}

#[test]
fn test_metric_declaration_line_decodes_without_value() {
    let json = r#"{"type":"Metric","data":{"name":"http_reqs","type":"counter","contains":"default","thresholds":[],"submetrics":null},"metric":"http_reqs"}"#;
    let record: MetricRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.kind, "Metric");
    assert_eq!(record.data, SampleData { value: None, time: None });
}

#[test]
fn test_record_missing_metric_is_rejected() {
    let json = r#"{"type":"Point","data":{"value":1}}"#;
    assert!(serde_json::from_str::<MetricRecord>(json).is_err());
}

#[test]
fn test_custom_metric_payloads_decode_as_is() {
    let text = r#"{"metric":"checkout_stage","type":"Point","data":{"time":1714557600,"value":"high"}}"#;
    let record: MetricRecord = serde_json::from_str(text).unwrap();
    assert_eq!(record.data.value, Some(json!("high")));
    assert_eq!(record.data.number(), None);

    let bare = r#"{"metric":"vus","type":"Point"}"#;
    let record: MetricRecord = serde_json::from_str(bare).unwrap();
    assert_eq!(record.data, SampleData::default());
}

#[test]
fn test_known_metric_names() {
    for name in ["http_req_duration", "http_reqs", "http_req_failed"] {
        assert!(is_known_metric(name), "{name}");
    }
    assert!(!is_known_metric("vus"));
    assert!(!is_known_metric("http_req_waiting"));
}
