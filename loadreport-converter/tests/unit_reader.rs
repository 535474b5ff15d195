use loadreport_common::{
    ConvertError, Location, MetricRecord, FAILED_METRIC, LATENCY_METRIC, REQUESTS_METRIC,
};
use loadreport_converter::classify::summarize;
use loadreport_converter::reader::{parse_source, read_source, Encoding};

const NDJSON: &str = r#"{"type":"Metric","data":{"name":"http_req_duration","type":"trend","contains":"time","thresholds":[],"submetrics":null},"metric":"http_req_duration"}
{"metric":"http_reqs","type":"Point","data":{"time":"2024-05-01T10:00:00Z","value":1,"tags":{"status":"200"}}}
{"metric":"http_req_duration","type":"Point","data":{"time":"2024-05-01T10:00:00Z","value":120.5,"tags":{"status":"200"}}}
{"metric":"http_req_failed","type":"Point","data":{"time":"2024-05-01T10:00:00Z","value":0,"tags":{"status":"200"}}}
"#;

#[test]
fn test_detect_encodings() {
    assert_eq!(Encoding::detect(""), Encoding::Empty);
    assert_eq!(Encoding::detect("  \n\n "), Encoding::Empty);
    assert_eq!(Encoding::detect(NDJSON), Encoding::Lines);
    assert_eq!(
        Encoding::detect(r#"{"metrics":{"http_req_duration":{"values":[1,2]}}}"#),
        Encoding::Aggregated
    );
    // A one-line file holding a single record is still line-delimited.
    assert_eq!(
        Encoding::detect(r#"{"metric":"http_reqs","type":"Point","data":{"value":1}}"#),
        Encoding::Lines
    );
}

#[test]
fn test_empty_file_is_empty_sequence() {
    assert!(parse_source("empty.json", "").unwrap().is_empty());
    assert!(parse_source("blank.json", "\n  \n").unwrap().is_empty());
}

#[test]
fn test_lines_keep_source_order() {
    let records = parse_source("smoke.json", NDJSON).unwrap();
    let metrics: Vec<&str> = records.iter().map(|r| r.metric.as_str()).collect();
    assert_eq!(
        metrics,
        vec![LATENCY_METRIC, REQUESTS_METRIC, LATENCY_METRIC, FAILED_METRIC]
    );
    assert_eq!(records[2].data.number(), Some(120.5));
}

#[test]
fn test_blank_lines_and_crlf_are_tolerated() {
    let text = concat!(
        "{\"metric\":\"http_reqs\",\"type\":\"Point\",\"data\":{\"value\":1}}\r\n",
        "\r\n",
        "{\"metric\":\"http_reqs\",\"type\":\"Point\",\"data\":{\"value\":2}}\r\n",
    );
    let records = parse_source("crlf.json", text).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].data.number(), Some(2.0));
}

#[test]
fn test_bad_line_reports_line_number() {
    let text = format!("{NDJSON}not json at all\n");
    let err = parse_source("broken.json", &text).unwrap_err();
    match err {
        ConvertError::Parse { file, location, .. } => {
            assert_eq!(file, "broken.json");
            assert!(matches!(location, Location::Line { line: 5, .. }), "got {location}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_aggregated_samples_and_counters() {
    let text = r#"{
  "metrics": {
    "http_req_duration": { "values": [30, 10, 20] },
    "http_reqs": { "values": { "count": 3, "rate": 0.5 } },
    "http_req_failed": { "values": { "rate": 0.33, "passes": 1, "fails": 2 } },
    "vus": { "values": { "value": 1, "min": 1, "max": 1 } }
  }
}"#;
    let records = parse_source("summary.json", text).unwrap();

    let durations: Vec<f64> = records
        .iter()
        .filter(|r| r.metric == LATENCY_METRIC)
        .filter_map(|r| r.data.number())
        .collect();
    assert_eq!(durations, vec![30.0, 10.0, 20.0]);
    assert!(records.iter().all(|r| r.data.time.is_none()));

    assert!(records.contains(&MetricRecord::point(REQUESTS_METRIC, 3.0, None)));
    assert!(records.contains(&MetricRecord::point(FAILED_METRIC, 1.0, None)));
    assert!(records.iter().all(|r| r.metric != "vus"));
}

#[test]
fn test_malformed_aggregated_document() {
    let text = "{\n  \"metrics\": {\n    \"http_req_duration\": { \"values\": \"fast\" }\n  }\n}";
    let err = parse_source("summary.json", text).unwrap_err();
    match err {
        ConvertError::Parse { file, location, .. } => {
            assert_eq!(file, "summary.json");
            assert_eq!(location, Location::Field("metrics.http_req_duration".to_string()));
        }
        other => panic!("expected parse error, got {other:?}"),
    }

    let syntax = "{\n  \"metrics\": {\n    \"http_reqs\": { \"values\": [1, }\n  }\n}";
    // Not a valid document, so it falls back to lines and fails on the first one.
    assert!(matches!(
        parse_source("summary.json", syntax).unwrap_err(),
        ConvertError::Parse { location: Location::Line { line: 1, .. }, .. }
    ));
}

#[test]
fn test_unrecognized_aggregated_metrics_are_skipped() {
    let text = r#"{
  "metrics": {
    "checks": { "type": "rate", "contains": "default" },
    "tags_seen": { "values": ["GET", "POST"] },
    "stage": { "values": { "current": "ramp-up" } },
    "http_req_duration": { "values": [12, 18] },
    "http_reqs": { "values": { "count": 2 } }
  }
}"#;
    let records = parse_source("summary.json", text).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.metric == LATENCY_METRIC || r.metric == REQUESTS_METRIC));

    let summary = summarize("summary", "summary.json", &records).unwrap();
    assert_eq!(summary.durations, vec![12.0, 18.0]);
    assert_eq!(summary.total_requests, 2.0);
}

#[test]
fn test_known_aggregated_metric_without_values_is_an_error() {
    let text = r#"{"metrics":{"http_reqs":{"type":"counter"}}}"#;
    let err = parse_source("summary.json", text).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Parse { location: Location::Field(ref path), .. }
            if path == "metrics.http_reqs"
    ));
}

#[test]
fn test_non_numeric_custom_points_do_not_fail_the_file() {
    let text = format!(
        "{NDJSON}{}\n{}\n",
        r#"{"metric":"checkout_stage","type":"Point","data":{"time":"2024-05-01T10:00:01Z","value":"high"}}"#,
        r#"{"metric":"region","type":"Point","data":{"time":1714557601,"value":["eu","us"]}}"#,
    );
    let records = parse_source("custom.json", &text).unwrap();
    assert_eq!(records.len(), 6);

    let summary = summarize("custom", "custom.json", &records).unwrap();
    assert_eq!(summary.durations, vec![120.5]);
    assert_eq!(summary.total_requests, 1.0);
}

#[test]
fn test_not_json_in_either_encoding() {
    let err = parse_source("garbage.json", "<html>oops</html>").unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Parse { location: Location::Line { line: 1, .. }, .. }
    ));
}

#[tokio::test]
async fn test_read_source_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smoke-test.json");
    std::fs::write(&path, NDJSON).unwrap();

    let records = read_source(&path).await.unwrap();
    assert_eq!(records.len(), 4);

    let missing = read_source(&dir.path().join("missing.json")).await.unwrap_err();
    assert!(matches!(missing, ConvertError::Io { .. }));
}
