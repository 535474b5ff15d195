//! Fixture builders for the end-to-end conversion tests.

/// k6 `--out json` text: one duration point per `(ms, time)` pair, each with
/// a matching `http_reqs` point, plus `failed` failure points.
pub fn ndjson(samples: &[(f64, &str)], failed: usize) -> String {
    let mut out = String::new();
    out.push_str(
        r#"{"type":"Metric","data":{"name":"http_req_duration","type":"trend","contains":"time","thresholds":[],"submetrics":null},"metric":"http_req_duration"}"#,
    );
    out.push('\n');
    for (i, (ms, time)) in samples.iter().enumerate() {
        let failed_value = if i < failed { 1 } else { 0 };
        out.push_str(&format!(
            "{{\"metric\":\"http_reqs\",\"type\":\"Point\",\"data\":{{\"time\":\"{time}\",\"value\":1,\"tags\":{{\"method\":\"GET\"}}}}}}\n"
        ));
        out.push_str(&format!(
            "{{\"metric\":\"http_req_duration\",\"type\":\"Point\",\"data\":{{\"time\":\"{time}\",\"value\":{ms},\"tags\":{{\"method\":\"GET\"}}}}}}\n"
        ));
        out.push_str(&format!(
            "{{\"metric\":\"http_req_failed\",\"type\":\"Point\",\"data\":{{\"time\":\"{time}\",\"value\":{failed_value}}}}}\n"
        ));
        out.push_str(&format!(
            "{{\"metric\":\"vus\",\"type\":\"Point\",\"data\":{{\"time\":\"{time}\",\"value\":1}}}}\n"
        ));
    }
    out
}

/// The same samples as a pre-aggregated document (no timestamps).
pub fn aggregated(durations: &[f64], failed: usize) -> String {
    let values: Vec<String> = durations.iter().map(f64::to_string).collect();
    format!(
        r#"{{
  "metrics": {{
    "http_req_duration": {{ "values": [{}] }},
    "http_reqs": {{ "values": {{ "count": {}, "rate": 1.5 }} }},
    "http_req_failed": {{ "values": {{ "rate": 0.0, "passes": {}, "fails": 0 }} }},
    "iterations": {{ "values": {{ "count": 1 }} }}
  }}
}}"#,
        values.join(", "),
        durations.len(),
        failed
    )
}

/// Timestamps one second apart starting at 2024-05-01T10:00:00Z.
pub fn seconds(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("2024-05-01T10:00:{:02}.000Z", i % 60)).collect()
}
