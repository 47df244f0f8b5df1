use suite_core::errors::{AggregateFailure, ErrorInfo, SuiteError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("case", "power-0001")
        .with_context("reason", "example")
}

#[test]
fn configuration_error_surface() {
    let err = SuiteError::Configuration(sample_info("C001", "builder already built"));
    assert_eq!(err.info().code, "C001");
    assert_eq!(err.family(), "configuration");
    assert!(err.info().context.contains_key("case"));
}

#[test]
fn lookup_error_names_element() {
    let err = SuiteError::lookup("block", "fuel");
    assert_eq!(err.info().code, "missing-block");
    assert_eq!(err.info().context.get("block").map(String::as_str), Some("fuel"));
    assert!(err.to_string().contains("`fuel`"));
}

#[test]
fn io_error_surface() {
    let err = SuiteError::Io(sample_info("IO01", "permission denied"));
    assert_eq!(err.family(), "io");
    assert!(err.to_string().starts_with("io error:"));
}

#[test]
fn aggregate_lists_every_case() {
    let failures = vec![
        SuiteError::Io(sample_info("IO01", "disk full")).into_case_failure("power-0001"),
        SuiteError::lookup("block", "fuel").into_case_failure("power-0003"),
    ];
    let err = SuiteError::Aggregate(AggregateFailure::new("write-inputs", "write inputs", failures));
    let SuiteError::Aggregate(aggregate) = &err else {
        panic!("expected aggregate");
    };
    assert_eq!(aggregate.case_names(), vec!["power-0001", "power-0003"]);
    assert_eq!(aggregate.failures[1].family, "lookup");
    assert_eq!(err.info().context["cases"], "power-0001, power-0003");
    let rendered = err.to_string();
    assert!(rendered.contains("power-0001 [io]"));
    assert!(rendered.contains("power-0003 [lookup]"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = SuiteError::Configuration(sample_info("C002", "empty degree of freedom"));
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"family\":\"Configuration\""));
    let restored: SuiteError = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, err);
}
