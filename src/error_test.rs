use super::*;

#[test]
fn error_codes_are_stable() {
    let load = MapError::Load { uri: "floors/A.svg".into(), reason: "404 Not Found".into() };
    assert_eq!(load.error_code(), "E_LOAD");
    assert_eq!(MapError::Parse("x".into()).error_code(), "E_PARSE");
    assert_eq!(MapError::InvalidPath("x".into()).error_code(), "E_INVALID_PATH");
    assert_eq!(MapError::Dimension("x".into()).error_code(), "E_DIMENSION");
    assert_eq!(MapError::Http("x".into()).error_code(), "E_HTTP");
    assert_eq!(MapError::Config("x".into()).error_code(), "E_CONFIG");
}

#[test]
fn only_transport_errors_are_retryable() {
    assert!(MapError::Load { uri: String::new(), reason: String::new() }.retryable());
    assert!(MapError::Http("timeout".into()).retryable());
    assert!(!MapError::Parse("bad".into()).retryable());
    assert!(!MapError::InvalidPath("bad".into()).retryable());
    assert!(!MapError::Dimension("bad".into()).retryable());
}

#[test]
fn invalid_path_displays_bare_message() {
    let err = MapError::InvalidPath("Start and end locations cannot be the same.".into());
    assert_eq!(err.to_string(), "Start and end locations cannot be the same.");
}

#[test]
fn load_error_mentions_uri() {
    let err = MapError::Load { uri: "http://host/Floor_C.svg".into(), reason: "status 500".into() };
    let msg = err.to_string();
    assert!(msg.contains("Floor_C.svg"));
    assert!(msg.contains("status 500"));
}
