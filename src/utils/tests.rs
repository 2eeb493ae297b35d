use super::error::{AuthError, BusError};
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
}

#[test]
fn parse_level_falls_back_to_info() {
    assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
    assert_eq!(logging::parse_level("trace"), tracing::Level::TRACE);
    assert_eq!(logging::parse_level("loud"), tracing::Level::INFO);
}

#[test]
fn errors_render_their_context() {
    let err = BusError::Malformed {
        topic: "appMessages".to_string(),
        reason: "expected value".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "malformed payload on topic 'appMessages': expected value"
    );
    assert_eq!(
        AuthError::Rejected("invalid credentials".to_string()).to_string(),
        "sign-in rejected: invalid credentials"
    );
}
