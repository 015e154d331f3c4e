//! Retry and fallback decisions, free of I/O.
//!
//! The client's control flow is a small state machine over the request
//! mode and the class of the last failure. Keeping the transitions as
//! pure functions lets the protocol be tested without a network.

use rates_types::ProviderErrorDetail;
use reqwest::StatusCode;

/// Provider error code for an exhausted request quota.
pub const ERROR_CODE_RATE_LIMIT: u32 = 104;
/// Provider error code for a plan that forbids the `base` parameter.
pub const ERROR_CODE_BASE_RESTRICTED: u32 = 105;

/// Shape of the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Explicit base currency and symbol list.
    Full,
    /// Access key only; the provider picks its fixed base.
    Restricted,
}

/// What a failed attempt tells us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying: network trouble, server errors, rate limiting.
    Transient,
    /// The credential's plan forbids the full request shape.
    PlanRestricted,
    /// Retrying the same request cannot help.
    Fatal,
}

/// What to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Back off, then send the same request again.
    Retry,
    /// Remember the key as restricted and re-send immediately in
    /// restricted mode; does not consume retry budget.
    SwitchToRestricted,
    GiveUp,
}

/// Classifies a failed attempt from its HTTP status and parsed error body.
///
/// The provider's own error code wins over the HTTP status when both are
/// present. `status == None` means the request never produced a response
/// (connect failure, timeout). A 2xx status here means the body carried
/// `success: false` without a recognized error code, which the provider
/// is known to do transiently.
pub fn classify(status: Option<StatusCode>, error: Option<&ProviderErrorDetail>) -> ErrorClass {
    if let Some(detail) = error {
        match detail.code {
            ERROR_CODE_BASE_RESTRICTED => return ErrorClass::PlanRestricted,
            ERROR_CODE_RATE_LIMIT => return ErrorClass::Transient,
            _ => {}
        }
    }

    match status {
        None => ErrorClass::Transient,
        Some(StatusCode::TOO_MANY_REQUESTS) => ErrorClass::Transient,
        Some(s) if s.is_server_error() => ErrorClass::Transient,
        Some(s) if s.is_client_error() => ErrorClass::Fatal,
        Some(_) => ErrorClass::Transient,
    }
}

/// Picks the next step given the current mode and remaining retry budget.
///
/// A plan restriction triggers the mode switch exactly once: hitting it
/// again while already restricted is terminal, so a single top-level call
/// can never loop on fallbacks.
pub fn next_step(mode: FetchMode, class: ErrorClass, retries_left: u32) -> Step {
    match (class, mode) {
        (ErrorClass::PlanRestricted, FetchMode::Full) => Step::SwitchToRestricted,
        (ErrorClass::PlanRestricted, FetchMode::Restricted) => Step::GiveUp,
        (ErrorClass::Transient, _) if retries_left > 0 => Step::Retry,
        (ErrorClass::Transient, _) => Step::GiveUp,
        (ErrorClass::Fatal, _) => Step::GiveUp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(code: u32) -> ProviderErrorDetail {
        ProviderErrorDetail {
            code,
            kind: "test".into(),
            info: None,
        }
    }

    #[test]
    fn test_classify_network_failure_is_transient() {
        assert_eq!(classify(None, None), ErrorClass::Transient);
    }

    #[test]
    fn test_classify_server_errors_are_transient() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert_eq!(classify(Some(status), None), ErrorClass::Transient);
        }
    }

    #[test]
    fn test_classify_429_is_transient() {
        assert_eq!(
            classify(Some(StatusCode::TOO_MANY_REQUESTS), None),
            ErrorClass::Transient
        );
    }

    #[test]
    fn test_classify_other_client_errors_are_fatal() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
        ] {
            assert_eq!(classify(Some(status), None), ErrorClass::Fatal);
        }
    }

    #[test]
    fn test_classify_error_code_wins_over_status() {
        // Rate-limit code on a 400 is still retryable.
        assert_eq!(
            classify(Some(StatusCode::BAD_REQUEST), Some(&detail(ERROR_CODE_RATE_LIMIT))),
            ErrorClass::Transient
        );
        assert_eq!(
            classify(
                Some(StatusCode::BAD_REQUEST),
                Some(&detail(ERROR_CODE_BASE_RESTRICTED))
            ),
            ErrorClass::PlanRestricted
        );
    }

    #[test]
    fn test_classify_unknown_code_falls_back_to_status() {
        assert_eq!(
            classify(Some(StatusCode::BAD_REQUEST), Some(&detail(201))),
            ErrorClass::Fatal
        );
        assert_eq!(
            classify(Some(StatusCode::OK), Some(&detail(201))),
            ErrorClass::Transient
        );
    }

    #[test]
    fn test_unsuccessful_2xx_body_is_transient() {
        assert_eq!(classify(Some(StatusCode::OK), None), ErrorClass::Transient);
    }

    #[test]
    fn test_restriction_switches_mode_only_from_full() {
        assert_eq!(
            next_step(FetchMode::Full, ErrorClass::PlanRestricted, 3),
            Step::SwitchToRestricted
        );
        assert_eq!(
            next_step(FetchMode::Restricted, ErrorClass::PlanRestricted, 3),
            Step::GiveUp
        );
    }

    #[test]
    fn test_transient_retries_until_budget_exhausted() {
        assert_eq!(next_step(FetchMode::Full, ErrorClass::Transient, 2), Step::Retry);
        assert_eq!(
            next_step(FetchMode::Restricted, ErrorClass::Transient, 1),
            Step::Retry
        );
        assert_eq!(next_step(FetchMode::Full, ErrorClass::Transient, 0), Step::GiveUp);
    }

    #[test]
    fn test_fatal_never_retries() {
        assert_eq!(next_step(FetchMode::Full, ErrorClass::Fatal, 3), Step::GiveUp);
        assert_eq!(next_step(FetchMode::Restricted, ErrorClass::Fatal, 3), Step::GiveUp);
    }
}
