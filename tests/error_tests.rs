// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use findit_client::error::{ClientError, SuggestedAction};

#[test]
fn test_transport_errors_have_fixed_user_messages() {
    let err = ClientError::Network("dns error: failed to lookup address".to_string());
    assert_eq!(
        err.user_message(),
        "Network connection error. Please check your internet connection."
    );
    assert_eq!(err.suggested_action(), SuggestedAction::CheckConnection);
    assert!(err.is_transport());
    assert!(err.is_retryable());

    let err = ClientError::Timeout("operation timed out".to_string());
    assert_eq!(
        err.user_message(),
        "Connection timed out. Server might be temporarily unavailable."
    );
    assert_eq!(err.suggested_action(), SuggestedAction::Retry);
    assert!(err.is_transport());
}

#[test]
fn test_service_and_validation_errors_pass_message_through() {
    let err = ClientError::Service("Model unavailable".to_string());
    assert_eq!(err.user_message(), "Model unavailable");
    assert!(err.is_retryable());
    assert!(!err.is_transport());

    let err = ClientError::Validation(ClientError::LOW_SIMILARITY.to_string());
    assert_eq!(err.user_message(), ClientError::LOW_SIMILARITY);
    assert_eq!(err.suggested_action(), SuggestedAction::FixInput);
    assert!(!err.is_retryable());
}

#[test]
fn test_not_found_and_persistence() {
    let err = ClientError::NotFound("Activity 42".to_string());
    assert_eq!(err.user_message(), "Activity 42 could not be found.");
    assert_eq!(err.suggested_action(), SuggestedAction::None);
    assert!(!err.is_retryable());

    let err = ClientError::Persistence("disk full".to_string());
    assert_eq!(err.suggested_action(), SuggestedAction::Retry);
    assert_eq!(err.to_string(), "Storage error: disk full");
}
