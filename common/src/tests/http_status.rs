use crate::HttpStatusCode;

/// **VALUE**: Verifies the status family predicates used when reading upstream responses.
///
/// **WHY THIS MATTERS**: A wrong range would let an error page through as a success,
/// or log client mistakes as upstream outages.
///
/// **BUG THIS CATCHES**: Off-by-one range bounds (e.g. 300 counted as success).
#[test]
fn given_status_codes_when_checking_family_then_ranges_are_exclusive() {
    assert!(HttpStatusCode(200).is_success());
    assert!(HttpStatusCode(299).is_success());
    assert!(!HttpStatusCode(300).is_success());

    assert!(!HttpStatusCode::UNAUTHORIZED.is_server_error());
    assert!(!HttpStatusCode(499).is_server_error());
    assert!(HttpStatusCode(500).is_server_error());
    assert!(!HttpStatusCode::TOO_MANY_REQUESTS.is_server_error());
}

#[test]
fn given_status_code_when_displayed_then_prints_bare_number() {
    assert_eq!(HttpStatusCode::from(404).to_string(), "404");
    assert_eq!(HttpStatusCode::from(404), HttpStatusCode::NOT_FOUND);
}
