use super::*;

fn pagination(current_page: u32, last_page: u32) -> Pagination {
    Pagination { current_page, per_page: 10, total: 25, last_page, next_page_url: None, prev_page_url: None }
}

#[test]
fn failed_read_renders_empty_view_and_keeps_error() {
    let result: Result<Vec<u64>, GatewayError> = Err(GatewayError::rejected(500, r#"{"message": "Server Error"}"#));

    let (view, error) = view_or_empty(result, json!([])).unwrap();

    assert_eq!(view, json!([]));
    assert_eq!(error.as_ref().map(GatewayError::user_messages), Some(vec!["Server Error".to_owned()]));
}

#[test]
fn failed_banner_read_renders_null() {
    let result: Result<u64, GatewayError> = Err(GatewayError::SessionExpired);

    let (view, error) = view_or_empty(result, Value::Null).unwrap();

    assert_eq!(view, Value::Null);
    assert!(error.is_some_and(|e| e.requires_login()));
}

#[test]
fn successful_read_renders_value() {
    let (view, error) = view_or_empty(Ok(vec![1_u64, 2]), json!([])).unwrap();

    assert_eq!(view, json!([1, 2]));
    assert!(error.is_none());
}

#[test]
fn page_hint_names_neighbouring_pages() {
    assert_eq!(page_hint(&pagination(1, 3)), "page 1 of 3 (25 total); next: --page 2");
    assert_eq!(page_hint(&pagination(2, 3)), "page 2 of 3 (25 total); previous: --page 1; next: --page 3");
    assert_eq!(page_hint(&pagination(3, 3)), "page 3 of 3 (25 total); previous: --page 2");
}
