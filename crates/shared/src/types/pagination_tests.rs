use super::*;
use super::pagination::MAX_PER_PAGE;

fn page(page: u32, per_page: u32) -> PageRequest {
    PageRequest { page, per_page }
}

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 20);
}

#[test]
fn test_page_request_offset() {
    assert_eq!(page(1, 20).offset(), 0);
    assert_eq!(page(2, 20).offset(), 20);
    assert_eq!(page(0, 20).offset(), 0);
}

#[test]
fn test_page_request_normalized_clamps_bounds() {
    let request = page(0, 5_000).normalized();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, MAX_PER_PAGE);

    assert_eq!(page(3, 0).normalized().per_page, 1);
}

#[test]
fn test_page_request_deserializes_defaults() {
    let request: PageRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(request.page, 1);
    assert_eq!(request.limit(), 20);
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), page(1, 10), 3);

    assert_eq!(response.data, data);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 10);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_rounds_pages_up() {
    let response: PageResponse<i32> = PageResponse::new(vec![], page(1, 10), 25);
    assert_eq!(response.meta.total_pages, 3);

    let exact: PageResponse<i32> = PageResponse::new(vec![], page(1, 10), 30);
    assert_eq!(exact.meta.total_pages, 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], page(1, 10), 0);
    assert_eq!(response.meta.total_pages, 1);
}
