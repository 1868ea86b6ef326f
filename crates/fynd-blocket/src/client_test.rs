use fynd_core::SortOrder;

use super::*;

fn test_client(base_url: &str) -> BlocketClient {
    BlocketClient::new(base_url, 5, "fynd-test/0.1", 0, 0, 20).unwrap()
}

#[test]
fn search_url_minimal() {
    let client = test_client("https://api.blocket.se");
    let url = client.search_url("iphone 13", &SearchFilters::default(), 1).unwrap();
    assert_eq!(
        url,
        "https://api.blocket.se/search_bff/v2/content?q=iphone+13&page=1&status=active"
    );
}

#[test]
fn search_url_with_filters() {
    let client = test_client("https://api.blocket.se");
    let filters = SearchFilters {
        locations: vec!["stockholm".to_string(), "uppsala".to_string()],
        category: Some("elektronik".to_string()),
        sort_order: Some(SortOrder::PublishedDesc),
    };
    let url = client.search_url("cykel", &filters, 2).unwrap();
    assert_eq!(
        url,
        "https://api.blocket.se/search_bff/v2/content?q=cykel&page=2&status=active&location=stockholm&location=uppsala&category=elektronik&sort=dat_desc"
    );
}

#[test]
fn base_url_trailing_slash_is_stripped() {
    let client = test_client("https://api.blocket.se/");
    let url = client.search_url("tv", &SearchFilters::default(), 1).unwrap();
    assert!(url.starts_with("https://api.blocket.se/search_bff/"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let client = test_client("not-a-url");
    let err = client
        .search_url("tv", &SearchFilters::default(), 1)
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidBaseUrl { .. }));
}
