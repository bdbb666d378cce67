use framecast::http::request::{Method, Request};

fn get(path: &str) -> Request {
    Request {
        method: Method::GET,
        path: Some(path.to_string()),
        version: Some("HTTP/1.0".to_string()),
    }
}

#[test]
fn test_method_detect() {
    assert_eq!(Method::detect("GET / HTTP/1.0"), Method::GET);
    assert_eq!(Method::detect("POST"), Method::POST);
    assert_eq!(Method::detect("POST / HTTP/1.0"), Method::UNKNOWN);
    assert_eq!(Method::detect("PUT / HTTP/1.0"), Method::UNKNOWN);
}

#[test]
fn test_method_display() {
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::POST.to_string(), "POST");
    assert_eq!(Method::UNKNOWN.to_string(), "UNKNOWN");
}

#[test]
fn test_request_serviceable() {
    assert!(get("/").is_serviceable());
    assert!(!get("").is_serviceable());
    assert!(!Request::empty().is_serviceable());

    let unknown = Request {
        method: Method::UNKNOWN,
        path: Some("/".to_string()),
        version: None,
    };
    assert!(!unknown.is_serviceable());
}

#[test]
fn test_target_strips_query_and_fragment() {
    assert_eq!(get("/camera/stream?fps=10").target().as_deref(), Some("/camera/stream"));
    assert_eq!(get("/page.html#top").target().as_deref(), Some("/page.html"));
}

#[test]
fn test_target_collapses_dot_segments() {
    assert_eq!(get("/a/../b.html").target().as_deref(), Some("/b.html"));
    assert_eq!(get("/./x/./y.txt").target().as_deref(), Some("/x/y.txt"));
    assert_eq!(get("/../../etc/passwd").target().as_deref(), Some("/etc/passwd"));
}

#[test]
fn test_target_keeps_spaces_and_non_ascii() {
    assert_eq!(get("/my file.txt").target().as_deref(), Some("/my file.txt"));
    assert_eq!(get("/my%20file.txt").target().as_deref(), Some("/my file.txt"));
    assert_eq!(get("/café.html").target().as_deref(), Some("/café.html"));
    assert_eq!(get("/caf%C3%A9.html").target().as_deref(), Some("/café.html"));
}

#[test]
fn test_target_rejects_escaped_parent_segments() {
    assert_eq!(get("/..%2F..%2Fetc/passwd").target(), None);
    assert_eq!(get("/a/..%5C..%5Csecret").target(), None);
    assert_eq!(get("/%2e%2e/secret").target().as_deref(), Some("/secret"));
}

#[test]
fn test_target_absent_for_invalid_utf8_escape() {
    assert_eq!(get("/%FF.html").target(), None);
}

#[test]
fn test_target_relative_path_is_rooted() {
    assert_eq!(get("foo.html").target().as_deref(), Some("/foo.html"));
    assert_eq!(get("/").target().as_deref(), Some("/"));
}

#[test]
fn test_target_absent_for_empty_path() {
    assert_eq!(get("").target(), None);
    assert_eq!(Request::empty().target(), None);
}

#[test]
fn test_response_version_defaults() {
    assert_eq!(get("/").response_version(), "HTTP/1.0");

    let mut req = get("/");
    req.version = Some("HTTP/1.1".to_string());
    assert_eq!(req.response_version(), "HTTP/1.1");

    req.version = Some(String::new());
    assert_eq!(req.response_version(), "HTTP/1.0");

    req.version = None;
    assert_eq!(req.response_version(), "HTTP/1.0");
}
