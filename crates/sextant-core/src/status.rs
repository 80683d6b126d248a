//! HTTP status registry.
//!
//! A fixed table of status codes and reason phrases. Codes outside the table
//! are rejected by [`Response::set_status`](crate::Response::set_status) and
//! treated as a handler contract violation during dispatch.

use http::StatusCode;

/// Registered status codes and their reason phrases, sorted by code.
static STATUS_TABLE: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Request Entity Too Large"),
    (414, "Request-URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Requested Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Entity"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (451, "Unavailable For Legal Reasons"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
];

/// Returns the reason phrase for a registered status code.
///
/// ```rust
/// use sextant_core::status::reason_phrase;
///
/// assert_eq!(reason_phrase(404), Some("Not Found"));
/// assert_eq!(reason_phrase(418), Some("I'm a teapot"));
/// assert_eq!(reason_phrase(299), None);
/// ```
#[must_use]
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    STATUS_TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| STATUS_TABLE[idx].1)
}

/// Returns true if the code is in the registry.
#[must_use]
pub fn is_registered(code: u16) -> bool {
    reason_phrase(code).is_some()
}

/// Formats the status line `"{code} {reason}"` for a registered code.
#[must_use]
pub fn status_line(code: u16) -> Option<String> {
    reason_phrase(code).map(|reason| format!("{code} {reason}"))
}

/// Converts a registered code into an [`http::StatusCode`].
#[must_use]
pub fn registered(code: u16) -> Option<StatusCode> {
    if is_registered(code) {
        StatusCode::from_u16(code).ok()
    } else {
        None
    }
}

/// Iterates the registry in ascending code order.
pub fn iter() -> impl Iterator<Item = (u16, &'static str)> {
    STATUS_TABLE.iter().copied()
}
