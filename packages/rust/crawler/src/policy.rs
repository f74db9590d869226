//! Per-response acceptance rules.
//!
//! A fetched response is only turned into a page when it succeeded, is HTML,
//! and did not redirect off the requested host (unless cross-domain redirects
//! are allowed).

use sitefetch_shared::{FetchResponse, Rejection};
use url::{Position, Url};

/// `host[:port]` of a URL, the unit of same-domain comparison.
pub fn host_key(url: &Url) -> &str {
    &url[Position::BeforeHost..Position::AfterPort]
}

/// Whether two URLs share host and port.
pub fn same_host(a: &Url, b: &Url) -> bool {
    host_key(a) == host_key(b)
}

/// Check a response for `requested` against the fetch policy.
pub fn check_response(
    requested: &Url,
    response: &FetchResponse,
    follow_domain_redirects: bool,
) -> Result<(), Rejection> {
    if !response.ok() {
        return Err(Rejection::Status {
            url: requested.to_string(),
            status: response.status,
            status_text: response.status_text().to_string(),
        });
    }

    let content_type = response.header("content-type");
    if !content_type.is_some_and(|ct| ct.contains("text/html")) {
        return Err(Rejection::NotHtml {
            url: requested.to_string(),
            content_type: content_type.map(str::to_string),
        });
    }

    if !follow_domain_redirects && !same_host(requested, &response.url) {
        return Err(Rejection::CrossDomainRedirect {
            from: host_key(requested).to_string(),
            to: host_key(&response.url).to_string(),
        });
    }

    Ok(())
}
