//! Redirect URL construction.

use url::form_urlencoded;

/// Builds the authentication-server login redirect URL for an
/// unauthenticated request.
///
/// The service URL is percent-encoded into the configured service
/// parameter; `renew` and `gateway` are appended only when set.
#[must_use]
pub fn login_redirect_url(
    login_url: &str,
    service_parameter: &str,
    service_url: &str,
    renew: bool,
    gateway: bool,
) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    let encoded: String = form_urlencoded::byte_serialize(service_url.as_bytes()).collect();

    let mut url = format!("{login_url}{separator}{service_parameter}={encoded}");
    if renew {
        url.push_str("&renew=true");
    }
    if gateway {
        url.push_str("&gateway=true");
    }
    url
}

/// Builds the front-channel logout continuation URL.
///
/// After invalidating the local session, the browser is sent back to the
/// authentication server's logout flow with the relay state attached so
/// the server can resume notifying other applications.
#[must_use]
pub fn logout_continuation_url(logout_url: &str, relay_state: &str) -> String {
    let separator = if logout_url.contains('?') { '&' } else { '?' };
    let encoded: String = form_urlencoded::byte_serialize(relay_state.as_bytes()).collect();
    format!("{logout_url}{separator}_eventId=next&RelayState={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_url() {
        let url = login_redirect_url(
            "https://cas.example.com/cas/login",
            "service",
            "https://app.example.com/?page=1",
            false,
            false,
        );
        assert_eq!(
            url,
            "https://cas.example.com/cas/login?service=https%3A%2F%2Fapp.example.com%2F%3Fpage%3D1"
        );
    }

    #[test]
    fn test_login_redirect_url_flags() {
        let url = login_redirect_url(
            "https://cas.example.com/cas/login",
            "service",
            "https://app.example.com/",
            true,
            true,
        );
        assert!(url.ends_with("&renew=true&gateway=true"));
    }

    #[test]
    fn test_login_redirect_url_existing_query() {
        let url = login_redirect_url(
            "https://cas.example.com/cas/login?locale=en",
            "service",
            "https://app.example.com/",
            false,
            false,
        );
        assert!(url.starts_with("https://cas.example.com/cas/login?locale=en&service="));
    }

    #[test]
    fn test_logout_continuation_url() {
        let url = logout_continuation_url("https://cas.example.com/cas/logout", "e1s1");
        assert_eq!(
            url,
            "https://cas.example.com/cas/logout?_eventId=next&RelayState=e1s1"
        );
    }
}
