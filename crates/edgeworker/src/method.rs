use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The HTTP methods a worker can receive or send.
///
/// Each variant has exactly one textual form, the uppercase verb as the
/// host puts it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    /// Parse the wire form. Matching is exact: `get` is not `GET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnknownMethod(s.to_string()))
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = Error;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_round_trips() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>().unwrap(), method);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(matches!(
            "get".parse::<HttpMethod>(),
            Err(Error::UnknownMethod(m)) if m == "get"
        ));
    }

    #[test]
    fn parse_rejects_methods_outside_the_set() {
        for verb in ["HEAD", "TRACE", "CONNECT", ""] {
            assert!(verb.parse::<HttpMethod>().is_err(), "{verb} should be rejected");
        }
    }

    #[test]
    fn converts_to_and_from_http_method() {
        let method: http::Method = HttpMethod::Patch.into();
        assert_eq!(method, http::Method::PATCH);
        assert_eq!(HttpMethod::try_from(&method).unwrap(), HttpMethod::Patch);
        assert!(HttpMethod::try_from(&http::Method::HEAD).is_err());
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
