use reqwest::{ Client, RequestBuilder };
use url::{ form_urlencoded, Url };

pub const DEFAULT_PRIMARY_PROXY: &str = "https://cors-anywhere.herokuapp.com/";
pub const DEFAULT_FALLBACK_PROXY: &str = "https://api.allorigins.win/raw?url=";

/// One routing path to the flight-search API.
pub trait ProxyStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn request_url(&self, target: &Url) -> String;

    fn headers(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    fn build_request(&self, http: &Client, target: &Url) -> RequestBuilder {
        let mut req = http.get(self.request_url(target));
        for (name, value) in self.headers() {
            req = req.header(name, value);
        }
        req
    }
}

/// Prefix proxy: the raw target URL is appended to the proxy base.
pub struct CorsAnywhereProxy {
    base_url: String,
}

impl CorsAnywhereProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for CorsAnywhereProxy {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_PROXY)
    }
}

impl ProxyStrategy for CorsAnywhereProxy {
    fn name(&self) -> &str {
        "cors-anywhere"
    }

    fn request_url(&self, target: &Url) -> String {
        format!("{}{}", self.base_url, target)
    }

    fn headers(&self) -> Vec<(&'static str, &'static str)> {
        vec![("X-Requested-With", "XMLHttpRequest")]
    }
}

/// Query proxy: the target URL travels percent-encoded in the proxy's query.
pub struct AllOriginsProxy {
    base_url: String,
}

impl AllOriginsProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for AllOriginsProxy {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_PROXY)
    }
}

impl ProxyStrategy for AllOriginsProxy {
    fn name(&self) -> &str {
        "allorigins"
    }

    fn request_url(&self, target: &Url) -> String {
        let encoded: String = form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
        format!("{}{}", self.base_url, encoded)
    }
}

/// No proxy at all, for a backend that can reach the API itself.
#[derive(Default)]
pub struct DirectStrategy;

impl ProxyStrategy for DirectStrategy {
    fn name(&self) -> &str {
        "direct"
    }

    fn request_url(&self, target: &Url) -> String {
        target.to_string()
    }
}
