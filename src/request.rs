use crate::url::Url;

/// An incoming request as seen by mappers: only its application-relative URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    url: Url,
}

impl Request {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Shorthand for `Request::new(Url::parse(path))`.
    pub fn parse(path: &str) -> Self {
        Self::new(Url::parse(path))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl<B> From<&http::Request<B>> for Request {
    fn from(request: &http::Request<B>) -> Self {
        Self::new(Url::from(request.uri()))
    }
}

impl std::ops::Deref for Request {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.url
    }
}
