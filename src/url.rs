use std::{borrow::Cow, fmt};

use http::Uri;

/// A decoded application-relative URL: path segments plus ordered query
/// parameters.
///
/// Segments and parameter names/values are stored percent-decoded. The
/// [`Display`](fmt::Display) impl renders the canonical encoded form without a
/// leading slash, e.g. `some/mount/path?15&a=b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    segments: Vec<String>,
    query: Vec<QueryParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    pub name: String,
    pub value: String,
}

impl QueryParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Url {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    /// Parses `path[?query]`.
    ///
    /// A single leading slash is ignored and trailing slashes are trimmed, so
    /// `/a/b/`, `a/b` and `/a/b` all yield the segments `["a", "b"]`. Empty
    /// segments in the middle of the path are kept.
    pub fn parse(input: &str) -> Self {
        let (path, query) = match input.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (input, None),
        };

        let mut url = Self::new();
        url.segments = parse_path(path);
        if let Some(query) = query {
            url.query = parse_query(query);
        }
        url
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query_parameters(&self) -> &[QueryParameter] {
        &self.query
    }

    pub fn query_parameters_mut(&mut self) -> &mut Vec<QueryParameter> {
        &mut self.query
    }

    pub fn push_segment(&mut self, segment: impl Into<String>) -> &mut Self {
        self.segments.push(segment.into());
        self
    }

    pub fn add_query_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.query.push(QueryParameter::new(name, value));
        self
    }

    /// Value of the first query parameter called `name`.
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Appends the segments and query parameters of `other`.
    pub fn append(&mut self, other: Url) {
        self.segments.extend(other.segments);
        self.query.extend(other.query);
    }

    /// A copy of this URL without its first `count` segments.
    pub(crate) fn skip_segments(&self, count: usize) -> Url {
        Url {
            segments: self.segments.iter().skip(count).cloned().collect(),
            query: self.query.clone(),
        }
    }
}

impl From<&Uri> for Url {
    fn from(uri: &Uri) -> Self {
        let mut url = Self::new();
        url.segments = parse_path(uri.path());
        if let Some(query) = uri.query() {
            url.query = parse_query(query);
        }
        url
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&urlencoding::encode(segment))?;
        }

        for (i, parameter) in self.query.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            f.write_str(&urlencoding::encode(&parameter.name))?;
            if !parameter.value.is_empty() {
                write!(f, "={}", urlencoding::encode(&parameter.value))?;
            }
        }

        Ok(())
    }
}

fn parse_path(path: &str) -> Vec<String> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return Vec::new();
    }
    path.split('/').map(|s| decode(s).into_owned()).collect()
}

fn parse_query(query: &str) -> Vec<QueryParameter> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            QueryParameter::new(decode_query(name), decode_query(value))
        })
        .collect()
}

fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

fn decode_query(raw: &str) -> String {
    if raw.contains('+') {
        decode(&raw.replace('+', " ")).into_owned()
    } else {
        decode(raw).into_owned()
    }
}
