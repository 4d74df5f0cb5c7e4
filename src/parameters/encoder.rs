use crate::url::Url;

use super::PageParameters;

/// Converts between [`PageParameters`] and the part of a URL that follows
/// the segments a mapper owns.
///
/// Mappers strip their own leading segments and the page reference token
/// before calling [`decode`](Self::decode); the [`Url`] returned by
/// [`encode`](Self::encode) is appended to the mapper's segments.
pub trait ParametersEncoder: Send + Sync + 'static {
    fn decode(&self, url: &Url) -> PageParameters;

    fn encode(&self, parameters: &PageParameters) -> Url;
}

/// Indexed parameters as trailing segments, named ones as `key=value`
/// query parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryParametersEncoder;

impl ParametersEncoder for QueryParametersEncoder {
    fn decode(&self, url: &Url) -> PageParameters {
        let mut parameters = PageParameters::new();
        for segment in url.segments() {
            parameters.push_indexed(segment.clone());
        }
        for parameter in url.query_parameters() {
            if !parameter.name.is_empty() {
                parameters.add(parameter.name.clone(), parameter.value.clone());
            }
        }
        parameters
    }

    fn encode(&self, parameters: &PageParameters) -> Url {
        let mut url = Url::from_segments(parameters.indexed().iter().cloned());
        for pair in parameters.all_named() {
            url.add_query_parameter(pair.key.clone(), pair.value.clone());
        }
        url
    }
}

/// Named parameters as `/key/value` segment pairs.
///
/// Indexed parameters have no representation in this form and are dropped
/// on encode. Query parameters are still accepted on decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathParametersEncoder;

impl ParametersEncoder for PathParametersEncoder {
    fn decode(&self, url: &Url) -> PageParameters {
        let mut parameters = PageParameters::new();

        let mut segments = url.segments().iter();
        while let Some(key) = segments.next() {
            let value = segments.next().map(String::as_str).unwrap_or_default();
            if !key.is_empty() {
                parameters.add(key.clone(), value);
            }
        }

        for parameter in url.query_parameters() {
            if !parameter.name.is_empty() {
                parameters.add(parameter.name.clone(), parameter.value.clone());
            }
        }

        parameters
    }

    fn encode(&self, parameters: &PageParameters) -> Url {
        let mut url = Url::new();
        for pair in parameters.all_named() {
            url.push_segment(pair.key.clone())
                .push_segment(pair.value.clone());
        }
        url
    }
}
