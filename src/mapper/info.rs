//! Page reference tokens.
//!
//! A token travels as the name of the first query parameter, with no value:
//!
//! ```text
//! token     : page-id ( '-' component )?
//! component : ( render-count '.' )? listener ( '.' behavior )? '-' path
//! page-id   : DIGIT+
//! listener  : ( ALPHA | '_' | '$' ) ( ALPHA | DIGIT | '_' | '$' )*
//! path      : component path, ':' written as '-' and '-' written as '~'
//! ```
//!
//! `15` references page instance 15, `15-5.ILinkListener.4-foo-bar` invokes
//! listener `ILinkListener` of behavior 4 on component `foo:bar` of that page
//! as rendered the fifth time.

use std::fmt::Write;

use crate::url::Url;

const SEPARATOR: char = '-';
const SEPARATOR_ENCODED: char = '~';
const COMPONENT_SEPARATOR: char = ':';
const INDEX_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub page_id: Option<u32>,
}

impl PageInfo {
    pub fn new(page_id: Option<u32>) -> Self {
        Self { page_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub render_count: Option<u32>,
    pub listener: String,
    pub behavior_index: Option<u32>,
    /// `:`-separated path of the component within its page.
    pub component_path: String,
}

impl ComponentInfo {
    pub fn new(listener: impl Into<String>, component_path: impl Into<String>) -> Self {
        Self {
            render_count: None,
            listener: listener.into(),
            behavior_index: None,
            component_path: component_path.into(),
        }
    }

    pub fn with_render_count(mut self, render_count: Option<u32>) -> Self {
        self.render_count = render_count;
        self
    }

    pub fn with_behavior_index(mut self, behavior_index: Option<u32>) -> Self {
        self.behavior_index = behavior_index;
        self
    }

    fn encode(&self, out: &mut String) -> Option<()> {
        if !is_listener_name(&self.listener)
            || self.component_path.is_empty()
            || self.component_path.contains(SEPARATOR_ENCODED)
        {
            return None;
        }

        if let Some(render_count) = self.render_count {
            write!(out, "{render_count}{INDEX_SEPARATOR}").ok()?;
        }
        out.push_str(&self.listener);
        if let Some(behavior_index) = self.behavior_index {
            write!(out, "{INDEX_SEPARATOR}{behavior_index}").ok()?;
        }
        out.push(SEPARATOR);
        out.extend(self.component_path.chars().map(|c| match c {
            COMPONENT_SEPARATOR => SEPARATOR,
            SEPARATOR => SEPARATOR_ENCODED,
            c => c,
        }));

        Some(())
    }

    fn decode(s: &str) -> Option<Self> {
        let (head, path) = s.split_once(SEPARATOR)?;
        if path.is_empty() {
            return None;
        }

        let fields: Vec<&str> = head.split(INDEX_SEPARATOR).collect();
        let (render_count, listener, behavior_index) = match fields.as_slice() {
            [listener] => (None, *listener, None),
            [first, second] => match parse_number(first) {
                Some(render_count) => (Some(render_count), *second, None),
                None => (None, *first, Some(parse_number(second)?)),
            },
            [render_count, listener, behavior_index] => (
                Some(parse_number(render_count)?),
                *listener,
                Some(parse_number(behavior_index)?),
            ),
            _ => return None,
        };

        if !is_listener_name(listener) {
            return None;
        }

        let component_path = path
            .chars()
            .map(|c| match c {
                SEPARATOR => COMPONENT_SEPARATOR,
                SEPARATOR_ENCODED => SEPARATOR,
                c => c,
            })
            .collect();

        Some(Self {
            render_count,
            listener: listener.to_owned(),
            behavior_index,
            component_path,
        })
    }
}

/// Page instance and optional component/listener reference carried by a
/// request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageComponentInfo {
    pub page_info: PageInfo,
    pub component_info: Option<ComponentInfo>,
}

impl PageComponentInfo {
    pub fn new(page_info: PageInfo, component_info: Option<ComponentInfo>) -> Self {
        Self {
            page_info,
            component_info,
        }
    }

    pub fn page_id(&self) -> Option<u32> {
        self.page_info.page_id
    }

    /// Token text, or [`None`] when there is nothing to carry.
    ///
    /// A token always starts with the page id: without one neither a hybrid
    /// nor a listener reference can be expressed.
    pub fn encode(&self) -> Option<String> {
        let page_id = self.page_info.page_id?;

        let mut out = page_id.to_string();
        if let Some(component_info) = &self.component_info {
            out.push(SEPARATOR);
            component_info.encode(&mut out)?;
        }
        Some(out)
    }

    /// Parses a token. Anything that does not start with a page id, or whose
    /// component part is malformed, yields [`None`].
    pub fn decode(s: &str) -> Option<Self> {
        let (page, component) = match s.split_once(SEPARATOR) {
            Some((page, component)) => (page, Some(component)),
            None => (s, None),
        };

        let page_info = PageInfo::new(Some(parse_number(page)?));
        let component_info = match component {
            Some(component) => Some(ComponentInfo::decode(component)?),
            None => None,
        };

        Some(Self::new(page_info, component_info))
    }

    /// Reads the token from the first query parameter of `url`, if that
    /// parameter has an empty value.
    pub fn from_url(url: &Url) -> Option<Self> {
        let first = url.query_parameters().first()?;
        if !first.value.is_empty() {
            return None;
        }
        Self::decode(&first.name)
    }

    /// Inserts the token as the first query parameter of `url`.
    pub fn write_to(&self, url: &mut Url) {
        if let Some(token) = self.encode() {
            url.query_parameters_mut()
                .insert(0, crate::url::QueryParameter::new(token, ""));
        }
    }
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

pub(crate) fn is_listener_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '$'))
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listener(
        page_id: u32,
        render_count: Option<u32>,
        behavior_index: Option<u32>,
    ) -> PageComponentInfo {
        PageComponentInfo::new(
            PageInfo::new(Some(page_id)),
            Some(
                ComponentInfo::new("ILinkListener", "foo:bar")
                    .with_render_count(render_count)
                    .with_behavior_index(behavior_index),
            ),
        )
    }

    #[test]
    fn encode_page_only() {
        let info = PageComponentInfo::new(PageInfo::new(Some(15)), None);
        assert_eq!(info.encode().as_deref(), Some("15"));
    }

    #[test]
    fn encode_nothing_without_page_id() {
        assert_eq!(PageComponentInfo::default().encode(), None);
    }

    #[test]
    fn encode_listener_variants() {
        assert_eq!(
            listener(15, None, None).encode().as_deref(),
            Some("15-ILinkListener-foo-bar")
        );
        assert_eq!(
            listener(15, None, Some(4)).encode().as_deref(),
            Some("15-ILinkListener.4-foo-bar")
        );
        assert_eq!(
            listener(15, Some(5), None).encode().as_deref(),
            Some("15-5.ILinkListener-foo-bar")
        );
        assert_eq!(
            listener(15, Some(5), Some(4)).encode().as_deref(),
            Some("15-5.ILinkListener.4-foo-bar")
        );
    }

    #[test]
    fn component_path_dashes_are_escaped() {
        let info = PageComponentInfo::new(
            PageInfo::new(Some(1)),
            Some(ComponentInfo::new("onClick", "form:my-button")),
        );
        let token = info.encode().unwrap();

        assert_eq!(token, "1-onClick-form-my~button");
        assert_eq!(PageComponentInfo::decode(&token), Some(info));
    }

    #[test]
    fn decode_inverts_encode() {
        let tokens = [
            PageComponentInfo::new(PageInfo::new(Some(0)), None),
            listener(15, None, None),
            listener(15, None, Some(4)),
            listener(15, Some(5), None),
            listener(15, Some(5), Some(4)),
            listener(u32::MAX, Some(0), Some(0)),
        ];

        for token in tokens {
            let encoded = token.encode().unwrap();
            assert_eq!(PageComponentInfo::decode(&encoded), Some(token), "{encoded}");
        }
    }

    #[test]
    fn decode_rejects_malformed_tokens() {
        let malformed = [
            "",
            "abc",
            "-15",
            "+15",
            "15x",
            "15-",
            "15-ILinkListener",
            "15-ILinkListener-",
            "15-5.6-foo",
            "15-x.ILinkListener-foo",
            "15-ILinkListener.x-foo",
            "15-1.ILinkListener.2.3-foo",
            "99999999999",
            "a=b",
        ];

        for token in malformed {
            assert_eq!(PageComponentInfo::decode(token), None, "{token}");
        }
    }

    #[test]
    fn from_url_only_reads_first_valueless_parameter() {
        assert_eq!(
            PageComponentInfo::from_url(&Url::parse("some/path?15&a=b")),
            Some(PageComponentInfo::new(PageInfo::new(Some(15)), None))
        );
        assert_eq!(PageComponentInfo::from_url(&Url::parse("some/path?a=b&15")), None);
        assert_eq!(PageComponentInfo::from_url(&Url::parse("some/path?15=x")), None);
        assert_eq!(PageComponentInfo::from_url(&Url::parse("some/path")), None);
    }

    #[test]
    fn write_to_puts_token_first() {
        let mut url = Url::parse("some/path?a=b");
        listener(15, Some(5), Some(4)).write_to(&mut url);
        assert_eq!(url.to_string(), "some/path?15-5.ILinkListener.4-foo-bar&a=b");
    }
}
