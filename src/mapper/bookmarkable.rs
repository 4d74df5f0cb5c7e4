//! Mappers that name the page class in the URL itself.

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    handler::PageClass,
    parameters::{ParametersEncoder, QueryParametersEncoder},
    url::Url,
};

use super::{
    decode_remainder, finish_url,
    info::PageComponentInfo,
    template::{ParseError, PathTemplate},
    MapperContext, UrlInfo,
};

/// `/<namespace>/<identifier>/<fully.qualified.Page>` for every page class
/// the registry knows.
#[derive(Clone)]
pub struct BookmarkableMapper {
    encoder: Arc<dyn ParametersEncoder>,
}

impl BookmarkableMapper {
    pub fn new() -> Self {
        Self {
            encoder: Arc::new(QueryParametersEncoder),
        }
    }

    pub fn with_encoder(mut self, encoder: impl ParametersEncoder) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub(super) fn score(&self, url: &Url, context: &MapperContext) -> i32 {
        if Self::prefix_matches(url, context) {
            i32::MAX
        } else {
            0
        }
    }

    pub(super) fn parse_request(&self, url: &Url, context: &MapperContext) -> Option<UrlInfo> {
        if !Self::prefix_matches(url, context) {
            return None;
        }

        let name = url.segments().get(2)?;
        let Some(class) = context.registry().resolve(name) else {
            debug!(class = %name, "no page class registered under bookmarkable name");
            return None;
        };

        let component_info = PageComponentInfo::from_url(url);
        let parameters = decode_remainder(&*self.encoder, url, 3, component_info.as_ref());
        Some(UrlInfo::new(component_info, class, parameters))
    }

    pub(super) fn build_url(&self, info: UrlInfo, context: &MapperContext) -> Url {
        let settings = context.settings();
        let url = Url::from_segments([
            settings.namespace.as_str(),
            settings.bookmarkable_identifier.as_str(),
            info.class.name(),
        ]);
        finish_url(
            url,
            &*self.encoder,
            &info.parameters,
            info.component_info.as_ref(),
        )
    }

    /// Whether `url` has a class segment after the namespace and identifier.
    fn prefix_matches(url: &Url, context: &MapperContext) -> bool {
        let settings = context.settings();
        match url.segments() {
            [namespace, identifier, _, ..] => {
                same(namespace, &settings.namespace, settings.case_sensitive)
                    && same(identifier, &settings.bookmarkable_identifier, settings.case_sensitive)
            }
            _ => false,
        }
    }
}

impl Default for BookmarkableMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BookmarkableMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkableMapper").finish_non_exhaustive()
    }
}

/// Every page of one package under a mount path: `/<mount>/<SimpleName>`.
///
/// The mount path may itself carry placeholders.
#[derive(Clone)]
pub struct PackageMapper {
    template: PathTemplate,
    package: String,
    encoder: Arc<dyn ParametersEncoder>,
}

impl PackageMapper {
    pub fn new(mount_path: &str, package: impl Into<String>) -> Result<Self, ParseError> {
        Ok(Self {
            template: PathTemplate::compile(mount_path)?,
            package: package.into(),
            encoder: Arc::new(QueryParametersEncoder),
        })
    }

    pub fn with_encoder(mut self, encoder: impl ParametersEncoder) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Whether `class` lives directly in this package and is registered.
    pub(super) fn owns(&self, class: &PageClass, context: &MapperContext) -> bool {
        class.package() == self.package && context.registry().resolve(class.name()).is_some()
    }

    pub(super) fn score(&self, url: &Url, context: &MapperContext) -> i32 {
        match self
            .template
            .match_sizes(url.segments(), context.settings().case_sensitive)
        {
            Some(matched) if url.segments().len() > matched.total() => {
                self.template.specificity()
            }
            _ => 0,
        }
    }

    pub(super) fn parse_request(&self, url: &Url, context: &MapperContext) -> Option<UrlInfo> {
        let segments = url.segments();
        let matched = self
            .template
            .match_sizes(segments, context.settings().case_sensitive)?;

        let simple_name = segments.get(matched.total())?;
        if simple_name.is_empty() || simple_name.contains('.') {
            return None;
        }
        let class = context.registry().resolve(&self.qualify(simple_name))?;

        let component_info = PageComponentInfo::from_url(url);
        let mut parameters = self.template.extract(segments, &matched);
        parameters.append(decode_remainder(
            &*self.encoder,
            url,
            matched.total() + 1,
            component_info.as_ref(),
        ));

        Some(UrlInfo::new(component_info, class, parameters))
    }

    pub(super) fn build_url(&self, info: UrlInfo) -> Option<Url> {
        let built = match self.template.build(info.parameters) {
            Ok(built) => built,
            Err(err) => {
                debug!(template = %self.template, %err, "cannot build package URL");
                return None;
            }
        };

        let mut url = Url::from_segments(built.segments);
        url.push_segment(info.class.simple_name());

        Some(finish_url(
            url,
            &*self.encoder,
            &built.remaining,
            info.component_info.as_ref(),
        ))
    }

    fn qualify(&self, simple_name: &str) -> String {
        if self.package.is_empty() {
            simple_name.to_owned()
        } else {
            format!("{}.{simple_name}", self.package)
        }
    }
}

impl fmt::Debug for PackageMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageMapper")
            .field("template", &self.template)
            .field("package", &self.package)
            .finish_non_exhaustive()
    }
}

fn same(segment: &str, expected: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        segment == expected
    } else {
        segment.eq_ignore_ascii_case(expected)
    }
}
