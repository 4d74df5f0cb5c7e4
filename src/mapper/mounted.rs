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

/// Maps one page class to a mount path such as `/blog/${year}/#{slug}`.
///
/// Placeholder segments become named parameters; whatever follows the mount
/// path is handed to the parameters encoder.
#[derive(Clone)]
pub struct MountedMapper {
    template: PathTemplate,
    class: PageClass,
    encoder: Arc<dyn ParametersEncoder>,
    home: bool,
}

impl MountedMapper {
    pub fn new(mount_path: &str, class: PageClass) -> Result<Self, ParseError> {
        Ok(Self {
            template: PathTemplate::compile(mount_path)?,
            class,
            encoder: Arc::new(QueryParametersEncoder),
            home: false,
        })
    }

    /// Mapper for the home page at the empty path.
    pub(crate) fn home(class: PageClass) -> Self {
        Self {
            template: PathTemplate::root(),
            class,
            encoder: Arc::new(QueryParametersEncoder),
            home: true,
        }
    }

    pub fn with_encoder(mut self, encoder: impl ParametersEncoder) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn class(&self) -> &PageClass {
        &self.class
    }

    pub(super) fn score(&self, url: &Url, context: &MapperContext) -> i32 {
        if self
            .template
            .matches(url.segments(), context.settings().case_sensitive)
        {
            self.template.specificity()
        } else {
            0
        }
    }

    pub(super) fn parse_request(&self, url: &Url, context: &MapperContext) -> Option<UrlInfo> {
        if self.home && !url.segments().is_empty() {
            return None;
        }

        let component_info = PageComponentInfo::from_url(url);

        if self.redirects_home(url, context) {
            debug!(class = %self.class, "empty URL claimed by mounted home page");
            let parameters = decode_remainder(&*self.encoder, url, 0, component_info.as_ref());
            return Some(UrlInfo::new(component_info, self.class.clone(), parameters));
        }

        let segments = url.segments();
        let matched = self
            .template
            .match_sizes(segments, context.settings().case_sensitive)?;

        let mut parameters = self.template.extract(segments, &matched);
        parameters.append(decode_remainder(
            &*self.encoder,
            url,
            matched.total(),
            component_info.as_ref(),
        ));

        Some(UrlInfo::new(component_info, self.class.clone(), parameters))
    }

    pub(super) fn build_url(&self, info: UrlInfo) -> Option<Url> {
        let built = match self.template.build(info.parameters) {
            Ok(built) => built,
            Err(err) => {
                debug!(template = %self.template, %err, "cannot build mounted URL");
                return None;
            }
        };

        Some(finish_url(
            Url::from_segments(built.segments),
            &*self.encoder,
            &built.remaining,
            info.component_info.as_ref(),
        ))
    }

    fn redirects_home(&self, url: &Url, context: &MapperContext) -> bool {
        !self.home
            && url.segments().is_empty()
            && context.settings().redirect_from_home_page
            && context.home_page() == Some(&self.class)
            && !self.template.matches(&[], context.settings().case_sensitive)
    }
}

impl fmt::Debug for MountedMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedMapper")
            .field("template", &self.template)
            .field("class", &self.class)
            .field("home", &self.home)
            .finish_non_exhaustive()
    }
}

