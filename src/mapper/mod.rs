//! Request ⇄ handler mapping.
//!
//! Each [`Mapper`] understands one URL layout and translates in both
//! directions:
//!
//! ```text
//!  Page class - bookmarkable render
//!  /mount/point
//!
//!  Page instance - hybrid render
//!  /mount/point?2
//!
//!  Page instance - listener
//!  /mount/point?2-click-foo-bar-baz
//!  /mount/point?2-5.click.1-foo-bar-baz (5 is the render count, 1 the behavior index)
//! ```

pub mod bookmarkable;
pub mod info;
pub mod mounted;
pub mod template;

use std::{fmt, sync::Arc};

use tracing::{debug, warn};

use crate::{
    handler::{
        ListenerHandler, ListenerRegistry, PageClass, PageInstance, PageProvider, PageRegistry,
        PageSource, PageTable, RequestHandler,
    },
    parameters::{PageParameters, ParametersEncoder},
    request::Request,
    settings::MapperSettings,
    url::Url,
};

pub use bookmarkable::{BookmarkableMapper, PackageMapper};
pub use info::{ComponentInfo, PageComponentInfo, PageInfo};
pub use mounted::MountedMapper;
pub use template::{BuildError, ParseError, PathTemplate};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    /// The referenced page instance is gone and may not be recreated.
    #[error("page with id {page_id} has expired")]
    PageExpired { page_id: u32 },
    /// A listener URL was issued for an earlier render of the page.
    #[error("page with id {page_id} is at render {current}, listener targets render {render_count}")]
    StalePage {
        page_id: u32,
        render_count: u32,
        current: u32,
    },
}

/// Settings and collaborators shared by all mappers.
#[derive(Clone)]
pub struct MapperContext {
    settings: MapperSettings,
    home_page: Option<PageClass>,
    pages: Arc<dyn PageSource>,
    listeners: Arc<dyn ListenerRegistry>,
    registry: Arc<dyn PageRegistry>,
}

impl MapperContext {
    pub fn new(pages: Arc<dyn PageSource>, listeners: Arc<dyn ListenerRegistry>) -> Self {
        Self {
            settings: MapperSettings::default(),
            home_page: None,
            pages,
            listeners,
            registry: Arc::new(PageTable::new()),
        }
    }

    pub fn with_settings(mut self, settings: MapperSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_home_page(mut self, class: PageClass) -> Self {
        self.home_page = Some(class);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn PageRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    pub fn home_page(&self) -> Option<&PageClass> {
        self.home_page.as_ref()
    }

    pub fn pages(&self) -> &dyn PageSource {
        &*self.pages
    }

    pub fn listeners(&self) -> &dyn ListenerRegistry {
        &*self.listeners
    }

    pub fn registry(&self) -> &dyn PageRegistry {
        &*self.registry
    }
}

impl fmt::Debug for MapperContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperContext")
            .field("settings", &self.settings)
            .field("home_page", &self.home_page)
            .finish_non_exhaustive()
    }
}

/// What a mapper read from, or is about to write into, a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlInfo {
    pub component_info: Option<PageComponentInfo>,
    pub class: PageClass,
    pub parameters: PageParameters,
}

impl UrlInfo {
    pub fn new(
        component_info: Option<PageComponentInfo>,
        class: PageClass,
        parameters: PageParameters,
    ) -> Self {
        Self {
            component_info,
            class,
            parameters,
        }
    }
}

/// The URL layouts a request can be mapped with.
#[derive(Debug)]
pub enum Mapper {
    /// `/wicket/bookmarkable/<fully.qualified.Page>` for any registered page.
    Bookmarkable(BookmarkableMapper),
    /// One page class at a templated mount path.
    Mounted(MountedMapper),
    /// Every page of a package under a mount path, by simple name.
    Package(PackageMapper),
    /// The home page at the empty path; tried last.
    Home(MountedMapper),
}

impl Mapper {
    pub fn bookmarkable() -> Self {
        Mapper::Bookmarkable(BookmarkableMapper::new())
    }

    pub fn mount(mount_path: &str, class: PageClass) -> Result<Self, ParseError> {
        MountedMapper::new(mount_path, class).map(Mapper::Mounted)
    }

    pub fn package(mount_path: &str, package: impl Into<String>) -> Result<Self, ParseError> {
        PackageMapper::new(mount_path, package).map(Mapper::Package)
    }

    pub fn home(class: PageClass) -> Self {
        Mapper::Home(MountedMapper::home(class))
    }

    /// How well this mapper fits `request`; higher wins.
    ///
    /// Mounts score by [`PathTemplate::specificity`] when they match and 0
    /// otherwise. The generic bookmarkable mapper claims its own prefix with
    /// `i32::MAX`; the home mapper is a last resort at `i32::MIN + 1`.
    pub fn compatibility_score(&self, request: &Request, context: &MapperContext) -> i32 {
        match self {
            Mapper::Bookmarkable(mapper) => mapper.score(request.url(), context),
            Mapper::Mounted(mapper) => mapper.score(request.url(), context),
            Mapper::Package(mapper) => mapper.score(request.url(), context),
            Mapper::Home(_) => i32::MIN + 1,
        }
    }

    /// Maps a request to a handler.
    ///
    /// `Ok(None)` means this mapper does not handle the request. Errors are
    /// an expired page when recreation is disabled, and a listener URL
    /// issued for an earlier render of its page.
    pub fn map_request(
        &self,
        request: &Request,
        context: &MapperContext,
    ) -> Result<Option<RequestHandler>, MapError> {
        let Some(info) = self.parse_request(request.url(), context) else {
            return Ok(None);
        };

        let UrlInfo {
            component_info,
            class,
            parameters,
        } = info;

        let handler = match component_info {
            Some(PageComponentInfo {
                page_info,
                component_info: Some(component_info),
            }) => process_listener(page_info, component_info, class, parameters, context)?,
            Some(PageComponentInfo {
                page_info: PageInfo {
                    page_id: Some(page_id),
                },
                component_info: None,
            }) => Some(process_hybrid(page_id, class, parameters, context)?),
            _ => Some(process_bookmarkable(class, parameters)),
        };

        if handler.is_some() {
            debug!(mapper = %self, url = %request.url(), "mapped request");
        }
        Ok(handler)
    }

    /// Builds the URL for `handler`, or [`None`] if this mapper cannot
    /// express it.
    pub fn map_handler(&self, handler: &RequestHandler, context: &MapperContext) -> Option<Url> {
        if !self.check_page_class(handler.page_class(), context) {
            return None;
        }

        let info = match handler {
            RequestHandler::Bookmarkable { class, parameters } => {
                UrlInfo::new(None, class.clone(), parameters.clone())
            }
            RequestHandler::RenderPage(PageProvider::New { class, parameters }) => {
                UrlInfo::new(None, class.clone(), parameters.clone())
            }
            RequestHandler::RenderPage(PageProvider::Existing(page)) => {
                if self.page_must_have_been_created_bookmarkable() && !page.created_bookmarkable {
                    return None;
                }
                let page_info = PageInfo::new(addressable_id(page));
                UrlInfo::new(
                    Some(PageComponentInfo::new(page_info, None)),
                    page.class.clone(),
                    page.parameters.clone(),
                )
            }
            RequestHandler::Listener(handler) => {
                let PageProvider::Existing(page) = &handler.provider else {
                    return None;
                };
                let page_id = addressable_id(page)?;
                let listener = context.listeners().name_of(&handler.listener)?;
                let render_count = handler
                    .listener
                    .include_render_count()
                    .then_some(page.render_count);

                let component_info = ComponentInfo::new(listener, handler.component_path.clone())
                    .with_render_count(render_count)
                    .with_behavior_index(handler.behavior_index);
                UrlInfo::new(
                    Some(PageComponentInfo::new(
                        PageInfo::new(Some(page_id)),
                        Some(component_info),
                    )),
                    page.class.clone(),
                    page.parameters.clone(),
                )
            }
        };

        let url = self.build_url(info, context)?;
        debug!(mapper = %self, %url, "mapped handler");
        Some(url)
    }

    fn parse_request(&self, url: &Url, context: &MapperContext) -> Option<UrlInfo> {
        match self {
            Mapper::Bookmarkable(mapper) => mapper.parse_request(url, context),
            Mapper::Mounted(mapper) | Mapper::Home(mapper) => mapper.parse_request(url, context),
            Mapper::Package(mapper) => mapper.parse_request(url, context),
        }
    }

    fn build_url(&self, info: UrlInfo, context: &MapperContext) -> Option<Url> {
        match self {
            Mapper::Bookmarkable(mapper) => Some(mapper.build_url(info, context)),
            Mapper::Mounted(mapper) | Mapper::Home(mapper) => mapper.build_url(info),
            Mapper::Package(mapper) => mapper.build_url(info),
        }
    }

    fn check_page_class(&self, class: &PageClass, context: &MapperContext) -> bool {
        match self {
            Mapper::Bookmarkable(_) => context.registry().resolve(class.name()).is_some(),
            Mapper::Mounted(mapper) | Mapper::Home(mapper) => mapper.class() == class,
            Mapper::Package(mapper) => mapper.owns(class, context),
        }
    }

    /// Generic class-name URLs only reference instances that were themselves
    /// created from a bookmarkable URL.
    fn page_must_have_been_created_bookmarkable(&self) -> bool {
        matches!(self, Mapper::Bookmarkable(_))
    }
}

impl fmt::Display for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapper::Bookmarkable(_) => f.write_str("BookmarkableMapper"),
            Mapper::Mounted(mapper) => write!(f, "MountedMapper [{}]", mapper.template()),
            Mapper::Package(mapper) => write!(
                f,
                "PackageMapper [{} => {}]",
                mapper.template(),
                mapper.package()
            ),
            Mapper::Home(mapper) => write!(f, "HomePageMapper [{}]", mapper.class()),
        }
    }
}

/// Id under which `page` may be referenced from a URL.
fn addressable_id(page: &PageInstance) -> Option<u32> {
    (!page.stateless).then_some(page.id)
}

fn stored_page(page_id: u32, class: &PageClass, context: &MapperContext) -> Option<Arc<PageInstance>> {
    context
        .pages()
        .get(page_id)
        .filter(|page| page.class == *class)
}

fn process_bookmarkable(class: PageClass, parameters: PageParameters) -> RequestHandler {
    RequestHandler::RenderPage(PageProvider::new_page(class, parameters))
}

fn process_hybrid(
    page_id: u32,
    class: PageClass,
    parameters: PageParameters,
    context: &MapperContext,
) -> Result<RequestHandler, MapError> {
    match stored_page(page_id, &class, context) {
        Some(page) if page.parameters == parameters => {
            Ok(RequestHandler::RenderPage(PageProvider::Existing(page)))
        }
        Some(_) => {
            debug!(page_id, "page parameters changed, rendering a fresh page");
            Ok(process_bookmarkable(class, parameters))
        }
        None if context.settings().recreate_mounted_pages_after_expiry => {
            debug!(page_id, "page expired, rendering a fresh page");
            Ok(process_bookmarkable(class, parameters))
        }
        None => Err(MapError::PageExpired { page_id }),
    }
}

/// Stateful pages keep the parameters they were built with; the URL's
/// parameters only matter when the page has to be recreated.
fn process_listener(
    page_info: PageInfo,
    component_info: ComponentInfo,
    class: PageClass,
    parameters: PageParameters,
    context: &MapperContext,
) -> Result<Option<RequestHandler>, MapError> {
    let Some(listener) = context.listeners().by_name(&component_info.listener) else {
        warn!(
            listener = %component_info.listener,
            component = %component_info.component_path,
            "unknown listener in page reference"
        );
        return Ok(None);
    };

    let provider = match page_info.page_id {
        Some(page_id) => match stored_page(page_id, &class, context) {
            Some(page) => match component_info.render_count {
                Some(render_count) if render_count != page.render_count => {
                    debug!(page_id, render_count, current = page.render_count, "stale listener URL");
                    return Err(MapError::StalePage {
                        page_id,
                        render_count,
                        current: page.render_count,
                    });
                }
                _ => PageProvider::Existing(page),
            },
            None if context.settings().recreate_mounted_pages_after_expiry => {
                debug!(page_id, "page expired, recreating it for listener");
                PageProvider::new_page(class, parameters)
            }
            None => return Err(MapError::PageExpired { page_id }),
        },
        None => PageProvider::new_page(class, parameters),
    };

    Ok(Some(RequestHandler::Listener(ListenerHandler {
        provider,
        component_path: component_info.component_path,
        listener,
        behavior_index: component_info.behavior_index,
        render_count: component_info.render_count,
    })))
}

/// Decodes what follows the first `skip` segments. The first query
/// parameter is dropped only when it was read as `component_info`.
pub(crate) fn decode_remainder(
    encoder: &dyn ParametersEncoder,
    url: &Url,
    skip: usize,
    component_info: Option<&PageComponentInfo>,
) -> PageParameters {
    let mut rest = url.skip_segments(skip);
    if component_info.is_some() && !rest.query_parameters().is_empty() {
        rest.query_parameters_mut().remove(0);
    }
    encoder.decode(&rest)
}

/// Appends the encoded `parameters` and the page reference token to `url`.
pub(crate) fn finish_url(
    mut url: Url,
    encoder: &dyn ParametersEncoder,
    parameters: &PageParameters,
    component_info: Option<&PageComponentInfo>,
) -> Url {
    url.append(encoder.encode(parameters));
    if let Some(component_info) = component_info {
        component_info.write_to(&mut url);
    }
    url
}
