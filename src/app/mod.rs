use tracing::{debug, trace};

use crate::{
    handler::{PageClass, RequestHandler},
    mapper::{
        BookmarkableMapper, MapError, Mapper, MapperContext, MountedMapper, PackageMapper,
        ParseError,
    },
    request::Request,
    url::Url,
};

/// Ordered set of mappers sharing one [`MapperContext`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use pagemount::{
///     App, ListenerTable, MapperContext, PageClass, PageParameters, Request, RequestHandler,
/// };
/// # use pagemount::{PageInstance, PageSource};
/// # struct NoPages;
/// # impl PageSource for NoPages {
/// #     fn get(&self, _: u32) -> Option<Arc<PageInstance>> { None }
/// #     fn create(&self, class: &PageClass, parameters: &PageParameters) -> Arc<PageInstance> {
/// #         Arc::new(PageInstance {
/// #             id: 1,
/// #             class: class.clone(),
/// #             parameters: parameters.clone(),
/// #             render_count: 0,
/// #             stateless: false,
/// #             created_bookmarkable: true,
/// #         })
/// #     }
/// # }
///
/// let blog = PageClass::new("org.example.BlogPage");
/// let context = MapperContext::new(Arc::new(NoPages), Arc::new(ListenerTable::new()));
///
/// let mut app = App::new(context);
/// app.mount_page("/blog/${year}/#{slug}", blog.clone()).unwrap();
///
/// let handler = app
///     .map_request(&Request::parse("/blog/2024/hello?draft=1"))
///     .unwrap();
/// let parameters = PageParameters::new()
///     .with("year", "2024")
///     .with("slug", "hello")
///     .with("draft", "1");
/// assert_eq!(handler.as_ref().map(RequestHandler::page_class), Some(&blog));
///
/// let url = app.map_handler(&RequestHandler::Bookmarkable { class: blog, parameters });
/// assert_eq!(url.unwrap().to_string(), "blog/2024/hello?draft=1");
/// ```
#[derive(Debug)]
pub struct App {
    mappers: Vec<Mapper>,
    context: MapperContext,
}

impl App {
    /// Starts with the generic bookmarkable mapper and, when the context
    /// names a home page, the home page mapper.
    pub fn new(context: MapperContext) -> Self {
        let mut mappers = vec![Mapper::Bookmarkable(BookmarkableMapper::new())];
        if let Some(home) = context.home_page() {
            mappers.push(Mapper::home(home.clone()));
        }
        Self { mappers, context }
    }

    pub fn context(&self) -> &MapperContext {
        &self.context
    }

    pub fn mappers(&self) -> &[Mapper] {
        &self.mappers
    }

    pub fn mount(&mut self, mapper: Mapper) -> &mut App {
        debug!(mapper = %mapper, "mounted");
        self.mappers.push(mapper);
        self
    }

    /// Mounts `class` at `mount_path`, e.g. `/blog/${year}/#{slug}`.
    pub fn mount_page(&mut self, mount_path: &str, class: PageClass) -> Result<&mut App, ParseError> {
        let mapper = MountedMapper::new(mount_path, class)?;
        Ok(self.mount(Mapper::Mounted(mapper)))
    }

    /// Mounts every registered page of `package` under `mount_path`.
    pub fn mount_package(
        &mut self,
        mount_path: &str,
        package: &str,
    ) -> Result<&mut App, ParseError> {
        let mapper = PackageMapper::new(mount_path, package)?;
        Ok(self.mount(Mapper::Package(mapper)))
    }

    /// Asks the mappers in order of decreasing compatibility score; among
    /// equal scores the one mounted last goes first. The first handler wins.
    pub fn map_request(&self, request: &Request) -> Result<Option<RequestHandler>, MapError> {
        let mut candidates: Vec<(i32, &Mapper)> = self
            .mappers
            .iter()
            .rev()
            .map(|mapper| (mapper.compatibility_score(request, &self.context), mapper))
            .collect();
        candidates.sort_by(|(a, _), (b, _)| b.cmp(a));

        for (score, mapper) in candidates {
            trace!(mapper = %mapper, score, "trying mapper");
            if let Some(handler) = mapper.map_request(request, &self.context)? {
                return Ok(Some(handler));
            }
        }

        debug!(url = %request.url(), "no mapper for request");
        Ok(None)
    }

    /// Builds a URL with the most recently mounted mapper able to express
    /// `handler`.
    pub fn map_handler(&self, handler: &RequestHandler) -> Option<Url> {
        self.mappers
            .iter()
            .rev()
            .find_map(|mapper| mapper.map_handler(handler, &self.context))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        handler::{PageInstance, PageProvider},
        parameters::PageParameters,
        settings::MapperSettings,
        testing::{self, mock_page, page, MemoryPages},
    };

    fn app() -> (Arc<MemoryPages>, App) {
        let pages = Arc::new(MemoryPages::default());
        let app = App::new(testing::context(&pages));
        (pages, app)
    }

    fn class_of(app: &App, url: &str) -> Option<PageClass> {
        app.map_request(&Request::parse(url))
            .unwrap()
            .map(|handler| handler.page_class().clone())
    }

    #[test]
    fn more_specific_mount_wins() {
        let (_, mut app) = app();
        let short = PageClass::new("org.example.Short");
        let long = PageClass::new("org.example.Long");
        app.mount_page("/a/b", long.clone())
            .unwrap()
            .mount_page("/a", short.clone())
            .unwrap();

        assert_eq!(class_of(&app, "a/b"), Some(long));
        assert_eq!(class_of(&app, "a/c"), Some(short.clone()));
        assert_eq!(class_of(&app, "a"), Some(short));
    }

    #[test]
    fn later_mount_wins_ties() {
        let (_, mut app) = app();
        let first = PageClass::new("org.example.First");
        let second = PageClass::new("org.example.Second");
        app.mount_page("/same", first.clone())
            .unwrap()
            .mount_page("/same", second.clone())
            .unwrap();

        assert_eq!(class_of(&app, "same"), Some(second.clone()));

        let handler = RequestHandler::Bookmarkable {
            class: first,
            parameters: PageParameters::new(),
        };
        assert_eq!(
            app.map_handler(&handler).map(|url| url.to_string()).as_deref(),
            Some("same")
        );
    }

    #[test]
    fn unmatched_request() {
        let (_, mut app) = app();
        app.mount_page("/some/mount/path", mock_page()).unwrap();

        assert_eq!(app.map_request(&Request::parse("nowhere")), Ok(None));
    }

    #[test]
    fn generic_bookmarkable_url_reaches_any_registered_page() {
        let (_, mut app) = app();
        app.mount_page("/mock", mock_page()).unwrap();

        assert_eq!(
            class_of(&app, "wicket/bookmarkable/org.example.OtherPage"),
            Some(PageClass::new("org.example.OtherPage"))
        );

        let handler = RequestHandler::Bookmarkable {
            class: PageClass::new("org.example.OtherPage"),
            parameters: PageParameters::new(),
        };
        assert_eq!(
            app.map_handler(&handler).map(|url| url.to_string()).as_deref(),
            Some("wicket/bookmarkable/org.example.OtherPage")
        );

        // A mount takes precedence over the generic form.
        let handler = RequestHandler::Bookmarkable {
            class: mock_page(),
            parameters: PageParameters::new(),
        };
        assert_eq!(
            app.map_handler(&handler).map(|url| url.to_string()).as_deref(),
            Some("mock")
        );
    }

    #[test]
    fn home_page_is_last_resort() {
        let pages = Arc::new(MemoryPages::default());
        let home = PageClass::new("org.example.HomePage");
        let mut app = App::new(testing::context(&pages).with_home_page(home.clone()));
        app.mount_page("/some/mount/path", mock_page()).unwrap();

        assert_eq!(class_of(&app, ""), Some(home));
        assert_eq!(class_of(&app, "some/mount/path"), Some(mock_page()));
        assert_eq!(class_of(&app, "unknown"), None);
    }

    #[test]
    fn mounted_home_page_claims_empty_url() {
        let pages = Arc::new(MemoryPages::default());
        let mut app = App::new(testing::context(&pages).with_home_page(mock_page()));
        app.mount_page("/home", mock_page()).unwrap();

        let handler = app.map_request(&Request::parse("")).unwrap();
        assert_eq!(
            handler,
            Some(RequestHandler::RenderPage(PageProvider::new_page(
                mock_page(),
                PageParameters::new()
            )))
        );

        let handler = RequestHandler::Bookmarkable {
            class: mock_page(),
            parameters: PageParameters::new(),
        };
        assert_eq!(
            app.map_handler(&handler).map(|url| url.to_string()).as_deref(),
            Some("home")
        );
    }

    #[test]
    fn package_mount() {
        let (_, mut app) = app();
        app.mount_package("/pages", "org.example").unwrap();

        assert_eq!(class_of(&app, "pages/MockPage"), Some(mock_page()));
        assert_eq!(class_of(&app, "pages/Unknown"), None);
    }

    #[test]
    fn expired_page_error_propagates() {
        let pages = Arc::new(MemoryPages::default());
        let context = testing::context(&pages).with_settings(MapperSettings {
            recreate_mounted_pages_after_expiry: false,
            ..MapperSettings::default()
        });
        let mut app = App::new(context);
        app.mount_page("/some/mount/path", mock_page()).unwrap();

        assert_eq!(
            app.map_request(&Request::parse("some/mount/path?3")),
            Err(MapError::PageExpired { page_id: 3 })
        );
    }

    #[test]
    fn hybrid_round_trip() {
        let (pages, mut app) = app();
        app.mount_page("/some/mount/path", mock_page()).unwrap();
        let stored = pages.store(PageInstance {
            parameters: PageParameters::new().with("a", "b"),
            ..page(42, &mock_page())
        });

        let handler = RequestHandler::RenderPage(PageProvider::Existing(stored));
        let url = app.map_handler(&handler).unwrap();
        assert_eq!(url.to_string(), "some/mount/path?42&a=b");

        assert_eq!(app.map_request(&Request::new(url)), Ok(Some(handler)));
    }

    #[test]
    fn invalid_mount_path_is_rejected() {
        let (_, mut app) = app();
        assert!(app.mount_page("/a/${}", mock_page()).is_err());
        assert!(app.mount_package("/a/${x}/${x}", "org.example").is_err());
        assert_eq!(app.mappers().len(), 1);
    }
}
