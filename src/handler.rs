//! Request handler descriptors and the collaborators mappers consult.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::parameters::PageParameters;

/// Identity of a page type, written as a fully qualified dotted name such as
/// `org.example.HomePage`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageClass(Arc<str>);

impl PageClass {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The part after the last `.`.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(&*self.0, |(_, simple)| simple)
    }

    /// Everything before the last `.`, empty for an unqualified name.
    pub fn package(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(package, _)| package)
    }
}

impl fmt::Debug for PageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageClass({})", self.0)
    }
}

impl fmt::Display for PageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live page as held by the page store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInstance {
    pub id: u32,
    pub class: PageClass,
    /// Parameters the page was constructed with.
    pub parameters: PageParameters,
    pub render_count: u32,
    /// Stateless pages are never referenced by id.
    pub stateless: bool,
    /// Whether the page was built from a bookmarkable URL.
    pub created_bookmarkable: bool,
}

/// A named callback on a component. Interned in a [`ListenerRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    name: String,
    include_render_count: bool,
}

impl Listener {
    pub fn new(name: impl Into<String>, include_render_count: bool) -> Self {
        Self {
            name: name.into(),
            include_render_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether URLs for this listener carry the page's render count.
    pub fn include_render_count(&self) -> bool {
        self.include_render_count
    }
}

/// Page instance storage. Implementations own any locking.
pub trait PageSource: Send + Sync + 'static {
    /// Looks up a stored page. A miss is final for the current request.
    fn get(&self, page_id: u32) -> Option<Arc<PageInstance>>;

    /// Constructs a page from its class and parameters. The result must be
    /// marked as created bookmarkable.
    fn create(&self, class: &PageClass, parameters: &PageParameters) -> Arc<PageInstance>;
}

pub trait ListenerRegistry: Send + Sync + 'static {
    fn by_name(&self, name: &str) -> Option<Arc<Listener>>;

    fn name_of(&self, listener: &Listener) -> Option<String>;
}

/// Resolves fully qualified class names to page classes.
pub trait PageRegistry: Send + Sync + 'static {
    fn resolve(&self, name: &str) -> Option<PageClass>;
}

/// Listener table built once at startup.
#[derive(Debug, Default)]
pub struct ListenerTable {
    listeners: HashMap<String, Arc<Listener>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Listener) -> &mut Self {
        self.listeners
            .insert(listener.name().to_owned(), Arc::new(listener));
        self
    }
}

impl ListenerRegistry for ListenerTable {
    fn by_name(&self, name: &str) -> Option<Arc<Listener>> {
        self.listeners.get(name).cloned()
    }

    fn name_of(&self, listener: &Listener) -> Option<String> {
        self.listeners
            .get(listener.name())
            .filter(|registered| ***registered == *listener)
            .map(|registered| registered.name().to_owned())
    }
}

/// Page class table built once at startup.
#[derive(Debug, Default)]
pub struct PageTable {
    pages: HashMap<String, PageClass>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: PageClass) -> &mut Self {
        self.pages.insert(class.name().to_owned(), class);
        self
    }
}

impl PageRegistry for PageTable {
    fn resolve(&self, name: &str) -> Option<PageClass> {
        self.pages.get(name).cloned()
    }
}

/// Where the page for a handler comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageProvider {
    /// An instance found in the page store.
    Existing(Arc<PageInstance>),
    /// A page still to be constructed from its class and parameters.
    New {
        class: PageClass,
        parameters: PageParameters,
    },
}

impl PageProvider {
    pub fn new_page(class: PageClass, parameters: PageParameters) -> Self {
        PageProvider::New { class, parameters }
    }

    pub fn class(&self) -> &PageClass {
        match self {
            PageProvider::Existing(page) => &page.class,
            PageProvider::New { class, .. } => class,
        }
    }

    pub fn parameters(&self) -> &PageParameters {
        match self {
            PageProvider::Existing(page) => &page.parameters,
            PageProvider::New { parameters, .. } => parameters,
        }
    }

    pub fn is_new_instance(&self) -> bool {
        matches!(self, PageProvider::New { .. })
    }

    /// Returns the existing instance or constructs a new one.
    pub fn page(&self, source: &dyn PageSource) -> Arc<PageInstance> {
        match self {
            PageProvider::Existing(page) => Arc::clone(page),
            PageProvider::New { class, parameters } => source.create(class, parameters),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerHandler {
    pub provider: PageProvider,
    /// `:`-separated component path within the page.
    pub component_path: String,
    pub listener: Arc<Listener>,
    pub behavior_index: Option<u32>,
    /// Render count the request was issued for, if the URL carried one.
    pub render_count: Option<u32>,
}

/// What a request resolves to, and what a URL is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestHandler {
    /// Link to a page class without instance information.
    Bookmarkable {
        class: PageClass,
        parameters: PageParameters,
    },
    /// Render a page, either an existing instance or a fresh one.
    RenderPage(PageProvider),
    /// Invoke a listener on a component.
    Listener(ListenerHandler),
}

impl RequestHandler {
    pub fn page_class(&self) -> &PageClass {
        match self {
            RequestHandler::Bookmarkable { class, .. } => class,
            RequestHandler::RenderPage(provider) => provider.class(),
            RequestHandler::Listener(handler) => handler.provider.class(),
        }
    }
}
