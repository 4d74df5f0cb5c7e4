use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use pagemount::{
    App, Listener, ListenerHandler, ListenerTable, MapperContext, PageClass, PageInstance,
    PageParameters, PageProvider, PageSource, PageTable, Request, RequestHandler,
};

#[derive(Default)]
struct Pages(Mutex<HashMap<u32, Arc<PageInstance>>>);

impl PageSource for Pages {
    fn get(&self, page_id: u32) -> Option<Arc<PageInstance>> {
        self.0.lock().unwrap().get(&page_id).cloned()
    }

    fn create(&self, class: &PageClass, parameters: &PageParameters) -> Arc<PageInstance> {
        let mut pages = self.0.lock().unwrap();
        let page = Arc::new(PageInstance {
            id: pages.len() as u32,
            class: class.clone(),
            parameters: parameters.clone(),
            render_count: 1,
            stateless: false,
            created_bookmarkable: true,
        });
        pages.insert(page.id, Arc::clone(&page));
        page
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let home = PageClass::new("org.example.HomePage");
    let article = PageClass::new("org.example.ArticlePage");

    let mut listeners = ListenerTable::new();
    listeners.register(Listener::new("ILinkListener", true));
    let mut registry = PageTable::new();
    registry.register(home.clone()).register(article.clone());

    let pages = Arc::new(Pages::default());
    let context = MapperContext::new(pages.clone(), Arc::new(listeners))
        .with_registry(Arc::new(registry))
        .with_home_page(home);

    let mut app = App::new(context);
    app.mount_page("/blog/${year}/#{slug}", article.clone())
        .unwrap()
        .mount_package("/pages", "org.example")
        .unwrap();

    let incoming = http::Request::get("/blog/2024/hello-world?lang=en&tag=rust&tag=web")
        .body(())
        .unwrap();
    let request = Request::from(&incoming);
    println!("lang     => {:?}", request.query_parameter("lang"));
    let handler = app.map_request(&request).unwrap();
    println!("{} => {handler:?}", incoming.uri());

    let Some(RequestHandler::RenderPage(provider)) = handler else {
        return;
    };
    let parameters = provider.parameters();
    println!("names    => {:?}", parameters.named_keys());
    println!("year     => {:?}", parameters.get("year"));
    println!("tags     => {:?}", parameters.values("tag").collect::<Vec<_>>());
    println!("draft?   => {}", parameters.contains("draft"));
    let page = provider.page(&*pages);

    let hybrid = RequestHandler::RenderPage(PageProvider::Existing(Arc::clone(&page)));
    println!("hybrid   => {}", app.map_handler(&hybrid).unwrap());

    let listener = app.context().listeners().by_name("ILinkListener").unwrap();
    let click = RequestHandler::Listener(ListenerHandler {
        provider: PageProvider::Existing(page),
        component_path: "comments:0:reply".to_owned(),
        listener,
        behavior_index: None,
        render_count: None,
    });
    let url = app.map_handler(&click).unwrap();
    println!("listener => {url}");
    println!("back     => {:?}", app.map_request(&Request::new(url)).unwrap());

    for path in ["", "pages/HomePage", "wicket/bookmarkable/org.example.ArticlePage/x"] {
        let handler = app.map_request(&Request::parse(path)).unwrap();
        println!("/{path} => {:?}", handler.as_ref().map(RequestHandler::page_class));
    }
}
