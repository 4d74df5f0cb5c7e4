//! In-memory collaborators for unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    handler::{Listener, ListenerTable, PageClass, PageInstance, PageSource, PageTable},
    mapper::MapperContext,
    parameters::PageParameters,
};

pub(crate) const MOCK_PAGE: &str = "org.example.MockPage";

#[derive(Debug, Default)]
pub(crate) struct MemoryPages {
    pages: Mutex<HashMap<u32, Arc<PageInstance>>>,
    next_id: AtomicU32,
}

impl MemoryPages {
    pub fn store(&self, page: PageInstance) -> Arc<PageInstance> {
        let page = Arc::new(page);
        self.pages.lock().unwrap().insert(page.id, Arc::clone(&page));
        page
    }
}

impl PageSource for MemoryPages {
    fn get(&self, page_id: u32) -> Option<Arc<PageInstance>> {
        self.pages.lock().unwrap().get(&page_id).cloned()
    }

    fn create(&self, class: &PageClass, parameters: &PageParameters) -> Arc<PageInstance> {
        let id = 1000 + self.next_id.fetch_add(1, Ordering::Relaxed);
        self.store(PageInstance {
            id,
            class: class.clone(),
            parameters: parameters.clone(),
            render_count: 0,
            stateless: false,
            created_bookmarkable: true,
        })
    }
}

pub(crate) fn mock_page() -> PageClass {
    PageClass::new(MOCK_PAGE)
}

/// A stateful page of `class` that was not built from a bookmarkable URL.
pub(crate) fn page(id: u32, class: &PageClass) -> PageInstance {
    PageInstance {
        id,
        class: class.clone(),
        parameters: PageParameters::new(),
        render_count: 0,
        stateless: false,
        created_bookmarkable: false,
    }
}

pub(crate) fn listeners() -> ListenerTable {
    let mut table = ListenerTable::new();
    table
        .register(Listener::new("ILinkListener", true))
        .register(Listener::new("IBehaviorListener", false));
    table
}

pub(crate) fn registry() -> PageTable {
    let mut table = PageTable::new();
    table
        .register(mock_page())
        .register(PageClass::new("org.example.OtherPage"))
        .register(PageClass::new("org.example.admin.AdminPage"));
    table
}

/// Context over `pages` with the default settings and the test tables.
pub(crate) fn context(pages: &Arc<MemoryPages>) -> MapperContext {
    let pages: Arc<dyn PageSource> = pages.clone();
    MapperContext::new(pages, Arc::new(listeners())).with_registry(Arc::new(registry()))
}
