//! Bidirectional mapping between request URLs and page request handlers.
//!
//! Pages are mounted at path templates made of fixed segments, required
//! placeholders (`${name}`) and optional placeholders (`#{name}`). An [`App`]
//! turns incoming [`Request`]s into [`RequestHandler`]s and handlers back
//! into [`Url`]s, carrying page instance and listener references in a
//! compact query token.

mod app;
mod handler;
pub mod mapper;
pub mod parameters;
mod request;
mod settings;
mod url;

#[cfg(test)]
mod testing;

pub use app::App;
pub use handler::{
    Listener, ListenerHandler, ListenerRegistry, ListenerTable, PageClass, PageInstance,
    PageProvider, PageRegistry, PageSource, PageTable, RequestHandler,
};
pub use mapper::{
    template::{BuildError, ParseError, PathTemplate},
    MapError, Mapper, MapperContext,
};
pub use parameters::{
    PageParameters, ParametersEncoder, PathParametersEncoder, QueryParametersEncoder,
};
pub use request::Request;
pub use settings::MapperSettings;
pub use url::{QueryParameter, Url};
