//! HTTP Handlers

mod ping;
mod scrape;
mod websocket;
mod work;

pub use ping::*;
pub use scrape::*;
pub use websocket::*;
pub use work::*;
