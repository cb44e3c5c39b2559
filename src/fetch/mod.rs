pub mod fetcher;
pub mod http;
pub mod transport;

pub use fetcher::{FetchResult, FragmentFetcher};
pub use http::HttpTransport;
pub use transport::{RENDER_HEADER, RawResponse, TITLE_HEADER, Transport, TransportError};
