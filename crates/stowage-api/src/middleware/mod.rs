pub mod cors_headers;

pub use cors_headers::cors_headers_middleware;
