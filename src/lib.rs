//! A thin HTTP message layer over a server-gateway environ.
//!
//! The serving layer hands over an [`Environ`] describing one inbound
//! request; this crate turns it into an [`HttpRequest`] (method, headers,
//! query/body parameters, cookies, optional session) and serializes an
//! [`HttpResponse`] back into the gateway's start-response convention.
//!
//! Sessions are keyed by a cookie value and persisted through a
//! [`SessionStore`] variant: process-wide memory, one JSON file per id, or a
//! null store for read-only setups.
//!
//! Transport, routing and dispatch live elsewhere; this layer is
//! single-request, synchronous object construction.

pub mod config;
pub mod gateway;
pub mod http;
pub mod sessions;

pub use config::HttpConfig;
pub use gateway::Environ;
pub use http::request::HttpRequest;
pub use http::response::HttpResponse;
pub use http::{HttpMethod, MessageError};
pub use sessions::{Session, SessionError, SessionStore};
