//! Shared WebSocket adapter state.

use std::sync::Arc;

use tracing::warn;
use url::{Origin, Url};

use crate::inbound::ws::hub::ConnectionHub;

/// Origins allowed to open a WebSocket, compared by scheme, host, and port.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<Origin>);

impl AllowedOrigins {
    /// Parse configured origins, skipping entries that are not absolute URLs.
    ///
    /// # Examples
    /// ```
    /// use ridematch::inbound::ws::state::AllowedOrigins;
    /// use url::Url;
    ///
    /// let origins = AllowedOrigins::parse(["http://localhost:3000", "not a url"]);
    /// let origin = Url::parse("http://localhost:3000").expect("url");
    /// assert!(origins.allows(&origin));
    /// ```
    pub fn parse<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = origins
            .into_iter()
            .filter_map(|raw| match Url::parse(raw.as_ref()) {
                Ok(url) if url.origin().is_tuple() => Some(url.origin()),
                Ok(_) | Err(_) => {
                    warn!(origin = raw.as_ref(), "ignoring unusable WebSocket origin");
                    None
                }
            })
            .collect();
        Self(parsed)
    }

    pub fn allows(&self, origin: &Url) -> bool {
        let candidate = origin.origin();
        self.0.iter().any(|allowed| *allowed == candidate)
    }
}

/// Dependency bundle for the WebSocket entry point.
#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<ConnectionHub>,
    pub allowed_origins: AllowedOrigins,
}

impl WsState {
    pub fn new(hub: Arc<ConnectionHub>, allowed_origins: AllowedOrigins) -> Self {
        Self {
            hub,
            allowed_origins,
        }
    }
}
