/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

use crate::utils::{StreamError, mask_secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Vendor domain used when a connection does not name one.
pub const DEFAULT_DOMAIN: &str = "socialgist.com";

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

/// Identity and credentials of a single stream endpoint.
///
/// All fields are opaque strings: nothing here is validated, that is left to
/// whoever builds the value (the bundled CLI, for instance). Once handed to a
/// [`StreamClient`](crate::client::StreamClient) the client owns its own copy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Endpoint domain, `socialgist.com` unless overridden.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Basic-auth user name.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Data source id, first half of the stream identifier.
    pub data_source: String,
    /// Stream name, second half of the stream identifier.
    pub stream_name: String,
    /// Subscription the client reads from.
    pub subscription_name: String,
    /// Customer name, used as the host label in front of the domain.
    pub customer_name: String,
}

impl Connection {
    /// Creates a connection on the default domain.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        data_source: impl Into<String>,
        stream_name: impl Into<String>,
        subscription_name: impl Into<String>,
        customer_name: impl Into<String>,
    ) -> Self {
        Self {
            domain: default_domain(),
            username: username.into(),
            password: password.into(),
            data_source: data_source.into(),
            stream_name: stream_name.into(),
            subscription_name: subscription_name.into(),
            customer_name: customer_name.into(),
        }
    }

    /// Replaces the endpoint domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Returns the same connection with an empty domain replaced by [`DEFAULT_DOMAIN`].
    pub(crate) fn normalized(mut self) -> Self {
        if self.domain.is_empty() {
            self.domain = default_domain();
        }
        self
    }

    /// The `https://{customer}.{domain}/` origin serving this stream.
    pub fn origin(&self) -> Result<Url, StreamError> {
        Ok(Url::parse(&format!(
            "https://{}.{}/",
            self.customer_name, self.domain
        ))?)
    }

    /// The full stream URL:
    /// `https://{customer}.{domain}/stream/{data_source}_{stream_name}/subscription/{subscription_name}/part/1/data.json`.
    pub fn stream_url(&self) -> Result<Url, StreamError> {
        self.stream_url_on(&self.origin()?)
    }

    /// Appends the stream path to `base` instead of the vendor origin.
    ///
    /// Each field becomes exactly one percent-encoded path segment, so a `/` inside
    /// a name cannot change the shape of the path.
    pub fn stream_url_on(&self, base: &Url) -> Result<Url, StreamError> {
        let mut url = base.clone();
        let stream_id = format!("{}_{}", self.data_source, self.stream_name);
        url.path_segments_mut()
            .map_err(|_| StreamError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend([
                "stream",
                stream_id.as_str(),
                "subscription",
                self.subscription_name.as_str(),
                "part",
                "1",
                "data.json",
            ]);
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &mask_secret(&self.password))
            .field("data_source", &self.data_source)
            .field("stream_name", &self.stream_name)
            .field("subscription_name", &self.subscription_name)
            .field("customer_name", &self.customer_name)
            .finish()
    }
}
