/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

use crate::connection::{Connection, StreamOptions};
use crate::utils::StreamError;
use reqwest::header::{ACCEPT, HeaderValue};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Everything needed to open one stream, resolved from a connection and an
/// options snapshot.
pub(crate) struct StreamRequest {
    pub(crate) url: Url,
    http: reqwest::Client,
    username: String,
    password: String,
}

impl StreamRequest {
    /// Resolves the stream URL and builds an HTTP client without a request timeout.
    pub(crate) fn new(
        connection: &Connection,
        options: &StreamOptions,
    ) -> Result<Self, StreamError> {
        let url = match options.get_endpoint() {
            Some(base) => connection.stream_url_on(base)?,
            None => connection.stream_url()?,
        };

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if !options.get_system_proxy() {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(StreamError::ClientSetup)?;

        Ok(Self {
            url,
            http,
            username: connection.username.clone(),
            password: connection.password.clone(),
        })
    }

    pub(crate) fn to_request(&self) -> reqwest::RequestBuilder {
        self.http
            .get(self.url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Sends the request and checks for a `200 OK`.
    pub(crate) async fn open(&self) -> Result<reqwest::Response, StreamError> {
        let response = self
            .to_request()
            .send()
            .await
            .map_err(StreamError::Connect)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(StreamError::InvalidStatus(status.as_u16()));
        }
        Ok(response)
    }
}
