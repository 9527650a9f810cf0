use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, trace};

use crate::errors::{MoondreamError, Result};
use crate::models::{CaptionOptions, CaptionRequest, ObjectRequest, QueryRequest};

const DEFAULT_BASE_URL: &str = "https://api.moondream.ai/v1";
const API_KEY_ENV: &str = "MOONDREAM_API_KEY";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use moondream::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> moondream::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("md_your_api_key")
///     .base_url("https://moondream.internal.example.com/v1")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the base URL (defaults to `https://api.moondream.ai/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set an overall request timeout. By default no timeout is applied.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Build the [`Client`].
    ///
    /// If no API key was set via [`api_key`](Self::api_key), the builder will
    /// attempt to read the `MOONDREAM_API_KEY` environment variable.
    ///
    /// Returns [`MoondreamError::InvalidArgument`] if no non-empty key is
    /// available or the key cannot be sent as an HTTP header.
    pub fn build(self) -> Result<Client> {
        let api_key = resolve_api_key(self.api_key, || std::env::var(API_KEY_ENV).ok())?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            MoondreamError::InvalidArgument(
                "API key contains characters that are not valid in an HTTP header".into(),
            )
        })?;
        auth.set_sensitive(true);

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;

        Ok(Client {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key,
            auth,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the explicit key, else the one from `env`. Blank keys count as missing.
fn resolve_api_key(
    explicit: Option<String>,
    env: impl FnOnce() -> Option<String>,
) -> Result<String> {
    explicit
        .or_else(env)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            MoondreamError::InvalidArgument(
                "API key is required. Pass it to ClientBuilder::api_key() \
                 or set the MOONDREAM_API_KEY environment variable."
                    .into(),
            )
        })
}

/// The Moondream API client.
///
/// Every method sends exactly one `POST` and returns the response body as-is.
/// Non-2xx responses are *not* turned into errors; inspect the returned body
/// if you need to tell them apart.
///
/// # Example
///
/// ```no_run
/// use moondream::Client;
///
/// # async fn example() -> moondream::Result<()> {
/// let client = Client::new("md_your_api_key")?;
///
/// let answer = client
///     .query("https://example.com/cat.jpg", "What is in this image?")
///     .await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    auth: HeaderValue,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client with the given API key and default settings.
    ///
    /// Fails with [`MoondreamError::InvalidArgument`] if the key is empty.
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// The API key this client authenticates with.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask a free-form question about an image.
    ///
    /// Sends `{"image_url", "prompt"}` to `/query`.
    pub async fn query(&self, image_url: &str, prompt: &str) -> Result<String> {
        self.post("/query", &QueryRequest { image_url, prompt }).await
    }

    /// Detect bounding boxes of `object` in an image.
    ///
    /// Sends `{"image_url", "object"}` to `/detect`.
    pub async fn detect(&self, image_url: &str, object: &str) -> Result<String> {
        self.post("/detect", &ObjectRequest { image_url, object }).await
    }

    /// Locate center points of `object` in an image.
    ///
    /// Sends `{"image_url", "object"}` to `/point`.
    pub async fn point(&self, image_url: &str, object: &str) -> Result<String> {
        self.post("/point", &ObjectRequest { image_url, object }).await
    }

    /// Caption an image.
    ///
    /// Sends `{"image_url", "length", "stream"}` to `/caption`. With
    /// [`CaptionOptions::stream`] set, the body is read chunk by chunk and each
    /// chunk is handed to [`CaptionOptions::on_chunk`] as it arrives. The full
    /// body is returned in both modes; without a consumer, streaming simply
    /// buffers everything.
    ///
    /// # Errors
    ///
    /// - [`MoondreamError::InvalidArgument`] if `image_url` is empty.
    /// - [`MoondreamError::Http`] if the transport fails, including mid-stream.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use moondream::{CaptionOptions, Client};
    ///
    /// # async fn example() -> moondream::Result<()> {
    /// let client = Client::new("md_your_api_key")?;
    /// let opts = CaptionOptions::default()
    ///     .stream(true)
    ///     .on_chunk(|chunk| print!("{}", String::from_utf8_lossy(chunk)));
    ///
    /// let full = client.caption("https://example.com/cat.jpg", Some(opts)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn caption(&self, image_url: &str, opts: Option<CaptionOptions>) -> Result<String> {
        if image_url.is_empty() {
            return Err(MoondreamError::InvalidArgument("image_url is required".into()));
        }

        let opts = opts.unwrap_or_default();
        debug!(stream = opts.stream, length = %opts.length, "requesting caption");

        let body = CaptionRequest {
            image_url,
            length: &opts.length,
            stream: opts.stream,
        };
        let response = self.send("/caption", &body).await?;

        let on_chunk = if opts.stream { opts.on_chunk } else { None };
        read_body(response, on_chunk).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Send a request and collect the whole body, whatever the status code.
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let response = self.send(path, body).await?;
        read_body(response, None).await
    }

    /// Issue a single authenticated JSON `POST`. No retries.
    async fn send<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "sending request");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth.clone())
            .json(body)
            .send()
            .await?;

        debug!(%url, status = response.status().as_u16(), "received response");
        Ok(response)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Drain a response body, passing each raw chunk to `on_chunk` before appending
/// it, then decode the whole body with the charset named in `Content-Type`.
/// All operations read their body here, streamed or not.
async fn read_body(
    mut response: reqwest::Response,
    mut on_chunk: Option<Box<dyn FnMut(&[u8]) + Send>>,
) -> Result<String> {
    let encoding = response_encoding(&response);
    let mut body = Vec::new();
    let mut count = 0usize;

    while let Some(chunk) = response.chunk().await? {
        if let Some(f) = on_chunk.as_mut() {
            f(&chunk[..]);
        }
        body.extend_from_slice(&chunk);
        count += 1;
    }

    trace!(chunks = count, bytes = body.len(), encoding = encoding.name(), "body complete");
    let (text, _, _) = encoding.decode(&body);
    Ok(text.into_owned())
}

/// Charset from the response `Content-Type`, falling back to UTF-8.
fn response_encoding(response: &reqwest::Response) -> &'static Encoding {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .and_then(|m| {
            m.get_param(mime::CHARSET)
                .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
        })
        .unwrap_or(UTF_8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let client = ClientBuilder::new().api_key("key").build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.api_key(), "key");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ClientBuilder::new()
            .api_key("key")
            .base_url("http://localhost:8080/v1/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = Client::new("").unwrap_err();
        assert!(matches!(err, MoondreamError::InvalidArgument(_)));

        let err = Client::new("   ").unwrap_err();
        assert!(matches!(err, MoondreamError::InvalidArgument(_)));
    }

    #[test]
    fn key_with_newline_is_rejected() {
        let err = Client::new("abc\ndef").unwrap_err();
        assert!(matches!(err, MoondreamError::InvalidArgument(_)));
    }

    #[test]
    fn key_falls_back_to_environment() {
        let err = resolve_api_key(None, || None).unwrap_err();
        assert!(matches!(err, MoondreamError::InvalidArgument(_)));

        let key = resolve_api_key(None, || Some("from_env".into())).unwrap();
        assert_eq!(key, "from_env");

        let err = resolve_api_key(None, || Some("  ".into())).unwrap_err();
        assert!(matches!(err, MoondreamError::InvalidArgument(_)));
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let key = resolve_api_key(Some("explicit".into()), || Some("from_env".into())).unwrap();
        assert_eq!(key, "explicit");

        // An explicit blank key is not replaced by the environment.
        let err = resolve_api_key(Some(String::new()), || Some("from_env".into())).unwrap_err();
        assert!(matches!(err, MoondreamError::InvalidArgument(_)));
    }

    #[test]
    fn debug_output_hides_key() {
        let client = Client::new("super_secret").unwrap();
        let out = format!("{client:?}");
        assert!(!out.contains("super_secret"));
    }
}
