use serde::Serialize;

/// Default caption length sent when none is given.
pub const DEFAULT_CAPTION_LENGTH: &str = "normal";

/// Options for [`Client::caption`](crate::Client::caption).
///
/// # Example
///
/// ```
/// use moondream::CaptionOptions;
///
/// let opts = CaptionOptions::default().length("short").stream(true);
/// assert_eq!(opts.length, "short");
/// assert!(opts.stream);
/// ```
pub struct CaptionOptions {
    /// Passed through to the API as-is, e.g. "normal" or "short". Default: "normal".
    pub length: String,
    /// Ask the API to stream its response. Default: false.
    pub stream: bool,
    /// Called with each raw body chunk as it arrives, only when `stream` is set.
    #[allow(clippy::type_complexity)]
    pub on_chunk: Option<Box<dyn FnMut(&[u8]) + Send>>,
}

impl CaptionOptions {
    /// Set the caption length hint.
    pub fn length(mut self, length: impl Into<String>) -> Self {
        self.length = length.into();
        self
    }

    /// Enable or disable streaming.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Install a chunk consumer. Implies nothing about `stream`; the consumer
    /// is ignored unless streaming is enabled.
    pub fn on_chunk(mut self, f: impl FnMut(&[u8]) + Send + 'static) -> Self {
        self.on_chunk = Some(Box::new(f));
        self
    }
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_CAPTION_LENGTH.to_string(),
            stream: false,
            on_chunk: None,
        }
    }
}

impl std::fmt::Debug for CaptionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionOptions")
            .field("length", &self.length)
            .field("stream", &self.stream)
            .field("on_chunk", &self.on_chunk.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Request bodies (not part of the public API surface)
// ---------------------------------------------------------------------------

/// POST /query body.
#[derive(Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub image_url: &'a str,
    pub prompt: &'a str,
}

/// POST /detect and POST /point body.
#[derive(Serialize)]
pub(crate) struct ObjectRequest<'a> {
    pub image_url: &'a str,
    pub object: &'a str,
}

/// POST /caption body.
#[derive(Serialize)]
pub(crate) struct CaptionRequest<'a> {
    pub image_url: &'a str,
    pub length: &'a str,
    pub stream: bool,
}
