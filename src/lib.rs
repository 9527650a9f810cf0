//! # Moondream client for Rust
//!
//! A thin async client for the [Moondream](https://moondream.ai) image
//! understanding API: ask questions about an image, detect or point at
//! objects, and caption images -- optionally streaming the caption as it is
//! generated.
//!
//! Responses are returned as raw strings. The client does not parse them and
//! does not treat non-2xx statuses as errors; only local argument problems and
//! transport failures surface as [`MoondreamError`].
//!
//! ## Quick start
//!
//! ```no_run
//! use moondream::Client;
//!
//! #[tokio::main]
//! async fn main() -> moondream::Result<()> {
//!     let client = Client::new("md_your_api_key")?;
//!     let image = "https://example.com/image.jpg";
//!
//!     println!("{}", client.query(image, "What is in this image?").await?);
//!     println!("{}", client.detect(image, "cat").await?);
//!     println!("{}", client.point(image, "cat").await?);
//!     println!("{}", client.caption(image, None).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming captions
//!
//! ```no_run
//! use moondream::{CaptionOptions, Client};
//!
//! # async fn example() -> moondream::Result<()> {
//! let client = Client::new("md_your_api_key")?;
//! let opts = CaptionOptions::default()
//!     .length("short")
//!     .stream(true)
//!     .on_chunk(|chunk| print!("{}", String::from_utf8_lossy(chunk)));
//!
//! let body = client.caption("https://example.com/image.jpg", Some(opts)).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod errors;
mod models;

pub use client::{Client, ClientBuilder};
pub use errors::{MoondreamError, Result};
pub use models::{CaptionOptions, DEFAULT_CAPTION_LENGTH};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
