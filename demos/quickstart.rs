//! Quick-start examples for the Moondream Rust client.
//!
//! Run with:
//!   MOONDREAM_API_KEY=... cargo run --example quickstart
//!
//! Or pass the key directly in code (not recommended for production).

use std::io::Write;

use moondream::{CaptionOptions, ClientBuilder};

#[tokio::main]
async fn main() -> moondream::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Create a client (reads MOONDREAM_API_KEY from environment)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new().build()?;

    // Or provide the key directly:
    // let client = moondream::Client::new("md_abc123")?;

    let image = "https://example.com/image.jpg";

    // -----------------------------------------------------------------------
    // 2. Ask a question
    // -----------------------------------------------------------------------
    let answer = client.query(image, "What is in this image?").await?;
    println!("query:   {answer}");

    // -----------------------------------------------------------------------
    // 3. Detect and point at objects
    // -----------------------------------------------------------------------
    println!("detect:  {}", client.detect(image, "cat").await?);
    println!("point:   {}", client.point(image, "cat").await?);

    // -----------------------------------------------------------------------
    // 4. Caption, then stream a short caption chunk by chunk
    // -----------------------------------------------------------------------
    println!("caption: {}", client.caption(image, None).await?);

    let opts = CaptionOptions::default()
        .length("short")
        .stream(true)
        .on_chunk(|chunk| {
            print!("{}", String::from_utf8_lossy(chunk));
            let _ = std::io::stdout().flush();
        });

    print!("stream:  ");
    client.caption(image, Some(opts)).await?;
    println!();

    Ok(())
}
