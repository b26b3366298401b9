//! Render a layer map into an HTML file.
//! Run with: cargo run --example render_to_file -- map.html landcover_2020 burn_2020 Brazil
//!
//! Credentials are read from `GEE_PROJECT` and `GEE_ACCESS_TOKEN` (a `.env` file works too).

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .context("usage: render_to_file <output.html> <layer>...")?;
    let layers: Vec<String> = args.collect();
    if layers.is_empty() {
        anyhow::bail!("no layers given");
    }

    let html = geolayer::render_layers(&layers).await?;
    std::fs::write(&output, html).with_context(|| format!("failed to write {output}"))?;
    log::info!("Map with {} layer(s) written to {output}", layers.len());

    Ok(())
}
