mod app;
mod capture;
mod commands;
mod config;
mod face;
mod logging;
mod overlay;
mod recording;
mod speech;
mod ui;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
