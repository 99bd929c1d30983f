use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use podview::app::{self, App};
use podview::config::{Cli, Settings, init_file_logging, init_stderr_logging};
use podview::dump::dump;
use podview::player::clock_media_factory;
use podview::podcast_fetch::{HttpPodcastApi, PodcastApi};
use podview::view::controller::ViewController;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;

    if cli.dump {
        init_stderr_logging(cli.log_level);
    } else {
        init_file_logging(&cli.log_file, cli.log_level)?;
    }
    info!("podview starting against {}", settings.server);

    let api: Arc<dyn PodcastApi> = Arc::new(
        HttpPodcastApi::new(settings.server.clone()).context("creating HTTP client")?,
    );

    if cli.dump {
        let mut stdout = std::io::stdout().lock();
        return dump(api.as_ref(), cli.episodes, settings.truncation, &mut stdout).await;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let controller = ViewController::new(api, tx, clock_media_factory(), settings.truncation);
    let app = App::new(controller, settings.theme);

    app::start_ui(app, rx)
}
