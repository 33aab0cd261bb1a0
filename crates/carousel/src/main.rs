use carousel::app::App;
use carousel::cli::{Cli, Commands};
use carousel::config;
use carousel::sys::{runtime, server};
use clap::Parser;
use ringmenu::Renderer;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", config::DEFAULT_CONFIG);
        return Ok(());
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let overrides = cli.overrides();
    let mut config = config::load_or_default(&config_path);
    overrides.apply(&mut config);

    match &cli.command {
        Some(Commands::Send { words }) => {
            return server::send_command(&config.socket_path, &words.join(" "));
        }
        Some(Commands::Init) => {
            let path = config::write_default_config(&config_path)?;
            println!("{}", path.display());
            return Ok(());
        }
        None => {}
    }

    let renderer = build_renderer(&cli)?;
    let (tx, rx) = async_channel::bounded(64);

    // Start Background Services
    runtime::start_background_services(tx, config.socket_path.clone(), config_path.clone());

    let app = App::new(&config, config_path, overrides, renderer);
    log::info!(
        "carousel running at {:?} per frame",
        app.frame_interval()
    );

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(app.run(rx))
}

#[cfg(feature = "snapshot")]
fn build_renderer(cli: &Cli) -> anyhow::Result<Box<dyn Renderer>> {
    use carousel::render::{LogRenderer, SnapshotRenderer};

    let renderer: Box<dyn Renderer> = match &cli.snapshot_dir {
        Some(dir) => Box::new(SnapshotRenderer::new(dir.clone())?),
        None => Box::new(LogRenderer::new()),
    };
    Ok(renderer)
}

#[cfg(not(feature = "snapshot"))]
fn build_renderer(_cli: &Cli) -> anyhow::Result<Box<dyn Renderer>> {
    Ok(Box::new(carousel::render::LogRenderer::new()))
}
