use std::fs::File;
use std::sync::Mutex;

use smartbath_panel::{
    app::App,
    config::PanelConfig,
    dispatch::Dispatcher,
    log_info,
    state::StateStore,
    util::{
        io::{broker::ConnectionManager, bus::MessageBus, event::EventHandler},
        log::log_dir,
    },
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(Mutex::new(File::create(log_dir.join("trace.log"))?))
        .init();

    let config = PanelConfig::load()?;
    log_info!("Starting panel with {:?}", config);

    // Connect before taking over the terminal so failures print plainly
    let bus = MessageBus::new();
    let connection = ConnectionManager::connect(&config.broker, &config.topics.subscribe, bus.clone()).await?;

    let dispatcher = Dispatcher::new(
        StateStore::default(),
        connection.publisher(),
        config.topics.publish.clone(),
        config.debit_policy,
    );

    let terminal = ratatui::init();
    let app = App::new(dispatcher, connection.bus(), &config.topics.subscribe, EventHandler::new());
    let result = app.run(terminal).await;
    ratatui::restore();

    connection.shutdown().await;
    result
}
