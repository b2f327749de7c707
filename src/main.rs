use std::fs::OpenOptions;
use std::io;
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use pescabot_rs::config::Config;
use pescabot_rs::engine::bot::Dispatcher;
use pescabot_rs::transport::{self, IncomingMessage, OutgoingReply};
use pescabot_rs::tui::app::App;
use pescabot_rs::tui::events;
use pescabot_rs::tui::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_create("config.toml")?;

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.system.log_file)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let dispatcher = Arc::new(Dispatcher::from_config(&config).await?);

    let (message_tx, message_rx) = mpsc::channel::<IncomingMessage>(100);
    let (reply_tx, mut reply_rx) = mpsc::channel::<OutgoingReply>(100);
    let _processor = tokio::spawn(transport::run_event_processor(dispatcher.clone(), message_rx, reply_tx));

    // Setup TUI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone());
    app.add_log(format!("Storage backend: {:?}", config.system.backend));

    let res = run_app(&mut terminal, &mut app, &dispatcher, &message_tx, &mut reply_rx).await;

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
    message_tx: &mpsc::Sender<IncomingMessage>,
    reply_rx: &mut mpsc::Receiver<OutgoingReply>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        if app.should_quit {
            return Ok(());
        }

        events::handle_events(app)?;

        for message in app.take_outbox() {
            message_tx.send(message).await?;
        }

        while let Ok(reply) = reply_rx.try_recv() {
            app.on_reply(reply);
        }

        if app.profile_stale {
            app.profile_stale = false;
            match dispatcher.peek(&app.user_id).await {
                Ok(record) => app.profile = record,
                Err(e) => app.add_log(format!("Could not read {}: {}", app.user_id, e)),
            }
        }
    }
}
