use anyhow::Result;
use log::info;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use pescabot_rs::config::Config;
use pescabot_rs::engine::bot::Dispatcher;
use pescabot_rs::transport::{self, IncomingMessage, OutgoingReply};

/// Line-oriented console: each stdin line is `<user>: <text>` or a bare
/// command for the default user; replies are printed to stdout.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_create("config.toml")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    info!("Loaded config.");
    let dispatcher = Arc::new(Dispatcher::from_config(&config).await?);

    let (message_tx, message_rx) = mpsc::channel::<IncomingMessage>(100);
    let (reply_tx, mut reply_rx) = mpsc::channel::<OutgoingReply>(100);

    let processor = tokio::spawn(transport::run_event_processor(dispatcher, message_rx, reply_tx));

    let printer = tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            println!("[{}]\n{}\n", reply.user_id, reply.text);
        }
    });

    info!("Reading commands from stdin as {:?}", config.system.default_user);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(message) = IncomingMessage::from_console_line(&line, &config.system.default_user) {
            message_tx.send(message).await?;
        }
    }

    // EOF: let pending commands finish and their replies print.
    drop(message_tx);
    processor.await?;
    printer.await?;

    Ok(())
}
