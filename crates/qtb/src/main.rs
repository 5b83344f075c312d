use std::sync::Arc;

use teloxide::Bot;

use qtb_core::{
    config::Config,
    dispatcher::Dispatcher,
    logging,
    session::{FileSessionStore, MemorySessionStore, SessionStore},
};
use qtb_queue::HttpQueueClient;
use qtb_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> Result<(), qtb_core::Error> {
    logging::init("qtb")?;

    let cfg = Config::load()?;

    let store: Arc<dyn SessionStore> = match &cfg.session_file {
        Some(path) => Arc::new(FileSessionStore::open(path)?),
        None => Arc::new(MemorySessionStore::default()),
    };

    let lookup = Arc::new(HttpQueueClient::new(
        cfg.queue_lookup_url.clone(),
        cfg.lookup_timeout,
    ));

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));

    let dispatcher = Arc::new(Dispatcher::new(store, lookup, messenger));

    qtb_telegram::router::run_polling(bot, dispatcher)
        .await
        .map_err(|e| qtb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
