use std::sync::Arc;

use teloxide::{dispatching::Dispatcher as UpdateDispatcher, dptree, prelude::*};

use qtb_core::{dispatcher::Dispatcher, domain::ConversationId};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub bot_name: String,
}

/// Run the bot in long-polling mode until the process is stopped.
pub async fn run_polling(bot: Bot, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    // The bot's own username is what the command router strips from
    // `/cmd@name` mentions in group chats.
    let me = bot.get_me().await?;
    let bot_name = me.username().to_string();
    tracing::info!("@{bot_name} running... Press Ctrl+C to exit");

    let state = Arc::new(AppState {
        dispatcher,
        bot_name,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    UpdateDispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    // Only text messages drive the dispatcher; stickers, photos and the rest
    // are not part of this bot's conversation model.
    let Some(text) = msg.text() else {
        return Ok(());
    };

    state
        .dispatcher
        .on_message(ConversationId(msg.chat.id.0), text, &state.bot_name)
        .await;

    Ok(())
}
