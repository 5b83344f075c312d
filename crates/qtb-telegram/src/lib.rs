//! Telegram adapter (teloxide).
//!
//! Implements the `qtb-core` MessagingPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup as TgReplyMarkup},
};

use tokio::time::sleep;

pub mod router;

use qtb_core::{
    domain::ConversationId,
    errors::Error,
    messaging::{port::MessagingPort, types::ReplyMarkup},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat: ConversationId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn reply(&self, chat: ConversationId, text: &str, markup: ReplyMarkup) -> Result<()> {
        let tg_markup = match markup {
            ReplyMarkup::None => None,
            ReplyMarkup::Select(list) => {
                Some(TgReplyMarkup::Keyboard(selection_keyboard(&list.options)))
            }
            ReplyMarkup::Clear => Some(TgReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        };

        self.with_retry(|| {
            let mut req = self.bot.send_message(Self::tg_chat(chat), text.to_string());
            if let Some(m) = tg_markup.clone() {
                req = req.reply_markup(m);
            }
            req
        })
        .await?;
        Ok(())
    }
}

/// One option per row, shown once; Telegram sends the tapped label back as a
/// plain text message.
fn selection_keyboard(options: &[String]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = options
        .iter()
        .map(|option| vec![KeyboardButton::new(option.clone())])
        .collect();
    KeyboardMarkup::new(rows)
        .one_time_keyboard(true)
        .resize_keyboard(true)
}
