//! Telegram adapter (teloxide).
//!
//! This crate implements the `fitbot-core` MessagingPort over Telegram Bot API
//! and feeds Telegram updates into [`fitbot_core::app::BotApp`].

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
        KeyboardRemove, ParseMode,
    },
};

pub mod handlers;
pub mod router;

use fitbot_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, ReplyKeyboard, ReplyMarkup},
    },
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

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

fn inline_markup(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|b| InlineKeyboardButton::callback(b.label, b.callback_data))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn reply_keyboard(keyboard: ReplyKeyboard) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = keyboard
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .collect();
    KeyboardMarkup::new(rows)
        .resize_keyboard(keyboard.resized)
        .one_time_keyboard(keyboard.one_time)
}

fn tg_markup(markup: ReplyMarkup) -> teloxide::types::ReplyMarkup {
    match markup {
        ReplyMarkup::Inline(kb) => teloxide::types::ReplyMarkup::InlineKeyboard(inline_markup(kb)),
        ReplyMarkup::Keyboard(kb) => teloxide::types::ReplyMarkup::Keyboard(reply_keyboard(kb)),
        ReplyMarkup::RemoveKeyboard => {
            teloxide::types::ReplyMarkup::KeyboardRemove(KeyboardRemove::new())
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html);
        if let Some(markup) = markup {
            req = req.reply_markup(tg_markup(markup));
        }
        let msg = req.await.map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        let mut req = self
            .bot
            .edit_message_text(
                Self::tg_chat(msg.chat_id),
                Self::tg_msg_id(msg.message_id),
                html.to_string(),
            )
            .parse_mode(ParseMode::Html);
        if let Some(kb) = keyboard {
            req = req.reply_markup(inline_markup(kb));
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(t) = text {
            req = req.text(t.to_string());
        }
        if show_alert {
            req = req.show_alert(true);
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitbot_core::messaging::types::InlineButton;

    #[test]
    fn inline_rows_keep_their_shape() {
        let kb = InlineKeyboard::default()
            .row(vec![
                InlineButton::new("1. Спина", "split:back_traps"),
                InlineButton::new("Шраги", "split:back_traps"),
            ])
            .row(vec![InlineButton::new("Готово", "workout:done")]);

        let markup = inline_markup(kb);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "Готово");
    }

    #[test]
    fn one_time_keyboard_has_single_button() {
        let markup = reply_keyboard(ReplyKeyboard::one_time("нет"));
        assert_eq!(markup.keyboard.len(), 1);
        assert_eq!(markup.keyboard[0][0].text, "нет");
    }

    #[test]
    fn remove_keyboard_maps_to_keyboard_remove() {
        assert!(matches!(
            tg_markup(ReplyMarkup::RemoveKeyboard),
            teloxide::types::ReplyMarkup::KeyboardRemove(_)
        ));
    }
}
