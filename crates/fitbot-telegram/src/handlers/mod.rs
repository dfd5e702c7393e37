//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into the messenger-neutral
//! [`IncomingUpdate`](fitbot_core::messaging::types::IncomingUpdate), takes
//! the per-chat lock and hands it to the core app. Flow errors are logged,
//! never returned to the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, User},
};

use fitbot_core::domain::{Sender, UserId};

use crate::router::AppState;

mod callback;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.text().is_some() {
        return text::handle_text(bot, msg, state).await;
    }

    tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
    Ok(())
}

pub(crate) fn sender_from(user: &User) -> Sender {
    Sender {
        user_id: UserId(user.id.0 as i64),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}
