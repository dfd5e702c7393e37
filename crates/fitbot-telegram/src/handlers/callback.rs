use std::sync::Arc;

use teloxide::prelude::*;

use fitbot_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::{CallbackQuery as CoreCallback, IncomingUpdate},
};

use super::sender_from;
use crate::router::AppState;

fn to_core(q: &CallbackQuery) -> CoreCallback {
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });
    CoreCallback {
        chat_id: message.map(|m| m.chat_id),
        from: Some(sender_from(&q.from)),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message,
    }
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let core = to_core(&q);

    // Buttons on messages we cannot see: nothing to route, just stop the spinner.
    let Some(chat_id) = core.chat_id else {
        let _ = bot.answer_callback_query(q.id).await;
        return Ok(());
    };

    let _guard = state.chat_locks.lock_chat(chat_id.0).await;
    if let Err(e) = state.app.handle(IncomingUpdate::Callback(core)).await {
        tracing::warn!(chat_id = chat_id.0, error = %e, "callback handling failed");
        let _ = bot.answer_callback_query(q.id).await;
    }
    Ok(())
}
