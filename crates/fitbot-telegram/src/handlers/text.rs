use std::sync::Arc;

use teloxide::prelude::*;

use fitbot_core::{domain::ChatId, messaging::types::IncomingUpdate};

use super::sender_from;
use crate::router::AppState;

pub async fn handle_text(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = ChatId(msg.chat.id.0);
    let from = msg.from().map(sender_from);
    let update = IncomingUpdate::from_text(chat_id, from, text);

    // Sequentialize updates per chat so form steps never interleave.
    let _guard = state.chat_locks.lock_chat(chat_id.0).await;
    if let Err(e) = state.app.handle(update).await {
        tracing::warn!(chat_id = chat_id.0, error = %e, "message handling failed");
    }
    Ok(())
}
