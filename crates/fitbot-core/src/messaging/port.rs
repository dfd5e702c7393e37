use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{InlineKeyboard, ReplyMarkup},
    Result,
};

/// Outbound side of the messaging gateway.
///
/// The flows only ever talk to this trait; the Telegram adapter implements it
/// over teloxide and tests implement it with recording fakes.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send an HTML-formatted message, optionally with a keyboard attached.
    async fn send_html(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef>;

    /// Replace the text (and inline keyboard) of a previously sent message.
    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()>;

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()>;
}

/// Edit a message and swallow any failure.
///
/// Used for cosmetic refreshes (live cards) that must never interrupt the
/// conversation step that triggered them.
pub async fn edit_best_effort(
    messenger: &dyn MessagingPort,
    msg: MessageRef,
    html: &str,
    keyboard: Option<InlineKeyboard>,
) {
    if let Err(e) = messenger.edit_html(msg, html, keyboard).await {
        tracing::debug!(
            chat_id = msg.chat_id.0,
            message_id = msg.message_id.0,
            error = %e,
            "card edit skipped"
        );
    }
}
