//! Recording fakes for flow tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, ReplyMarkup},
    },
    Result,
};

#[derive(Clone, Debug)]
pub struct Sent {
    pub chat_id: ChatId,
    pub html: String,
    pub markup: Option<ReplyMarkup>,
}

#[derive(Clone, Debug)]
pub struct Answered {
    pub callback_id: String,
    pub text: Option<String>,
    pub show_alert: bool,
}

/// Records every outbound call. Sends to chats listed in `failing_chats`
/// and, when `fail_edits` is set, all edits return an error.
#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    pub sends: Mutex<Vec<Sent>>,
    pub edits: Mutex<Vec<(MessageRef, String)>>,
    pub answers: Mutex<Vec<Answered>>,
    pub failing_chats: Vec<ChatId>,
    pub fail_edits: bool,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    pub fn failing_for(chat_id: ChatId) -> Self {
        Self {
            failing_chats: vec![chat_id],
            ..Self::new()
        }
    }

    pub fn with_failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sends.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id == chat_id)
            .collect()
    }

    pub fn edited(&self) -> Vec<(MessageRef, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn answered(&self) -> Vec<Answered> {
        self.answers.lock().unwrap().clone()
    }

    pub fn last_sent_html(&self) -> String {
        self.sent().last().map(|s| s.html.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        if self.failing_chats.contains(&chat_id) {
            return Err(Error::External("chat not found".to_string()));
        }
        self.sends.lock().unwrap().push(Sent {
            chat_id,
            html: html.to_string(),
            markup,
        });
        let mut guard = self.next_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        _keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        if self.fail_edits {
            return Err(Error::External("message is not modified".to_string()));
        }
        self.edits.lock().unwrap().push((msg, html.to_string()));
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        self.answers.lock().unwrap().push(Answered {
            callback_id: callback_id.to_string(),
            text: text.map(|t| t.to_string()),
            show_alert,
        });
        Ok(())
    }
}
