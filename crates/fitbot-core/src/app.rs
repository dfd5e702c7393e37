//! Routes messenger-neutral updates to the lead form and the workout log.
//!
//! Text goes to the lead form while it is mid-questionnaire, otherwise to an
//! open workout session, otherwise back to the lead form's idle replies.

use std::sync::Arc;

use crate::{
    domain::ChatId,
    formatting::escape_html,
    lead::{LeadForm, CANCEL_FORM_CALLBACK},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, TextMessage},
    },
    ports::{CommandsCatalog, RemoteCommand},
    workout::{keyboards::WorkoutCallback, WorkoutLog},
    Result,
};

const HELP: &str = "<b>Команды</b>\n\
/start - записаться на интенсив\n\
/cancel - отменить заявку\n\
/workout - записать тренировку\n\
/commands - список команд клуба\n\
/help - эта подсказка";
const COMMANDS_UNAVAILABLE: &str =
    "<b>Список команд недоступен</b> <i>(попробуйте позже)</i>.";
const COMMANDS_EMPTY: &str = "<b>Список команд пуст</b>.";

pub struct BotApp {
    lead: LeadForm,
    workout: WorkoutLog,
    catalog: Option<Arc<dyn CommandsCatalog>>,
    messenger: Arc<dyn MessagingPort>,
}

impl BotApp {
    pub fn new(lead: LeadForm, workout: WorkoutLog, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            lead,
            workout,
            catalog: None,
            messenger,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CommandsCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn lead(&self) -> &LeadForm {
        &self.lead
    }

    pub fn workout(&self) -> &WorkoutLog {
        &self.workout
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Text(msg) => self.handle_text(msg).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    async fn handle_command(&self, cmd: Command) -> Result<()> {
        match cmd.name.as_str() {
            "start" => self.lead.start(cmd.chat_id).await,
            "cancel" => self.lead.cancel(cmd.chat_id).await,
            "workout" => self.workout.begin(cmd.chat_id).await,
            "commands" => self.list_commands(cmd.chat_id).await,
            "help" => self.reply(cmd.chat_id, HELP).await,
            _ => {
                self.handle_text(TextMessage {
                    chat_id: cmd.chat_id,
                    from: cmd.from,
                    text: cmd.raw,
                })
                .await
            }
        }
    }

    async fn handle_text(&self, msg: TextMessage) -> Result<()> {
        let chat_id = msg.chat_id;
        if !self.lead.is_active(chat_id).await && self.workout_open(chat_id).await {
            return self.workout.handle_text(chat_id, &msg.text).await;
        }
        self.lead
            .handle_text(chat_id, msg.from.as_ref(), &msg.text)
            .await
    }

    async fn handle_callback(&self, q: CallbackQuery) -> Result<()> {
        if q.data == CANCEL_FORM_CALLBACK {
            return self.lead.cancel_callback(&q).await;
        }
        if let Some(cb) = WorkoutCallback::parse(&q.data) {
            return self.workout.handle_callback(&q, cb).await;
        }
        tracing::debug!(data = %q.data, "unrouted callback");
        self.messenger
            .answer_callback_query(&q.callback_id, None, false)
            .await
    }

    async fn workout_open(&self, chat_id: ChatId) -> bool {
        match self.workout.has_session(chat_id).await {
            Ok(open) => open,
            Err(e) => {
                tracing::warn!(chat_id = chat_id.0, error = %e, "workout session lookup failed");
                false
            }
        }
    }

    async fn list_commands(&self, chat_id: ChatId) -> Result<()> {
        let Some(catalog) = &self.catalog else {
            return self.reply(chat_id, COMMANDS_UNAVAILABLE).await;
        };
        let html = match catalog.list_commands().await {
            Ok(cmds) if cmds.is_empty() => COMMANDS_EMPTY.to_string(),
            Ok(cmds) => render_commands(&cmds),
            Err(e) => {
                tracing::warn!(chat_id = chat_id.0, error = %e, "commands catalog request failed");
                COMMANDS_UNAVAILABLE.to_string()
            }
        };
        self.reply(chat_id, &html).await
    }

    async fn reply(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.messenger.send_html(chat_id, html, None).await?;
        Ok(())
    }
}

fn render_commands(cmds: &[RemoteCommand]) -> String {
    let mut out = String::from("<b>Команды клуба</b>");
    for c in cmds {
        let name = escape_html(c.command.trim_start_matches('/'));
        out.push_str(&format!("\n/{name}"));
        if let Some(desc) = c.description.as_deref().filter(|d| !d.trim().is_empty()) {
            out.push_str(&format!(" - {}", escape_html(desc)));
        }
    }
    out
}
