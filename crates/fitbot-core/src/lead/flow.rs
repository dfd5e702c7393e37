//! Step machine driving the lead form for one chat at a time.

use std::sync::Arc;

use crate::{
    domain::{ChatId, Sender},
    lead::{
        render::{build_intro_message, build_lead_summary},
        state::{LeadState, LeadStep},
        store::LeadStateStore,
        validate::{is_valid_email, is_valid_phone},
    },
    messaging::{
        port::{edit_best_effort, MessagingPort},
        types::{CallbackQuery, InlineKeyboard, ReplyKeyboard, ReplyMarkup},
    },
    Result,
};

/// Callback payload of the inline "cancel" button under the card.
pub const CANCEL_FORM_CALLBACK: &str = "cancel_form";

/// Answer that means "no questions" at the last step.
pub const NO_QUESTIONS: &str = "нет";

const GREETING: &str = "привет";

const PROMPT_NAME: &str = "<b>Как к вам обращаться</b>\n<i>имя и, при желании, фамилия</i>?";
const PROMPT_PHONE: &str =
    "<b>Укажите номер телефона</b>\n<i>например, <code>+7 900 000-00-00</code></i>.";
const PROMPT_EMAIL: &str =
    "<b>Укажите электронную почту</b>\n<i>в формате <code>name@example.com</code></i>.";
const PROMPT_QUESTIONS: &str =
    "<b>Добавьте вопросы или пожелания</b>\n<i>или нажмите «нет», если их нет</i>.";
const INVALID_PHONE: &str =
    "<b>Похоже, номер телефона некорректен</b> <i>(повторите, пожалуйста, ещё раз)</i>.";
const INVALID_EMAIL: &str =
    "<b>Похоже, email некорректен</b> <i>(введите корректный адрес почты)</i>.";
const CANCELLED: &str =
    "<b>Заполнение заявки отменено</b>\n<i>(если захотите продолжить, отправьте /start)</i>.";
const CANCELLED_INLINE: &str =
    "<b>Заполнение заявки отменено</b> <i>(если захотите продолжить, отправьте /start)</i>.";
const NO_ACTIVE_FORM: &str =
    "<b>Сейчас нет активной заявки</b> <i>(для начала заполнения используйте /start)</i>.";
const GREETING_REPLY: &str = "<b>Привет</b> <i>(для записи на интенсив отправьте /start)</i>.";
const START_HINT: &str =
    "<b>Чтобы записаться на интенсив</b> <i>(отправьте команду /start)</i>.";
const INCOMPLETE: &str =
    "<b>Не удалось завершить заявку</b> <i>(не все обязательные поля заполнены)</i>.";
const THANK_YOU: &str =
    "<b>Спасибо</b>\n<i>вы записались, менеджер свяжется с вами в ближайшее время</i>.";
const DELIVERY_WARNING: &str =
    "<b>Предупреждение</b>\n<i>не удалось доставить заявку менеджеру, возможно, неверный MANAGER_CHAT_ID или бот не писал в этот чат</i>.";
const DELIVERY_NOT_CONFIGURED: &str =
    "<b>Отправка менеджеру не настроена</b> <code>MANAGER_CHAT_ID не задан</code>.";

const TOAST_CANCELLED: &str = "Заявка отменена";
const TOAST_NOTHING_TO_CANCEL: &str = "Активной заявки не было";

/// Where finished leads go and how loudly relay failures are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub manager_chat_id: Option<ChatId>,
    /// Tell the user when the manager relay fails (development mode only).
    pub surface_delivery_errors: bool,
}

pub fn cancel_keyboard() -> InlineKeyboard {
    InlineKeyboard::single("Отменить", CANCEL_FORM_CALLBACK)
}

pub struct LeadForm {
    store: Arc<dyn LeadStateStore>,
    messenger: Arc<dyn MessagingPort>,
    delivery: DeliveryConfig,
}

impl LeadForm {
    pub fn new(
        store: Arc<dyn LeadStateStore>,
        messenger: Arc<dyn MessagingPort>,
        delivery: DeliveryConfig,
    ) -> Self {
        Self {
            store,
            messenger,
            delivery,
        }
    }

    pub fn delivery(&self) -> DeliveryConfig {
        self.delivery
    }

    pub async fn state(&self, chat_id: ChatId) -> Option<LeadState> {
        self.store.get(chat_id).await
    }

    /// True while the chat is in the middle of answering questions.
    pub async fn is_active(&self, chat_id: ChatId) -> bool {
        self.store
            .get(chat_id)
            .await
            .is_some_and(|s| s.step != LeadStep::Idle)
    }

    /// `/start`: (re)start the form from scratch, even mid-form.
    pub async fn start(&self, chat_id: ChatId) -> Result<()> {
        let mut state = LeadState::started();
        self.store.set(chat_id, state.clone()).await;

        let card = self
            .messenger
            .send_html(
                chat_id,
                &build_intro_message(&state),
                Some(ReplyMarkup::Inline(cancel_keyboard())),
            )
            .await?;
        state.card_message = Some(card);
        self.store.set(chat_id, state).await;

        tracing::info!(chat_id = chat_id.0, "lead form started");
        self.reply(chat_id, PROMPT_NAME, None).await
    }

    /// `/cancel`: drop the form if there is one. Always replies.
    pub async fn cancel(&self, chat_id: ChatId) -> Result<()> {
        let text = match self.store.delete(chat_id).await {
            Some(_) => {
                tracing::info!(chat_id = chat_id.0, "lead form cancelled");
                CANCELLED
            }
            None => NO_ACTIVE_FORM,
        };
        self.reply(chat_id, text, Some(ReplyMarkup::RemoveKeyboard))
            .await
    }

    /// Inline "cancel" button. Idempotent; the callback is always answered.
    pub async fn cancel_callback(&self, q: &CallbackQuery) -> Result<()> {
        let Some(chat_id) = q.chat_id else {
            return self
                .messenger
                .answer_callback_query(&q.callback_id, None, false)
                .await;
        };

        let had_state = self.store.delete(chat_id).await.is_some();

        if let Some(msg) = q.message {
            if let Err(e) = self.messenger.edit_html(msg, CANCELLED_INLINE, None).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to mark card as cancelled");
            }
        }

        let toast = if had_state {
            TOAST_CANCELLED
        } else {
            TOAST_NOTHING_TO_CANCEL
        };
        self.messenger
            .answer_callback_query(&q.callback_id, Some(toast), false)
            .await
    }

    /// Plain text, interpreted against the current step.
    pub async fn handle_text(
        &self,
        chat_id: ChatId,
        from: Option<&Sender>,
        raw_text: &str,
    ) -> Result<()> {
        let text = raw_text.trim();
        let lower = text.to_lowercase();

        let Some(mut state) = self.store.get(chat_id).await else {
            return self.reply_idle(chat_id, &lower).await;
        };

        match state.step {
            LeadStep::Idle => self.reply_idle(chat_id, &lower).await,
            LeadStep::Name => {
                if text.is_empty() {
                    return self.reply(chat_id, PROMPT_NAME, None).await;
                }
                state.data.name = Some(text.to_string());
                state.step = LeadStep::Phone;
                self.save_and_refresh(chat_id, &state).await;
                self.reply(chat_id, PROMPT_PHONE, Some(ReplyMarkup::RemoveKeyboard))
                    .await
            }
            LeadStep::Phone => {
                if !is_valid_phone(text) {
                    return self.reply(chat_id, INVALID_PHONE, None).await;
                }
                state.data.phone = Some(text.to_string());
                state.step = LeadStep::Email;
                self.save_and_refresh(chat_id, &state).await;
                self.reply(chat_id, PROMPT_EMAIL, None).await
            }
            LeadStep::Email => {
                if !is_valid_email(text) {
                    return self.reply(chat_id, INVALID_EMAIL, None).await;
                }
                state.data.email = Some(text.to_string());
                state.step = LeadStep::Questions;
                self.save_and_refresh(chat_id, &state).await;
                self.reply(
                    chat_id,
                    PROMPT_QUESTIONS,
                    Some(ReplyMarkup::Keyboard(ReplyKeyboard::one_time(NO_QUESTIONS))),
                )
                .await
            }
            LeadStep::Questions => {
                if lower != NO_QUESTIONS {
                    state.data.questions = Some(text.to_string());
                }
                state.step = LeadStep::Idle;
                self.save_and_refresh(chat_id, &state).await;
                self.finalize(chat_id, from, &state).await
            }
        }
    }

    /// Thank the user, relay the lead to the manager and clear the chat.
    ///
    /// With required fields missing the user is told so and the state is
    /// left untouched.
    pub async fn finalize(
        &self,
        chat_id: ChatId,
        from: Option<&Sender>,
        state: &LeadState,
    ) -> Result<()> {
        let Some(lead) = state.data.submission() else {
            return self
                .reply(chat_id, INCOMPLETE, Some(ReplyMarkup::RemoveKeyboard))
                .await;
        };

        let summary = build_lead_summary(from, &lead);
        let thanked = self
            .reply(chat_id, THANK_YOU, Some(ReplyMarkup::RemoveKeyboard))
            .await;

        match self.delivery.manager_chat_id {
            Some(manager) => {
                if let Err(e) = self.messenger.send_html(manager, &summary, None).await {
                    tracing::error!(
                        chat_id = chat_id.0,
                        manager_chat_id = manager.0,
                        error = %e,
                        "failed to deliver lead to manager"
                    );
                    if self.delivery.surface_delivery_errors {
                        self.reply_or_log(chat_id, DELIVERY_WARNING).await;
                    }
                } else {
                    tracing::info!(chat_id = chat_id.0, "lead delivered to manager");
                }
            }
            None => self.reply_or_log(chat_id, DELIVERY_NOT_CONFIGURED).await,
        }

        self.store.delete(chat_id).await;
        thanked
    }

    async fn reply_idle(&self, chat_id: ChatId, lower: &str) -> Result<()> {
        let text = if lower == GREETING {
            GREETING_REPLY
        } else {
            START_HINT
        };
        self.reply(chat_id, text, None).await
    }

    async fn save_and_refresh(&self, chat_id: ChatId, state: &LeadState) {
        self.store.set(chat_id, state.clone()).await;
        if let Some(card) = state.card_message {
            edit_best_effort(
                self.messenger.as_ref(),
                card,
                &build_intro_message(state),
                Some(cancel_keyboard()),
            )
            .await;
        }
    }

    async fn reply(&self, chat_id: ChatId, html: &str, markup: Option<ReplyMarkup>) -> Result<()> {
        self.messenger.send_html(chat_id, html, markup).await?;
        Ok(())
    }

    async fn reply_or_log(&self, chat_id: ChatId, html: &str) {
        if let Err(e) = self.reply(chat_id, html, None).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send notice");
        }
    }
}
