//! Step machine of the workout log.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::{
    domain::ChatId,
    errors::Error,
    messaging::{
        port::{edit_best_effort, MessagingPort},
        types::{CallbackQuery, ReplyMarkup},
    },
    workout::{
        format::{to_card, to_workout_message},
        keyboards::{control_keyboard, split_keyboard, WorkoutCallback},
        parser::{parse_message, ParsedLine},
        repository::{WorkoutRepository, WorkoutSessionRepository},
        types::{Exercise, WorkoutSession, WorkoutStep},
    },
    Result,
};

const ALREADY_ACTIVE: &str =
    "<b>Тренировка уже идёт</b> <i>(продолжайте ввод или нажмите «Отменить»)</i>.";
const PICK_SPLIT_FIRST: &str =
    "<b>Сначала выберите тип тренировки</b> <i>(кнопки под карточкой)</i>.";
const PROMPT_EXERCISE: &str =
    "<b>Введите название упражнения</b>\n<i>затем подходы, например <code>80x10</code> или <code>3 подхода по 12</code></i>.";
const NEED_EXERCISE: &str =
    "<b>Сначала укажите упражнение</b> <i>(например, <code>Жим лёжа</code>)</i>.";
const SAVE_FAILED: &str =
    "<b>Не удалось сохранить тренировку</b> <i>(попробуйте ещё раз позже)</i>.";
const STORAGE_FAILED: &str = "<b>Тренировка временно недоступна</b> <i>(попробуйте позже)</i>.";
const CANCELLED: &str =
    "<b>Тренировка отменена</b> <i>(чтобы начать заново, отправьте /workout)</i>.";

const TOAST_NO_SESSION: &str = "Нет активной тренировки";
const TOAST_UNKNOWN_SPLIT: &str = "Неизвестный тип тренировки";
const TOAST_NEED_SPLIT: &str = "Сначала выберите тип тренировки";
const TOAST_NEED_EXERCISES: &str = "Добавьте хотя бы одно упражнение";
const TOAST_SAVED: &str = "Сохранено";
const TOAST_CANCELLED: &str = "Тренировка отменена";

pub struct WorkoutLog {
    sessions: Arc<dyn WorkoutSessionRepository>,
    workouts: WorkoutRepository,
    messenger: Arc<dyn MessagingPort>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl WorkoutLog {
    pub fn new(
        sessions: Arc<dyn WorkoutSessionRepository>,
        workouts: WorkoutRepository,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            sessions,
            workouts,
            messenger,
            today: local_today,
        }
    }

    /// Override the date source (tests, replays).
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn has_session(&self, chat_id: ChatId) -> Result<bool> {
        Ok(self.sessions.get(chat_id).await?.is_some())
    }

    /// `/workout`: open a session and show the split picker.
    pub async fn begin(&self, chat_id: ChatId) -> Result<()> {
        let existing = match self.sessions.get(chat_id).await {
            Ok(s) => s,
            Err(e) => return self.report_storage(chat_id, e).await,
        };
        if let Some(session) = existing {
            self.reply(chat_id, ALREADY_ACTIVE, None).await?;
            return self.resend_card(chat_id, session).await;
        }

        let session = WorkoutSession::new((self.today)());
        if let Err(e) = self.sessions.save(chat_id, session.clone()).await {
            return self.report_storage(chat_id, e).await;
        }
        tracing::info!(chat_id = chat_id.0, "workout session opened");
        self.resend_card(chat_id, session).await
    }

    pub async fn handle_callback(&self, q: &CallbackQuery, cb: WorkoutCallback) -> Result<()> {
        let Some(chat_id) = q.chat_id else {
            return self.answer(q, None, false).await;
        };

        match cb {
            WorkoutCallback::UnknownSplit => self.answer(q, Some(TOAST_UNKNOWN_SPLIT), false).await,
            WorkoutCallback::Cancel => self.cancel(chat_id, q).await,
            WorkoutCallback::Split(split) => {
                let Some(mut session) = self.load_for_callback(chat_id, q).await? else {
                    return Ok(());
                };
                session.split = Some(split);
                session.step = WorkoutStep::Collecting;
                if let Err(e) = self.sessions.save(chat_id, session.clone()).await {
                    self.answer(q, None, false).await?;
                    return self.report_storage(chat_id, e).await;
                }
                self.refresh_card(&session).await;
                self.answer(q, Some(split.label()), false).await?;
                self.reply(chat_id, PROMPT_EXERCISE, None).await
            }
            WorkoutCallback::Done => {
                let Some(session) = self.load_for_callback(chat_id, q).await? else {
                    return Ok(());
                };
                self.finish(chat_id, q, session).await
            }
        }
    }

    /// Free text while a session is open: exercise names and sets.
    pub async fn handle_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let mut session = match self.sessions.get(chat_id).await {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(()),
            Err(e) => return self.report_storage(chat_id, e).await,
        };

        if session.step == WorkoutStep::ChoosingSplit {
            return self.reply(chat_id, PICK_SPLIT_FIRST, None).await;
        }

        let lines = parse_message(text);
        if lines.is_empty() {
            return self.reply(chat_id, PROMPT_EXERCISE, None).await;
        }
        if !apply_lines(&mut session, lines) {
            return self.reply(chat_id, NEED_EXERCISE, None).await;
        }

        if let Err(e) = self.sessions.save(chat_id, session.clone()).await {
            return self.report_storage(chat_id, e).await;
        }
        self.refresh_card(&session).await;
        Ok(())
    }

    async fn finish(
        &self,
        chat_id: ChatId,
        q: &CallbackQuery,
        session: WorkoutSession,
    ) -> Result<()> {
        let Some(workout) = session.to_workout() else {
            return self.answer(q, Some(TOAST_NEED_SPLIT), true).await;
        };
        if workout.exercises.is_empty() {
            return self.answer(q, Some(TOAST_NEED_EXERCISES), true).await;
        }

        if let Err(e) = self.workouts.save(chat_id, &workout).await {
            tracing::error!(chat_id = chat_id.0, error = %e, "failed to save workout");
            self.answer(q, None, false).await?;
            return self.reply(chat_id, SAVE_FAILED, None).await;
        }

        if let Err(e) = self.sessions.remove(chat_id).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to drop finished session");
        }
        tracing::info!(
            chat_id = chat_id.0,
            exercises = workout.exercises.len(),
            "workout saved"
        );

        if let Some(card) = session.card_message {
            edit_best_effort(self.messenger.as_ref(), card, &to_card(&session), None).await;
        }
        self.answer(q, Some(TOAST_SAVED), false).await?;
        self.reply(chat_id, &to_workout_message(&workout), None).await
    }

    async fn cancel(&self, chat_id: ChatId, q: &CallbackQuery) -> Result<()> {
        let had_session = match self.sessions.get(chat_id).await {
            Ok(s) => s.is_some(),
            Err(e) => {
                self.answer(q, None, false).await?;
                return self.report_storage(chat_id, e).await;
            }
        };
        if had_session {
            if let Err(e) = self.sessions.remove(chat_id).await {
                self.answer(q, None, false).await?;
                return self.report_storage(chat_id, e).await;
            }
        }

        if let Some(msg) = q.message {
            edit_best_effort(self.messenger.as_ref(), msg, CANCELLED, None).await;
        }
        let toast = if had_session {
            TOAST_CANCELLED
        } else {
            TOAST_NO_SESSION
        };
        self.answer(q, Some(toast), false).await
    }

    /// Loads the session a button refers to, answering the callback when
    /// there is none.
    async fn load_for_callback(
        &self,
        chat_id: ChatId,
        q: &CallbackQuery,
    ) -> Result<Option<WorkoutSession>> {
        match self.sessions.get(chat_id).await {
            Ok(Some(s)) => Ok(Some(s)),
            Ok(None) => {
                self.answer(q, Some(TOAST_NO_SESSION), false).await?;
                Ok(None)
            }
            Err(e) => {
                self.answer(q, None, false).await?;
                self.report_storage(chat_id, e).await?;
                Ok(None)
            }
        }
    }

    async fn resend_card(&self, chat_id: ChatId, mut session: WorkoutSession) -> Result<()> {
        let keyboard = match session.step {
            WorkoutStep::ChoosingSplit => split_keyboard(),
            WorkoutStep::Collecting => control_keyboard(),
        };
        let card = self
            .messenger
            .send_html(
                chat_id,
                &to_card(&session),
                Some(ReplyMarkup::Inline(keyboard)),
            )
            .await?;
        session.card_message = Some(card);
        if let Err(e) = self.sessions.save(chat_id, session).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to remember workout card");
        }
        Ok(())
    }

    async fn refresh_card(&self, session: &WorkoutSession) {
        if let Some(card) = session.card_message {
            edit_best_effort(
                self.messenger.as_ref(),
                card,
                &to_card(session),
                Some(control_keyboard()),
            )
            .await;
        }
    }

    async fn report_storage(&self, chat_id: ChatId, e: Error) -> Result<()> {
        tracing::error!(chat_id = chat_id.0, error = %e, "workout session storage failed");
        self.reply(chat_id, STORAGE_FAILED, None).await
    }

    async fn answer(&self, q: &CallbackQuery, text: Option<&str>, alert: bool) -> Result<()> {
        self.messenger
            .answer_callback_query(&q.callback_id, text, alert)
            .await
    }

    async fn reply(&self, chat_id: ChatId, html: &str, markup: Option<ReplyMarkup>) -> Result<()> {
        self.messenger.send_html(chat_id, html, markup).await?;
        Ok(())
    }
}

/// Applies parsed lines to the session. Returns `false` (leaving the session
/// untouched) when a set arrives before any exercise was named.
fn apply_lines(session: &mut WorkoutSession, lines: Vec<ParsedLine>) -> bool {
    let mut draft = session.clone();
    for line in lines {
        match line {
            ParsedLine::Exercise(name) => {
                let wanted = name.to_lowercase();
                let existing = draft
                    .exercises
                    .iter()
                    .find(|e| e.name.to_lowercase() == wanted)
                    .map(|e| e.name.clone());
                let current = match existing {
                    Some(known) => known,
                    None => {
                        draft.exercises.push(Exercise {
                            name: name.clone(),
                            sets: Vec::new(),
                        });
                        name
                    }
                };
                draft.current_exercise = Some(current);
            }
            ParsedLine::Set(entry) => {
                let Some(current) = draft.current_exercise.as_deref() else {
                    return false;
                };
                let Some(exercise) = draft.exercises.iter_mut().find(|e| e.name == current) else {
                    return false;
                };
                exercise.sets.push(entry);
            }
        }
    }
    *session = draft;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, MessageRef};
    use crate::messaging::testing::FakeMessenger;
    use crate::workout::repository::{InMemoryWorkoutSessions, JsonlWorkoutSink, UnimplementedSink};
    use crate::workout::types::{SetEntry, WorkoutSplit};
    use async_trait::async_trait;

    const CHAT: ChatId = ChatId(2002);

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()
    }

    struct Harness {
        log: WorkoutLog,
        sessions: Arc<InMemoryWorkoutSessions>,
        messenger: Arc<FakeMessenger>,
    }

    fn harness(workouts: WorkoutRepository) -> Harness {
        let sessions = Arc::new(InMemoryWorkoutSessions::new());
        let messenger = Arc::new(FakeMessenger::new());
        let log = WorkoutLog::new(sessions.clone(), workouts, messenger.clone())
            .with_today(fixed_day);
        Harness {
            log,
            sessions,
            messenger,
        }
    }

    fn callback(data: &str, message: Option<MessageRef>) -> (CallbackQuery, WorkoutCallback) {
        let q = CallbackQuery {
            chat_id: Some(CHAT),
            from: None,
            callback_id: format!("cb-{data}"),
            data: data.to_string(),
            message,
        };
        (q, WorkoutCallback::parse(data).unwrap())
    }

    async fn session(h: &Harness) -> WorkoutSession {
        h.sessions.get(CHAT).await.unwrap().unwrap()
    }

    async fn pick_split(h: &Harness, token: &str) {
        let card = session(h).await.card_message;
        let (q, cb) = callback(&format!("split:{token}"), card);
        h.log.handle_callback(&q, cb).await.unwrap();
    }

    fn tmp_path() -> std::path::PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("fitbot-flow-{}-{ts}.jsonl", std::process::id()))
    }

    #[tokio::test]
    async fn begin_sends_card_with_split_picker() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();

        let sent = h.messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("Дата: <b>15.04.2026</b>"));
        assert_eq!(sent[0].markup, Some(ReplyMarkup::Inline(split_keyboard())));

        let s = session(&h).await;
        assert_eq!(s.step, WorkoutStep::ChoosingSplit);
        assert_eq!(
            s.card_message,
            Some(MessageRef {
                chat_id: CHAT,
                message_id: MessageId(100)
            })
        );
    }

    #[tokio::test]
    async fn second_begin_keeps_the_running_session() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "legs").await;
        h.log.handle_text(CHAT, "Присед\n100x5").await.unwrap();

        h.log.begin(CHAT).await.unwrap();

        let s = session(&h).await;
        assert_eq!(s.exercises.len(), 1);
        let sent = h.messenger.sent();
        let n = sent.len();
        assert_eq!(sent[n - 2].html, ALREADY_ACTIVE);
        assert_eq!(sent[n - 1].markup, Some(ReplyMarkup::Inline(control_keyboard())));
    }

    #[tokio::test]
    async fn text_before_split_asks_for_split() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        h.log.handle_text(CHAT, "Жим лёжа").await.unwrap();

        assert_eq!(h.messenger.last_sent_html(), PICK_SPLIT_FIRST);
        assert!(session(&h).await.exercises.is_empty());
    }

    #[tokio::test]
    async fn split_choice_moves_to_collecting() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "chest_calves").await;

        let s = session(&h).await;
        assert_eq!(s.step, WorkoutStep::Collecting);
        assert_eq!(s.split, Some(WorkoutSplit::ChestCalves));
        assert!(h.messenger.edited()[0].1.contains("Грудь / Икры"));
        assert_eq!(h.messenger.answered()[0].text.as_deref(), Some("Грудь / Икры"));
        assert_eq!(h.messenger.last_sent_html(), PROMPT_EXERCISE);
    }

    #[tokio::test]
    async fn sets_attach_to_current_exercise() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "chest_calves").await;

        h.log.handle_text(CHAT, "Жим лёжа\n60x12\n80x8").await.unwrap();
        h.log.handle_text(CHAT, "Икры стоя").await.unwrap();
        h.log.handle_text(CHAT, "3 подхода по 20").await.unwrap();
        h.log.handle_text(CHAT, "жим лёжа\n85x6").await.unwrap();

        let s = session(&h).await;
        assert_eq!(s.exercises.len(), 2);
        assert_eq!(s.exercises[0].sets.len(), 3);
        assert_eq!(s.exercises[1].sets.len(), 1);
        assert_eq!(s.current_exercise.as_deref(), Some("Жим лёжа"));
        assert!(h.messenger.edited().last().unwrap().1.contains("- 85 × 6"));
    }

    #[tokio::test]
    async fn set_without_exercise_is_rejected_whole() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "arms").await;

        h.log.handle_text(CHAT, "30x12\nПодъём на бицепс").await.unwrap();

        assert_eq!(h.messenger.last_sent_html(), NEED_EXERCISE);
        let s = session(&h).await;
        assert!(s.exercises.is_empty());
        assert!(s.current_exercise.is_none());
    }

    #[tokio::test]
    async fn done_requires_exercises() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "deadlift").await;

        let (q, cb) = callback("workout:done", None);
        h.log.handle_callback(&q, cb).await.unwrap();

        let answer = h.messenger.answered().pop().unwrap();
        assert_eq!(answer.text.as_deref(), Some(TOAST_NEED_EXERCISES));
        assert!(answer.show_alert);
        assert!(h.sessions.get(CHAT).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn done_without_split_is_refused() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();

        let (q, cb) = callback("workout:done", None);
        h.log.handle_callback(&q, cb).await.unwrap();

        assert_eq!(
            h.messenger.answered().pop().unwrap().text.as_deref(),
            Some(TOAST_NEED_SPLIT)
        );
    }

    #[tokio::test]
    async fn done_saves_and_clears_session() {
        let path = tmp_path();
        let h = harness(WorkoutRepository::new(Arc::new(JsonlWorkoutSink::new(path.clone()))));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "deadlift").await;
        h.log.handle_text(CHAT, "Становая тяга\n140x3").await.unwrap();

        let (q, cb) = callback("workout:done", None);
        h.log.handle_callback(&q, cb).await.unwrap();

        assert!(h.sessions.get(CHAT).await.unwrap().is_none());
        assert_eq!(
            h.messenger.answered().pop().unwrap().text.as_deref(),
            Some(TOAST_SAVED)
        );
        let last = h.messenger.last_sent_html();
        assert!(last.starts_with("<b>Тренировка</b>"));
        assert!(last.contains("- 140 × 3"));

        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(saved.lines().count(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn failed_save_keeps_session() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        pick_split(&h, "legs").await;
        h.log.handle_text(CHAT, "Присед\n100x5").await.unwrap();

        let (q, cb) = callback("workout:done", None);
        h.log.handle_callback(&q, cb).await.unwrap();

        assert_eq!(h.messenger.last_sent_html(), SAVE_FAILED);
        assert!(h.sessions.get(CHAT).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cancel_removes_session_and_is_idempotent() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        let card = session(&h).await.card_message;

        let (q, cb) = callback("workout:cancel", card);
        h.log.handle_callback(&q, cb).await.unwrap();
        h.log.handle_callback(&q, cb).await.unwrap();

        assert!(h.sessions.get(CHAT).await.unwrap().is_none());
        let answers = h.messenger.answered();
        assert_eq!(answers[0].text.as_deref(), Some(TOAST_CANCELLED));
        assert_eq!(answers[1].text.as_deref(), Some(TOAST_NO_SESSION));
        assert_eq!(h.messenger.edited()[0].1, CANCELLED);
    }

    #[tokio::test]
    async fn unknown_split_is_answered() {
        let h = harness(WorkoutRepository::new(Arc::new(UnimplementedSink)));
        h.log.begin(CHAT).await.unwrap();
        let (q, cb) = callback("split:yoga", None);
        h.log.handle_callback(&q, cb).await.unwrap();

        assert_eq!(
            h.messenger.answered()[0].text.as_deref(),
            Some(TOAST_UNKNOWN_SPLIT)
        );
        assert_eq!(session(&h).await.split, None);
    }

    struct BrokenSessions;

    #[async_trait]
    impl WorkoutSessionRepository for BrokenSessions {
        async fn get(&self, chat_id: ChatId) -> Result<Option<WorkoutSession>> {
            Err(Error::NotImplemented(format!("get {}", chat_id.0)))
        }
        async fn save(&self, chat_id: ChatId, _session: WorkoutSession) -> Result<()> {
            Err(Error::NotImplemented(format!("save {}", chat_id.0)))
        }
        async fn remove(&self, chat_id: ChatId) -> Result<()> {
            Err(Error::NotImplemented(format!("remove {}", chat_id.0)))
        }
    }

    #[tokio::test]
    async fn storage_failures_become_a_short_reply() {
        let messenger = Arc::new(FakeMessenger::new());
        let log = WorkoutLog::new(
            Arc::new(BrokenSessions),
            WorkoutRepository::new(Arc::new(UnimplementedSink)),
            messenger.clone(),
        );

        log.begin(CHAT).await.unwrap();
        assert_eq!(messenger.last_sent_html(), STORAGE_FAILED);
        assert!(log.has_session(CHAT).await.is_err());
    }

    #[test]
    fn apply_lines_keeps_raw_sets() {
        let mut s = WorkoutSession::new(fixed_day());
        assert!(apply_lines(
            &mut s,
            parse_message("Планка\n2 минуты")
        ));
        assert_eq!(
            s.exercises[0].sets[0],
            SetEntry::Raw {
                raw: "2 минуты".to_string()
            }
        );
    }
}
