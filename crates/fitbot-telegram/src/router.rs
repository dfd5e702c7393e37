use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use tokio::sync::{Mutex, OwnedMutexGuard};

use fitbot_commands_api::CommandsApiClient;
use fitbot_core::{
    app::BotApp,
    config::Config,
    lead::{InMemoryLeadStore, LeadForm},
    messaging::port::MessagingPort,
    workout::{InMemoryWorkoutSessions, JsonlWorkoutSink, WorkoutLog, WorkoutRepository},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub app: Arc<BotApp>,
    pub chat_locks: Arc<ChatLocks>,
}

#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Wire the flows over a messenger. State lives in memory and is lost on
/// restart; finished workouts are appended to `cfg.workout_log_path`.
pub fn build_app(cfg: &Config, messenger: Arc<dyn MessagingPort>) -> BotApp {
    let lead = LeadForm::new(
        Arc::new(InMemoryLeadStore::new()),
        messenger.clone(),
        cfg.delivery_config(),
    );
    let workout = WorkoutLog::new(
        Arc::new(InMemoryWorkoutSessions::new()),
        WorkoutRepository::new(Arc::new(JsonlWorkoutSink::new(
            cfg.workout_log_path.clone(),
        ))),
        messenger.clone(),
    );
    let app = BotApp::new(lead, workout, messenger);

    match CommandsApiClient::new(cfg.commands_api_base_url.clone(), cfg.commands_api_timeout) {
        Ok(client) => app.with_catalog(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "commands catalog disabled");
            app
        }
    }
}

fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Записаться на интенсив"),
        BotCommand::new("cancel", "Отменить заявку"),
        BotCommand::new("workout", "Записать тренировку"),
        BotCommand::new("commands", "Команды клуба"),
        BotCommand::new("help", "Помощь"),
    ]
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "bot started"),
        Err(e) => anyhow::bail!("telegram getMe failed: {e}"),
    }
    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        tracing::warn!(error = %e, "failed to register bot commands");
    }
    match cfg.manager_chat_id {
        Some(id) => tracing::info!(manager_chat_id = id.0, "leads will be relayed"),
        None => tracing::warn!("MANAGER_CHAT_ID is not set; leads stay with the user only"),
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        app: Arc::new(build_app(&cfg, messenger)),
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("dispatcher stopped");
    Ok(())
}
