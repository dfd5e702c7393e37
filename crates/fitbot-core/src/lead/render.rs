//! Pure renderers for the lead card, intro message and manager summary.

use crate::{
    domain::Sender,
    formatting::{blockquote, escape_html},
    lead::state::{LeadState, LeadSubmission},
};

const CARD_TITLE: &str = "<b>ЗАЯВКА НА ИНТЕНСИВ</b>";
const INTRO_HEADER: &str = "<b>Я помогу записаться на интенсив</b>\n";
const INTRO_FOOTER: &str = "<i>в любой момент вы можете отменить заполнение</i>.";

/// Live summary card: populated fields in fixed order plus the current step.
pub fn render_card(state: &LeadState) -> String {
    let data = &state.data;
    let mut lines: Vec<String> = vec![CARD_TITLE.to_string(), String::new()];

    let fields = [
        ("Имя", &data.name),
        ("Телефон", &data.phone),
        ("Email", &data.email),
        ("Вопросы/пожелания", &data.questions),
    ];
    for (label, value) in fields {
        if let Some(v) = value {
            lines.push(format!("{label}: <b>{}</b>", escape_html(v)));
        }
    }

    if lines.last().is_some_and(|l| !l.is_empty()) {
        lines.push(String::new());
    }
    lines.push(format!("Текущий шаг: <i>{}</i>", state.step.label()));

    blockquote(&lines.join("\n"))
}

/// The first message of a form: header, live card, cancellation note.
pub fn build_intro_message(state: &LeadState) -> String {
    format!("{INTRO_HEADER}\n{}\n{INTRO_FOOTER}", render_card(state))
}

/// Manager-facing sender line with a profile link; prefers the public handle.
pub fn build_user_link(from: Option<&Sender>) -> String {
    let Some(from) = from else {
        return "неизвестный пользователь".to_string();
    };

    let base_name = format!(
        "{} {}",
        from.first_name,
        from.last_name.as_deref().unwrap_or("")
    );
    let base_name = base_name.trim();
    let username_part = from
        .username
        .as_deref()
        .map(|u| format!(" (@{u})"))
        .unwrap_or_default();
    let visible = format!("{base_name}{username_part}");
    let visible = match visible.trim() {
        "" => "пользователь",
        v => v,
    };

    let link = match &from.username {
        Some(u) => format!("https://t.me/{u}"),
        None => format!("tg://user?id={}", from.user_id.0),
    };

    format!("{} — {link}", escape_html(visible))
}

/// Summary relayed to the manager chat.
pub fn build_lead_summary(from: Option<&Sender>, lead: &LeadSubmission) -> String {
    [
        "Новая заявка на интенсив".to_string(),
        String::new(),
        format!("Клиент: <b>{}</b>", build_user_link(from)),
        String::new(),
        format!("Имя: <b>{}</b>", escape_html(&lead.name)),
        format!("Телефон: <b>{}</b>", escape_html(&lead.phone)),
        format!("Email: <b>{}</b>", escape_html(&lead.email)),
        format!(
            "Вопросы/пожелания: <b>{}</b>",
            escape_html(lead.questions.as_deref().unwrap_or("-"))
        ),
    ]
    .join("\n")
}
