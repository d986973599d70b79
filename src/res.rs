use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use pulldown_cmark::{Event, Parser};
use time::OffsetDateTime;

use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db,
    session::{self, Flash, Level},
    AppResult,
};

#[macro_export]
macro_rules! include_res {
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Escapes text for HTML bodies and attributes. Braces are escaped too so
/// user text can never be mistaken for a template placeholder.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders a message body. Raw HTML in the source comes out as text.
pub fn markdown(source: &str) -> String {
    let parser = Parser::new(source).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output.replace('{', "&#123;").replace('}', "&#125;")
}

pub fn time_ago(then: OffsetDateTime) -> String {
    time_between(then, OffsetDateTime::now_utc())
}

fn time_between(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - then;

    let (n, unit) = if elapsed.whole_days() >= 365 {
        (elapsed.whole_days() / 365, "year")
    } else if elapsed.whole_days() >= 30 {
        (elapsed.whole_days() / 30, "month")
    } else if elapsed.whole_days() >= 1 {
        (elapsed.whole_days(), "day")
    } else if elapsed.whole_hours() >= 1 {
        (elapsed.whole_hours(), "hour")
    } else if elapsed.whole_minutes() >= 1 {
        (elapsed.whole_minutes(), "minute")
    } else {
        return "just now".to_owned();
    };

    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural} ago")
}

/// Wraps page content in the site layout, showing whatever flashes are
/// pending in the session.
pub async fn render(
    session: &Session,
    viewer: Option<&db::User>,
    title: &str,
    content: &str,
) -> AppResult<Html<String>> {
    render_search(session, viewer, title, content, "").await
}

/// [`render`] with the header search box holding `q`.
pub async fn render_search(
    session: &Session,
    viewer: Option<&db::User>,
    title: &str,
    content: &str,
    q: &str,
) -> AppResult<Html<String>> {
    let flashes = session::take_flashes(session).await?;
    Ok(page(title, viewer, &flashes, content, q))
}

fn page(
    title: &str,
    viewer: Option<&db::User>,
    flashes: &[Flash],
    content: &str,
    q: &str,
) -> Html<String> {
    let nav = match viewer {
        Some(user) => include_res!(str, "/pages/nav_user.html")
            .replace("{user_id}", &user.id.to_string())
            .replace("{username}", &escape(&user.username)),
        None => include_res!(str, "/pages/nav_anon.html").to_owned(),
    };

    let flashes: String = flashes
        .iter()
        .map(|flash| {
            let class = match flash.level {
                Level::Info => "info",
                Level::Error => "error",
            };
            format!("<li class=\"{class}\">{}</li>", escape(&flash.text))
        })
        .collect();

    Html(
        include_res!(str, "/pages/layout.html")
            .replace("{title}", &escape(title))
            .replace("{nav}", &nav)
            .replace("{flashes}", &flashes)
            .replace("{search}", &escape(q))
            .replace("{content}", content),
    )
}

/// `<ul>` of inline form errors.
pub fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!("<ul class=\"errors\">{items}</ul>")
}

pub fn room_item(room: &db::Room) -> String {
    include_res!(str, "/pages/rooms/room_item.html")
        .replace("{id}", &room.id.to_string())
        .replace("{name}", &escape(&room.name))
        .replace("{host_id}", &room.host_id.to_string())
        .replace("{host_username}", &escape(&room.host_username))
        .replace("{topic_name}", &escape(&room.topic_name))
        .replace("{participant_count}", &room.participant_count.to_string())
        .replace("{created}", &time_ago(room.created))
}

pub fn topic_list(topics: &[db::TopicCount]) -> String {
    topics
        .iter()
        .map(|topic| {
            include_res!(str, "/pages/topic_item.html")
                .replace("{q}", &urlencoding::encode(&topic.name))
                .replace("{name}", &escape(&topic.name))
                .replace("{room_count}", &topic.room_count.to_string())
        })
        .collect()
}

/// Only the author gets one.
pub fn delete_link(message: &db::Message, viewer: Option<Uuid>) -> String {
    if viewer == Some(message.user_id) {
        format!("<a href=\"/delete-message/{}\">delete</a>", message.id)
    } else {
        String::new()
    }
}

/// One line of an activity feed.
pub fn feed_item(message: &db::Message, viewer: Option<Uuid>) -> String {
    include_res!(str, "/pages/feed_item.html")
        .replace("{user_id}", &message.user_id.to_string())
        .replace("{username}", &escape(&message.username))
        .replace("{room_id}", &message.room_id.to_string())
        .replace("{room_name}", &escape(&message.room_name))
        .replace("{created}", &time_ago(message.created))
        .replace("{delete}", &delete_link(message, viewer))
        .replace("{body}", &markdown(&message.body))
}

pub fn sorry(kind: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(include_res!(str, "/pages/sorry.html").replace("{kind}", &escape(kind))),
    )
        .into_response()
}

pub async fn not_found() -> Response {
    sorry("page")
}
