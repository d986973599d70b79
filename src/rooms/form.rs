use axum::response::Html;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{self, rooms::RoomFields},
    include_res, res,
    session::CurrentUser,
    AppError, AppResult,
};

pub const NAME_MAX: usize = 200;

/// The create/update room form. Every field may be missing from the post;
/// missing reads as blank.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RoomForm {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl RoomForm {
    pub fn from_room(room: &db::Room) -> RoomForm {
        RoomForm {
            topic: room.topic_name.clone(),
            name: room.name.clone(),
            description: room.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (label, value) in [("Topic", self.topic.trim()), ("Room name", self.name.trim())] {
            if value.is_empty() {
                errors.push(format!("{label} is required."));
            } else if value.chars().count() > NAME_MAX {
                errors.push(format!("{label} must be at most {NAME_MAX} characters."));
            }
        }
        errors
    }

    /// Validates, then finds or creates the topic. Nothing is written when
    /// the form is invalid.
    pub(crate) async fn resolve(&self, db_pool: &SqlitePool) -> AppResult<RoomFields<'_>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let topic = db::topics::get_or_create(db_pool, self.topic.trim()).await?;
        let description = Some(self.description.trim()).filter(|d| !d.is_empty());

        Ok(RoomFields {
            topic_id: topic.id,
            name: self.name.trim(),
            description,
        })
    }
}

pub(crate) struct FormPage<'a> {
    pub heading: &'a str,
    pub action: &'a str,
    pub submit: &'a str,
}

pub(crate) async fn render(
    db_pool: &SqlitePool,
    viewer: &CurrentUser,
    page: FormPage<'_>,
    form: &RoomForm,
    errors: &[String],
) -> AppResult<Html<String>> {
    let topic_options: String = db::topics::all(db_pool)
        .await?
        .iter()
        .map(|t| format!("<option value=\"{}\"></option>", res::escape(&t.name)))
        .collect();

    let body = include_res!(str, "/pages/rooms/room_form.html")
        .replace("{heading}", page.heading)
        .replace("{action}", page.action)
        .replace("{submit}", page.submit)
        .replace("{errors}", &res::error_list(errors))
        .replace("{topic_options}", &topic_options)
        .replace("{topic}", &res::escape(&form.topic))
        .replace("{name}", &res::escape(&form.name))
        .replace("{description}", &res::escape(&form.description));

    res::render(&viewer.session, Some(&viewer.user), page.heading, &body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(topic: &str, name: &str) -> RoomForm {
        RoomForm {
            topic: topic.to_owned(),
            name: name.to_owned(),
            description: String::new(),
        }
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(form("Python", "Intro").validate().is_empty());
    }

    #[test]
    fn blank_fields_are_reported() {
        assert_eq!(form("  ", "").validate().len(), 2);
    }

    #[test]
    fn long_names_are_reported() {
        let errors = form("Python", &"x".repeat(NAME_MAX + 1)).validate();
        assert_eq!(errors, vec![format!("Room name must be at most {NAME_MAX} characters.")]);
    }
}
