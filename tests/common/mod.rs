#![allow(dead_code)]

use agora::{db, Config};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub db_pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> TestApp {
        let db_pool = db::connect_in_memory().await.expect("in-memory db");
        let router = agora::app(db_pool.clone(), &Config::default());
        TestApp { router, db_pool }
    }

    /// A browser with its own cookie jar.
    pub fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// A browser already registered (and so logged in) as `username`.
    pub async fn signed_in(&self, username: &str) -> Client {
        let mut client = self.client();
        let res = client.register(username, PASSWORD).await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "registering {username}: {}", res.body);
        client
    }

    pub async fn user(&self, username: &str) -> db::User {
        db::users::find_by_username(&self.db_pool, username)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no user {username}"))
    }

    pub async fn only_room(&self) -> db::Room {
        let mut rooms = db::rooms::search(&self.db_pool, "").await.unwrap();
        assert_eq!(rooms.len(), 1);
        rooms.remove(0)
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct Client {
    router: Router,
    cookie: Option<String>,
}

impl Client {
    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let req = Request::get(path);
        self.send(req, Body::empty()).await
    }

    pub async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = Request::post(path).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(req, Body::from(body)).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/register",
            &[("username", username), ("password1", password), ("password2", password)],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn create_room(&mut self, topic: &str, name: &str, description: &str) -> TestResponse {
        self.post(
            "/room-create",
            &[("topic", topic), ("name", name), ("description", description)],
        )
        .await
    }

    async fn send(&mut self, mut req: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let res = self
            .router
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = res.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().trim();
            let expired = set_cookie.to_str().unwrap().contains("Max-Age=0");
            self.cookie = match pair.split_once('=') {
                Some((_, value)) if !value.is_empty() && !expired => Some(pair.to_owned()),
                _ => None,
            };
        }

        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|l| l.to_str().unwrap().to_owned());
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
