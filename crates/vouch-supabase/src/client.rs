//! Async HTTP client implementing [`Backend`] against Supabase.

use std::{
  sync::{Arc, PoisonError, RwLock},
  time::Duration,
};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;
use vouch_core::{
  asset::{ObjectKey, UploadFile},
  backend::{Backend, Identity},
  contact::{Contact, ContactKind, ContactRecord},
};

use crate::{Error, Result};

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
  /// Project URL, e.g. `https://abcd.supabase.co`.
  pub url:      String,
  /// The project's public anon key.
  pub anon_key: String,
}

#[derive(Debug, Clone)]
struct Session {
  access_token:  String,
  /// Empty when the server issued none; the session then cannot outlive
  /// its access token.
  refresh_token: String,
  user:          Identity,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token:  String,
  #[serde(default)]
  refresh_token: String,
  user:          Identity,
}

impl From<TokenResponse> for Session {
  fn from(token: TokenResponse) -> Self {
    Self {
      access_token:  token.access_token,
      refresh_token: token.refresh_token,
      user:          token.user,
    }
  }
}

/// Async HTTP client for a Supabase project.
///
/// Cheap to clone; the inner [`reqwest::Client`] and the session are
/// `Arc`-based, so clones share one sign-in.
#[derive(Clone)]
pub struct SupabaseBackend {
  client:  Client,
  config:  SupabaseConfig,
  session: Arc<RwLock<Option<Session>>>,
}

impl SupabaseBackend {
  pub fn new(config: SupabaseConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config, session: Arc::default() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.url.trim_end_matches('/'), path)
  }

  fn token(&self) -> String {
    self
      .session
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .map_or_else(|| self.config.anon_key.clone(), |s| s.access_token.clone())
  }

  /// A request carrying the project key and the session's bearer token (the
  /// anon key when signed out).
  pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
    tracing::debug!(%method, path, "supabase request");
    self
      .client
      .request(method, self.url(path))
      .header("apikey", &self.config.anon_key)
      .bearer_auth(self.token())
  }

  /// Turn a non-2xx response into [`Error::Api`].
  pub(crate) async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let err = Error::from_body(status.as_u16(), &body);
    tracing::warn!(status = status.as_u16(), error = %err, "supabase request failed");
    Err(err)
  }

  /// Send the request made by `build`. When the session token is rejected
  /// (GoTrue tokens expire after an hour), refresh the session once and
  /// send a rebuilt request.
  async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
    let resp = build().send().await?;
    if resp.status() != StatusCode::UNAUTHORIZED || self.session_user().is_none() {
      return Ok(resp);
    }
    if self.refresh_session().await? {
      return Ok(build().send().await?);
    }
    Ok(resp)
  }

  fn row_path(kind: ContactKind, id: Uuid) -> String {
    format!("/rest/v1/{}?id=eq.{id}", kind.table())
  }

  // ── Auth ──────────────────────────────────────────────────────────────

  /// `POST /auth/v1/token?grant_type=password`
  pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
    let resp = self
      .request(Method::POST, "/auth/v1/token?grant_type=password")
      .json(&serde_json::json!({ "email": email, "password": password }))
      .send()
      .await?;
    let token: TokenResponse = Self::check(resp).await?.json().await?;

    let user = token.user.clone();
    self.store_session(token);
    tracing::info!(user = %user.id, "signed in");
    Ok(user)
  }

  /// `POST /auth/v1/token?grant_type=refresh_token`
  ///
  /// Trade the session's refresh token for a new access token. Returns
  /// `false` when there is nothing to refresh or the server refuses; a
  /// refused session is dropped.
  pub async fn refresh_session(&self) -> Result<bool> {
    let refresh_token = {
      let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
      session.as_ref().map(|s| s.refresh_token.clone())
    };
    let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
      return Ok(false);
    };

    let resp = self
      .request(Method::POST, "/auth/v1/token?grant_type=refresh_token")
      .json(&serde_json::json!({ "refresh_token": refresh_token }))
      .send()
      .await?;
    match Self::check(resp).await {
      Ok(resp) => {
        let token: TokenResponse = resp.json().await?;
        self.store_session(token);
        tracing::info!("refreshed session");
        Ok(true)
      }
      Err(Error::Api { status, message }) => {
        tracing::warn!(status, %message, "session refresh refused; signing out");
        self.sign_out();
        Ok(false)
      }
      Err(e) => Err(e),
    }
  }

  fn store_session(&self, token: TokenResponse) {
    *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
  }

  /// Forget the local session.
  pub fn sign_out(&self) {
    self.session.write().unwrap_or_else(PoisonError::into_inner).take();
  }

  /// The user captured at sign-in, without asking the server.
  pub fn session_user(&self) -> Option<Identity> {
    self
      .session
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .map(|s| s.user.clone())
  }

  pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
    self.url(&format!("/storage/v1/object/public/{bucket}/{path}"))
  }
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for SupabaseBackend {
  type Error = Error;

  /// `GET /auth/v1/user`
  async fn current_user(&self) -> Result<Option<Identity>> {
    if self.session_user().is_none() {
      return Ok(None);
    }
    let resp = self.send(|| self.request(Method::GET, "/auth/v1/user")).await?;
    if resp.status() == StatusCode::UNAUTHORIZED {
      return Ok(None);
    }
    Ok(Some(Self::check(resp).await?.json().await?))
  }

  /// `GET /rest/v1/<table>?select=*`
  async fn select_all(&self, kind: ContactKind) -> Result<Vec<Contact>> {
    let path = format!("/rest/v1/{}?select=*", kind.table());
    let resp = self.send(|| self.request(Method::GET, &path)).await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `POST /rest/v1/<table>`
  async fn insert(&self, kind: ContactKind, record: ContactRecord) -> Result<Contact> {
    let path = format!("/rest/v1/{}", kind.table());
    let resp = self
      .send(|| {
        self
          .request(Method::POST, &path)
          .header("Prefer", "return=representation")
          .json(&record)
      })
      .await?;
    let rows: Vec<Contact> = Self::check(resp).await?.json().await?;
    rows.into_iter().next().ok_or(Error::EmptyResponse(kind.table()))
  }

  /// `PATCH /rest/v1/<table>?id=eq.<id>`
  async fn update(&self, kind: ContactKind, id: Uuid, record: ContactRecord) -> Result<()> {
    let path = Self::row_path(kind, id);
    let resp = self
      .send(|| {
        self
          .request(Method::PATCH, &path)
          .header("Prefer", "return=representation")
          .json(&record)
      })
      .await?;
    let rows: Vec<serde_json::Value> = Self::check(resp).await?.json().await?;
    if rows.is_empty() {
      return Err(Error::NotFound { table: kind.table(), id });
    }
    Ok(())
  }

  /// `DELETE /rest/v1/<table>?id=eq.<id>`
  async fn delete(&self, kind: ContactKind, id: Uuid) -> Result<()> {
    let path = Self::row_path(kind, id);
    let resp = self
      .send(|| {
        self
          .request(Method::DELETE, &path)
          .header("Prefer", "return=representation")
      })
      .await?;
    let rows: Vec<serde_json::Value> = Self::check(resp).await?.json().await?;
    if rows.is_empty() {
      return Err(Error::NotFound { table: kind.table(), id });
    }
    Ok(())
  }

  /// `POST /storage/v1/object/<bucket>/<path>`
  async fn upload(&self, key: ObjectKey, file: UploadFile) -> Result<()> {
    let path = format!("/storage/v1/object/{}/{}", key.bucket, key.path);
    let resp = self
      .send(|| {
        self
          .request(Method::POST, &path)
          .header(reqwest::header::CONTENT_TYPE, file.content_type.as_str())
          .header("x-upsert", "false")
          .body(file.bytes.clone())
      })
      .await?;
    Self::check(resp).await?;
    Ok(())
  }

  fn public_url(&self, key: &ObjectKey) -> String {
    self.public_object_url(key.bucket, &key.path)
  }
}
