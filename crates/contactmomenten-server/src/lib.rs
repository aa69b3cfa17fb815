//! HTTP server composition for the contact-moment service.
//!
//! Mounts the [`contactmomenten_api`] router under the path of the configured
//! `base_url` and wraps it in request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use contactmomenten_core::{
  reference::ReferenceResolver, service::ContactMomentService,
  store::ContactMomentStore,
};
use contactmomenten_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use url::Url;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CONTACTMOMENTEN_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// Public root of the API; record URLs are built from it.
  pub base_url:   Url,
  /// SQLite file, or `:memory:`.
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn resolver(&self) -> ReferenceResolver {
    ReferenceResolver::new(self.base_url.clone())
  }

  /// Open the configured store, expanding a leading `~`.
  pub async fn open_store(
    &self,
  ) -> contactmomenten_store_sqlite::Result<SqliteStore> {
    if self.store_path == Path::new(":memory:") {
      return SqliteStore::open_in_memory().await;
    }
    SqliteStore::open(expand_tilde(&self.store_path)).await
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`]. The API is mounted at the path of the
/// service's base URL so that the URLs it hands out route back to it.
pub fn router<S>(service: Arc<ContactMomentService<S>>) -> Router
where
  S: ContactMomentStore + 'static,
{
  let prefix = service.resolver().base().path().trim_end_matches('/').to_owned();
  let api = contactmomenten_api::api_router(service);

  let app = if prefix.is_empty() {
    api
  } else {
    Router::new().nest(&prefix, api)
  };
  app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  const BASE: &str = "http://testserver/api/v1/";
  const MEDEWERKER: &str = "http://example.com/medewerker/1";

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = ContactMomentService::new(
      Arc::new(store),
      ReferenceResolver::new(Url::parse(BASE).unwrap()),
    );
    router(Arc::new(service))
  }

  async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let uri = uri.trim_start_matches("http://testserver");
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        req = req.header("content-type", "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn payload() -> Value {
    json!({
      "bronorganisatie": "423182687",
      "kanaal": "telephone",
      "tekst": "some text",
      "initiatiefnemer": "gemeente",
      "medewerker": MEDEWERKER,
    })
  }

  fn url_of(v: &Value) -> &str { v["url"].as_str().unwrap() }

  // ── Configuration ────────────────────────────────────────────────────────────

  #[test]
  fn config_from_toml_uses_defaults() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        r#"
          store_path = "~/contactmomenten.db"
          base_url = "http://localhost:8000/api/v1"
        "#,
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();

    assert_eq!(cfg.address(), "127.0.0.1:8000");
    assert_eq!(cfg.resolver().base().as_str(), "http://localhost:8000/api/v1/");
    assert_eq!(
      cfg.resolver().url_for(uuid::Uuid::nil()),
      "http://localhost:8000/api/v1/contactmomenten/00000000-0000-0000-0000-000000000000"
    );
  }

  #[test]
  fn expand_tilde_leaves_plain_paths() {
    assert_eq!(expand_tilde(Path::new("/var/db.sqlite")), Path::new("/var/db.sqlite"));
  }

  // ── Scenarios ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chain_lifecycle() {
    let app = app().await;

    // A: a lone record has no successor.
    let (status, r1) =
      send(&app, Method::POST, "/api/v1/contactmomenten", Some(payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(r1["volgendContactmoment"], Value::Null);
    assert!(url_of(&r1).starts_with(BASE));

    // B: linking mirrors the pointer.
    let mut p = payload();
    p["vorigContactmoment"] = r1["url"].clone();
    let (status, r2) = send(&app, Method::POST, "/api/v1/contactmomenten", Some(p)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(r2["vorigContactmoment"], r1["url"]);
    let (_, r1_now) = send(&app, Method::GET, url_of(&r1), None).await;
    assert_eq!(r1_now["volgendContactmoment"], r2["url"]);

    // D: setting the same previous again changes nothing.
    let (status, _) = send(
      &app,
      Method::PATCH,
      url_of(&r2),
      Some(json!({ "vorigContactmoment": r1["url"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, r1_now) = send(&app, Method::GET, url_of(&r1), None).await;
    assert_eq!(r1_now["volgendContactmoment"], r2["url"]);

    // E: deleting the predecessor unlinks the successor.
    let (status, _) = send(&app, Method::DELETE, url_of(&r1), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, url_of(&r1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, r2_now) = send(&app, Method::GET, url_of(&r2), None).await;
    assert_eq!(r2_now["vorigContactmoment"], Value::Null);
  }

  #[tokio::test]
  async fn both_medewerkers_is_rejected() {
    let app = app().await;
    let mut p = payload();
    p["medewerkerIdentificatie"] = json!({
      "identificatie": "12345",
      "achternaam": "Buurman",
      "voorletters": "B B",
      "voorvoegselAchternaam": "",
    });

    let (status, body) =
      send(&app, Method::POST, "/api/v1/contactmomenten", Some(p)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["invalidParams"][0]["name"], "nonFieldErrors");
    assert_eq!(body["invalidParams"][0]["code"], "invalid-medewerker");

    let (_, list) = send(&app, Method::GET, "/api/v1/contactmomenten", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn switch_from_identification_to_reference() {
    let app = app().await;
    let mut p = payload();
    p["medewerker"] = json!("");
    p["medewerkerIdentificatie"] = json!({
      "identificatie": "12345",
      "achternaam": "Buurman",
      "voorletters": "B B",
    });
    let (status, cm) = send(&app, Method::POST, "/api/v1/contactmomenten", Some(p)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cm["medewerker"], "");
    assert_eq!(cm["medewerkerIdentificatie"]["achternaam"], "Buurman");

    let (status, cm) = send(
      &app,
      Method::PATCH,
      url_of(&cm),
      Some(json!({ "medewerker": MEDEWERKER })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cm["medewerker"], MEDEWERKER);
    assert_eq!(cm["medewerkerIdentificatie"], Value::Null);
  }

  #[tokio::test]
  async fn put_without_previous_unlinks() {
    let app = app().await;
    let (_, r1) = send(&app, Method::POST, "/api/v1/contactmomenten", Some(payload())).await;
    let mut p = payload();
    p["vorigContactmoment"] = r1["url"].clone();
    let (_, r2) = send(&app, Method::POST, "/api/v1/contactmomenten", Some(p)).await;

    let mut replacement = payload();
    replacement["tekst"] = json!("rewritten");
    let (status, r2) =
      send(&app, Method::PUT, url_of(&r2), Some(replacement)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(r2["tekst"], "rewritten");
    assert_eq!(r2["vorigContactmoment"], Value::Null);
    let (_, r1) = send(&app, Method::GET, url_of(&r1), None).await;
    assert_eq!(r1["volgendContactmoment"], Value::Null);
  }

  #[tokio::test]
  async fn list_by_previous_reference() {
    let app = app().await;
    let (_, r1) = send(&app, Method::POST, "/api/v1/contactmomenten", Some(payload())).await;
    let mut p = payload();
    p["vorigContactmoment"] = r1["url"].clone();
    let (_, r2) = send(&app, Method::POST, "/api/v1/contactmomenten", Some(p)).await;

    let uri = format!("/api/v1/contactmomenten?vorigContactmoment={}", url_of(&r1));
    let (status, list) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["url"], r2["url"]);

    let (_, list) = send(
      &app,
      Method::GET,
      "/api/v1/contactmomenten?vorigContactmoment=http://elsewhere/api/v1/contactmomenten/00000000-0000-0000-0000-000000000000",
      None,
    )
    .await;
    assert_eq!(list, json!([]));
  }
}
