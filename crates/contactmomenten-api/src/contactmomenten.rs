//! Handlers for `/contactmomenten` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contactmomenten` | Optional filters, see [`ListParams`] |
//! | `POST`   | `/contactmomenten` | Body: [`ContactMomentBody`]; returns 201 |
//! | `GET`    | `/contactmomenten/:id` | Single resource |
//! | `PUT`    | `/contactmomenten/:id` | Body: [`ContactMomentBody`]; full replacement |
//! | `PATCH`  | `/contactmomenten/:id` | Body: [`ContactMomentPatchBody`] |
//! | `DELETE` | `/contactmomenten/:id` | Returns 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use contactmomenten_core::{
  contactmoment::{
    ContactMoment, ContactMomentFilter, ContactMomentPatch, ContactMomentQuery,
    Initiator, NewContactMoment,
  },
  medewerker::{IdentificationInput, Medewerker},
  reference::ReferenceResolver,
  service::ContactMomentService,
  store::ContactMomentStore,
};
use serde::{
  Deserialize, Deserializer, Serialize,
  de::{IntoDeserializer, value::StringDeserializer},
};
use uuid::Uuid;

use crate::error::Result;

type Service<S> = State<Arc<ContactMomentService<S>>>;

// ─── Resource ────────────────────────────────────────────────────────────────

/// A contact moment as returned to clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMomentResource {
  pub url:                     String,
  pub vorig_contactmoment:     Option<String>,
  pub volgend_contactmoment:   Option<String>,
  pub bronorganisatie:         String,
  pub klant:                   String,
  pub interactiedatum:         DateTime<Utc>,
  pub kanaal:                  String,
  pub voorkeurskanaal:         String,
  pub voorkeurstaal:           String,
  pub tekst:                   String,
  pub onderwerp_links:         Vec<String>,
  pub initiatiefnemer:         Initiator,
  /// Empty when the embedded identification is used.
  pub medewerker:              String,
  pub medewerker_identificatie: Option<IdentificatieView>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificatieView {
  pub identificatie:          String,
  pub achternaam:             String,
  pub voorletters:            String,
  pub voorvoegsel_achternaam: String,
}

impl ContactMomentResource {
  pub fn new(resolver: &ReferenceResolver, cm: ContactMoment) -> Self {
    let (medewerker, medewerker_identificatie) = match cm.medewerker {
      Medewerker::Reference(r) => (r.into(), None),
      Medewerker::Identification(m) => (String::new(), Some(IdentificatieView {
        identificatie:          m.identification,
        achternaam:             m.surname,
        voorletters:            m.initials,
        voorvoegsel_achternaam: m.surname_prefix.unwrap_or_default(),
      })),
    };

    Self {
      url: resolver.url_for(cm.id),
      vorig_contactmoment: cm.previous.map(|id| resolver.url_for(id)),
      volgend_contactmoment: cm.next.map(|id| resolver.url_for(id)),
      bronorganisatie: cm.source_org,
      klant: cm.client_reference,
      interactiedatum: cm.interaction_time,
      kanaal: cm.channel,
      voorkeurskanaal: cm.preferred_channel,
      voorkeurstaal: cm.preferred_language,
      tekst: cm.text,
      onderwerp_links: cm.subject_links,
      initiatiefnemer: cm.initiator,
      medewerker,
      medewerker_identificatie,
    }
  }
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// Embedded identification as sent by a client. Missing sub-fields are
/// reported by the rule engine rather than by the parser.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentificatieBody {
  pub identificatie:          Option<String>,
  pub achternaam:             Option<String>,
  pub voorletters:            Option<String>,
  pub voorvoegsel_achternaam: Option<String>,
}

impl From<IdentificatieBody> for IdentificationInput {
  fn from(b: IdentificatieBody) -> Self {
    IdentificationInput {
      identification: b.identificatie,
      surname:        b.achternaam,
      initials:       b.voorletters,
      surname_prefix: b.voorvoegsel_achternaam,
    }
  }
}

/// `""` and `null` both mean "no previous".
fn non_empty(reference: Option<String>) -> Option<String> {
  reference.filter(|r| !r.is_empty())
}

/// JSON body accepted by `POST /contactmomenten` and `PUT /contactmomenten/:id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMomentBody {
  pub bronorganisatie:          String,
  #[serde(default)]
  pub klant:                    String,
  pub interactiedatum:          Option<DateTime<Utc>>,
  pub kanaal:                   String,
  #[serde(default)]
  pub voorkeurskanaal:          String,
  #[serde(default)]
  pub voorkeurstaal:            String,
  pub tekst:                    String,
  #[serde(default)]
  pub onderwerp_links:          Vec<String>,
  pub initiatiefnemer:          Initiator,
  pub medewerker:               Option<String>,
  pub medewerker_identificatie: Option<IdentificatieBody>,
  pub vorig_contactmoment:      Option<String>,
}

impl From<ContactMomentBody> for NewContactMoment {
  fn from(b: ContactMomentBody) -> Self {
    NewContactMoment {
      source_org:                b.bronorganisatie,
      client_reference:          b.klant,
      channel:                   b.kanaal,
      text:                      b.tekst,
      interaction_time:          b.interactiedatum,
      preferred_channel:         b.voorkeurskanaal,
      preferred_language:        b.voorkeurstaal,
      initiator:                 b.initiatiefnemer,
      medewerker_reference:      b.medewerker,
      medewerker_identification: b.medewerker_identificatie.map(Into::into),
      subject_links:             b.onderwerp_links,
      previous:                  non_empty(b.vorig_contactmoment),
    }
  }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// JSON body accepted by `PATCH /contactmomenten/:id`. Absent fields are left
/// untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactMomentPatchBody {
  pub bronorganisatie:          Option<String>,
  pub klant:                    Option<String>,
  pub interactiedatum:          Option<DateTime<Utc>>,
  pub kanaal:                   Option<String>,
  pub voorkeurskanaal:          Option<String>,
  pub voorkeurstaal:            Option<String>,
  pub tekst:                    Option<String>,
  pub onderwerp_links:          Option<Vec<String>>,
  pub initiatiefnemer:          Option<Initiator>,
  pub medewerker:               Option<String>,
  #[serde(deserialize_with = "present")]
  pub medewerker_identificatie: Option<Option<IdentificatieBody>>,
  #[serde(deserialize_with = "present")]
  pub vorig_contactmoment:      Option<Option<String>>,
}

impl From<ContactMomentPatchBody> for ContactMomentPatch {
  fn from(b: ContactMomentPatchBody) -> Self {
    ContactMomentPatch {
      source_org:                b.bronorganisatie,
      client_reference:          b.klant,
      channel:                   b.kanaal,
      text:                      b.tekst,
      interaction_time:          b.interactiedatum,
      preferred_channel:         b.voorkeurskanaal,
      preferred_language:        b.voorkeurstaal,
      initiator:                 b.initiatiefnemer,
      medewerker_reference:      b.medewerker,
      medewerker_identification: b
        .medewerker_identificatie
        .map(|m| m.map(Into::into)),
      subject_links:             b.onderwerp_links,
      previous:                  b.vorig_contactmoment.map(non_empty),
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Query parameters for `GET /contactmomenten`. An empty value is the same
/// as leaving the parameter out.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  #[serde(default, deserialize_with = "blank_as_none")]
  pub bronorganisatie:       Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub klant:                 Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub kanaal:                Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub voorkeurskanaal:       Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub voorkeurstaal:         Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub initiatiefnemer:       Option<Initiator>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub medewerker:            Option<String>,
  #[serde(
    rename = "interactiedatum__gte",
    default,
    deserialize_with = "blank_as_none"
  )]
  pub interactiedatum_gte:   Option<DateTime<Utc>>,
  #[serde(
    rename = "interactiedatum__lte",
    default,
    deserialize_with = "blank_as_none"
  )]
  pub interactiedatum_lte:   Option<DateTime<Utc>>,
  /// Reference to the predecessor; resolved before matching.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub vorig_contactmoment:   Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub volgend_contactmoment: Option<String>,
}

/// Parse a query value, treating `?name=` as absent.
fn blank_as_none<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  match Option::<String>::deserialize(d)? {
    Some(raw) if !raw.is_empty() => {
      let value: StringDeserializer<D::Error> = raw.into_deserializer();
      T::deserialize(value).map(Some)
    }
    _ => Ok(None),
  }
}

impl From<ListParams> for ContactMomentFilter {
  fn from(p: ListParams) -> Self {
    ContactMomentFilter {
      query:    ContactMomentQuery {
        source_org:           p.bronorganisatie,
        client_reference:     p.klant,
        channel:              p.kanaal,
        preferred_channel:    p.voorkeurskanaal,
        preferred_language:   p.voorkeurstaal,
        initiator:            p.initiatiefnemer,
        medewerker_reference: p.medewerker,
        interaction_after:    p.interactiedatum_gte,
        interaction_before:   p.interactiedatum_lte,
        previous:             None,
        next:                 None,
      },
      previous: p.vorig_contactmoment,
      next:     p.volgend_contactmoment,
    }
  }
}

/// `GET /contactmomenten[?voorkeurstaal=...][&vorigContactmoment=...]...`
pub async fn list<S>(
  State(service): Service<S>,
  params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ContactMomentResource>>>
where
  S: ContactMomentStore + 'static,
{
  let Query(params) = params?;
  let records = service.list(params.into()).await?;
  let resolver = service.resolver();
  Ok(Json(
    records
      .into_iter()
      .map(|cm| ContactMomentResource::new(resolver, cm))
      .collect(),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contactmomenten/:id`
pub async fn get_one<S>(
  State(service): Service<S>,
  id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ContactMomentResource>>
where
  S: ContactMomentStore + 'static,
{
  let Path(id) = id?;
  let cm = service.get(id).await?;
  Ok(Json(ContactMomentResource::new(service.resolver(), cm)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contactmomenten` returns 201 + the stored resource.
pub async fn create<S>(
  State(service): Service<S>,
  body: std::result::Result<Json<ContactMomentBody>, JsonRejection>,
) -> Result<impl IntoResponse>
where
  S: ContactMomentStore + 'static,
{
  let Json(body) = body?;
  let cm = service.create(body.into()).await?;
  Ok((
    StatusCode::CREATED,
    Json(ContactMomentResource::new(service.resolver(), cm)),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /contactmomenten/:id`: every field is replaced; an absent
/// `vorigContactmoment` unlinks.
pub async fn replace<S>(
  State(service): Service<S>,
  id: std::result::Result<Path<Uuid>, PathRejection>,
  body: std::result::Result<Json<ContactMomentBody>, JsonRejection>,
) -> Result<Json<ContactMomentResource>>
where
  S: ContactMomentStore + 'static,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let cm = service.replace(id, body.into()).await?;
  Ok(Json(ContactMomentResource::new(service.resolver(), cm)))
}

/// `PATCH /contactmomenten/:id`
pub async fn update<S>(
  State(service): Service<S>,
  id: std::result::Result<Path<Uuid>, PathRejection>,
  body: std::result::Result<Json<ContactMomentPatchBody>, JsonRejection>,
) -> Result<Json<ContactMomentResource>>
where
  S: ContactMomentStore + 'static,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let cm = service.update(id, body.into()).await?;
  Ok(Json(ContactMomentResource::new(service.resolver(), cm)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contactmomenten/:id` returns 204.
pub async fn delete_one<S>(
  State(service): Service<S>,
  id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode>
where
  S: ContactMomentStore + 'static,
{
  let Path(id) = id?;
  service.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn patch_body_distinguishes_null_from_absent() {
    let body: ContactMomentPatchBody =
      serde_json::from_str(r#"{"vorigContactmoment": null}"#).unwrap();
    assert_eq!(body.vorig_contactmoment, Some(None));
    assert!(body.medewerker_identificatie.is_none());

    let body: ContactMomentPatchBody = serde_json::from_str("{}").unwrap();
    assert_eq!(body.vorig_contactmoment, None);
  }

  #[test]
  fn empty_previous_means_unlink() {
    let body: ContactMomentPatchBody =
      serde_json::from_str(r#"{"vorigContactmoment": ""}"#).unwrap();
    let patch = ContactMomentPatch::from(body);
    assert_eq!(patch.previous, Some(None));
  }

  #[test]
  fn list_params_accept_range_suffixes() {
    let params: ListParams = serde_json::from_value(serde_json::json!({
      "interactiedatum__gte": "2019-01-01T00:00:00Z",
      "voorkeurstaal": "nld",
    }))
    .unwrap();
    let filter = ContactMomentFilter::from(params);
    assert_eq!(filter.query.preferred_language.as_deref(), Some("nld"));
    assert!(filter.query.interaction_after.is_some());
  }

  #[test]
  fn blank_list_params_are_absent() {
    let params: ListParams = serde_json::from_value(serde_json::json!({
      "vorigContactmoment": "",
      "initiatiefnemer": "",
      "interactiedatum__lte": "",
      "kanaal": "",
      "klant": "x",
    }))
    .unwrap();
    let filter = ContactMomentFilter::from(params);
    assert_eq!(filter.previous, None);
    assert_eq!(filter.query.initiator, None);
    assert_eq!(filter.query.interaction_before, None);
    assert_eq!(filter.query.channel, None);
    assert_eq!(filter.query.client_reference.as_deref(), Some("x"));
  }
}
