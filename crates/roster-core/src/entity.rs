//! Roster entities and their wire mapping.
//!
//! Every resource shares the fields of [`BaseRecord`]; [`User`] and
//! [`ClassRecord`] embed it and layer their own fields on top. Decoding goes
//! through serde with the wire key names spelled out per field, so the
//! semantic names used here (`active`, `first_name`, ...) never leak onto the
//! wire. Encoding builds the wire object by hand and cannot fail.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{
  Deserialize, Deserializer,
  de::{DeserializeOwned, Error as _, Unexpected},
};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A JSON object, as exchanged with the roster API.
pub type WireObject = Map<String, Value>;

// ─── Entity trait ────────────────────────────────────────────────────────────

/// Bidirectional mapping between a typed record and its wire object.
pub trait Entity: DeserializeOwned {
  /// Human-readable kind, used in decode errors.
  const KIND: &'static str;

  /// Decode a wire object. Fails on a missing required field or an
  /// unrecognised enum value; never substitutes a default for either.
  fn decode(wire: &Value) -> Result<Self> {
    Self::deserialize(wire).map_err(|source| Error::Decode {
      kind: Self::KIND,
      source,
    })
  }

  /// Encode back into the wire shape.
  fn encode(&self) -> WireObject;
}

/// Decode every element of the `key` array in a response envelope such as
/// `{"users": [...]}`.
pub fn decode_collection<E: Entity>(
  envelope: &Value,
  key: &'static str,
) -> Result<Vec<E>> {
  envelope
    .get(key)
    .and_then(Value::as_array)
    .ok_or(Error::MissingCollection(key))?
    .iter()
    .map(E::decode)
    .collect()
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Lifecycle status of a record on the remote system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Status {
  #[serde(rename = "active")]
  Active,
  #[serde(rename = "tobedeleted")]
  ToBeDeleted,
}

impl Status {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::ToBeDeleted => "tobedeleted",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Teacher,
  Student,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Teacher => "teacher",
      Self::Student => "student",
    }
  }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// An ISO-8601 timestamp as sent by the API.
///
/// The wire text is kept verbatim and re-encoded unchanged, so offsets and
/// fractional seconds survive a round trip. Timestamps without an offset are
/// read as UTC; a bare date is midnight UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
  raw:     String,
  instant: DateTime<Utc>,
}

impl Timestamp {
  /// The wire text.
  pub fn as_str(&self) -> &str { &self.raw }

  /// The point in time, normalised to UTC.
  pub fn instant(&self) -> DateTime<Utc> { self.instant }
}

impl From<DateTime<Utc>> for Timestamp {
  fn from(instant: DateTime<Utc>) -> Self {
    Self {
      raw: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
      instant,
    }
  }
}

impl FromStr for Timestamp {
  type Err = chrono::ParseError;

  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    let instant = match DateTime::parse_from_rfc3339(raw) {
      Ok(dt) => dt.with_timezone(&Utc),
      Err(rfc3339) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| {
          NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
        .map_err(|_| rfc3339)?,
    };
    Ok(Self { raw: raw.to_string(), instant })
  }
}

impl fmt::Display for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

impl<'de> Deserialize<'de> for Timestamp {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw
      .parse()
      .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Fields shared by every roster resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BaseRecord {
  /// Stable identifier assigned by the remote system.
  #[serde(rename = "sourcedId")]
  pub sourced_id:    String,
  pub status:        Status,
  #[serde(rename = "dateLastModified")]
  pub last_modified: Timestamp,
  /// Open key/value bag. Missing and `null` both decode as empty.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub metadata:      WireObject,
}

impl Entity for BaseRecord {
  const KIND: &'static str = "record";

  fn encode(&self) -> WireObject {
    let mut wire = WireObject::new();
    wire.insert("sourcedId".into(), self.sourced_id.clone().into());
    wire.insert("status".into(), self.status.as_str().into());
    wire.insert("dateLastModified".into(), self.last_modified.as_str().into());
    wire.insert("metadata".into(), Value::Object(self.metadata.clone()));
    wire
  }
}

/// A teacher or a student.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
  #[serde(flatten)]
  pub base:        BaseRecord,
  /// Sent as the string `"true"` or `"false"`.
  #[serde(rename = "enabledUser", deserialize_with = "string_flag")]
  pub active:      bool,
  pub username:    String,
  #[serde(rename = "givenName")]
  pub first_name:  String,
  #[serde(rename = "middleName", default)]
  pub middle_name: Option<String>,
  #[serde(rename = "familyName")]
  pub last_name:   String,
  pub role:        Role,
  #[serde(default)]
  pub email:       Option<String>,
}

impl Entity for User {
  const KIND: &'static str = "user";

  fn encode(&self) -> WireObject {
    let mut wire = self.base.encode();
    wire.insert("enabledUser".into(), self.active.to_string().into());
    wire.insert("username".into(), self.username.clone().into());
    wire.insert("givenName".into(), self.first_name.clone().into());
    wire.insert("middleName".into(), self.middle_name.clone().into());
    wire.insert("familyName".into(), self.last_name.clone().into());
    wire.insert("role".into(), self.role.as_str().into());
    wire.insert("email".into(), self.email.clone().into());
    wire
  }
}

/// A course section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassRecord {
  #[serde(flatten)]
  pub base:    BaseRecord,
  #[serde(rename = "title")]
  pub name:    String,
  /// Period labels in the order the API returned them.
  pub periods: Vec<String>,
}

impl Entity for ClassRecord {
  const KIND: &'static str = "class";

  fn encode(&self) -> WireObject {
    let mut wire = self.base.encode();
    wire.insert("title".into(), self.name.clone().into());
    wire.insert("periods".into(), self.periods.clone().into());
    wire
  }
}

// ─── Field decoders ──────────────────────────────────────────────────────────

fn null_as_empty<'de, D>(deserializer: D) -> Result<WireObject, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<WireObject>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  if raw.eq_ignore_ascii_case("true") {
    Ok(true)
  } else if raw.eq_ignore_ascii_case("false") {
    Ok(false)
  } else {
    Err(D::Error::invalid_value(
      Unexpected::Str(&raw),
      &"\"true\" or \"false\"",
    ))
  }
}
