use crate::calendar::EditMode;
use crate::keys::{LogKey, ScheduleKey, StorageKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Perfil {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_mat")]
    pub mat: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub perfil: Perfil,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user as returned to clients: everything but the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub mat: String,
    pub nome: String,
    pub perfil: Perfil,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            mat: user.mat.clone(),
            nome: user.nome.clone(),
            perfil: user.perfil,
            extra: user.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    pub start: u32,
    pub end: u32,
}

impl Vacation {
    pub fn contains(&self, day: u32) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Typed view of one schedule row, as the calendar needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub mat: String,
    pub dias: Vec<u32>,
    pub vacation: Option<Vacation>,
    pub eq: Option<String>,
}

/// One stored schedule row, kept exactly as the client sent it.
///
/// Only `mat`, `dias`, `vacation` and `eq`/`team` are ever read, and only
/// `dias` and `vacation` are ever written back (by a calendar toggle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleRow(pub Value);

impl ScheduleRow {
    pub fn mat(&self) -> Option<String> {
        row_mat(&self.0)
    }

    pub fn is_for(&self, mat: &str) -> bool {
        row_is_for(&self.0, mat)
    }

    /// Reads the row leniently: unreadable fields come back empty.
    pub fn assignment(&self) -> Assignment {
        let dias = self
            .0
            .get("dias")
            .and_then(Value::as_array)
            .map(|days| days.iter().filter_map(day_number).collect())
            .unwrap_or_default();
        let vacation = self
            .0
            .get("vacation")
            .and_then(|raw| Vacation::deserialize(raw).ok());
        let eq = self
            .0
            .get("eq")
            .or_else(|| self.0.get("team"))
            .and_then(label);
        Assignment {
            mat: self.mat().unwrap_or_default(),
            dias,
            vacation,
            eq,
        }
    }

    /// Writes `dias` and `vacation` from `assignment`, leaving every other
    /// field untouched. A cleared vacation is written as `null` only when the
    /// row already had the field.
    pub fn apply(&mut self, assignment: &Assignment) {
        let Value::Object(fields) = &mut self.0 else {
            return;
        };
        fields.insert("dias".to_string(), Value::from(assignment.dias.clone()));
        match assignment.vacation {
            Some(range) => {
                fields.insert(
                    "vacation".to_string(),
                    serde_json::json!({"start": range.start, "end": range.end}),
                );
            }
            None => {
                if let Some(existing) = fields.get_mut("vacation") {
                    *existing = Value::Null;
                }
            }
        }
    }
}

/// `mat` of a raw row, as text. Numbers are accepted.
pub fn row_mat(row: &Value) -> Option<String> {
    label(row.get("mat")?).map(|mat| mat.trim().to_string())
}

pub fn row_is_for(row: &Value, mat: &str) -> bool {
    row_mat(row).is_some_and(|own| own == mat.trim())
}

fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn day_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|day| u32::try_from(day).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(pub Value);

/// A string-keyed table of the persisted document.
///
/// Keys that decode into `K` and hold an array are typed entries. Anything
/// else is kept verbatim in `foreign` so a whole-document rewrite never drops
/// it. Row contents never decide the split: `T` must accept any JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedTable<K, T> {
    entries: BTreeMap<K, Vec<T>>,
    foreign: BTreeMap<String, Value>,
}

impl<K, T> Default for KeyedTable<K, T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            foreign: BTreeMap::new(),
        }
    }
}

impl<K: StorageKey, T> KeyedTable<K, T> {
    pub fn get(&self, key: &K) -> Option<&Vec<T>> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, items: Vec<T>) {
        self.foreign.remove(&key.encode());
        self.entries.insert(key, items);
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut Vec<T>)> {
        self.entries.iter_mut()
    }

    pub fn foreign(&self) -> &BTreeMap<String, Value> {
        &self.foreign
    }

    pub fn foreign_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.foreign.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.foreign.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum EntryRef<'a, T> {
    Typed(&'a [T]),
    Raw(&'a Value),
}

impl<K: StorageKey, T: Serialize> Serialize for KeyedTable<K, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut merged: BTreeMap<String, EntryRef<'_, T>> = self
            .foreign
            .iter()
            .map(|(key, value)| (key.clone(), EntryRef::Raw(value)))
            .collect();
        for (key, items) in &self.entries {
            merged.insert(key.encode(), EntryRef::Typed(items.as_slice()));
        }
        merged.serialize(serializer)
    }
}

impl<'de, K: StorageKey, T: DeserializeOwned> Deserialize<'de> for KeyedTable<K, T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut table = Self::default();
        for (key, value) in raw {
            let typed = K::decode(&key).and_then(|decoded| {
                Vec::<T>::deserialize(&value)
                    .ok()
                    .map(|items| (decoded, items))
            });
            match typed {
                Some((decoded, items)) => {
                    table.entries.insert(decoded, items);
                }
                None => {
                    table.foreign.insert(key, value);
                }
            }
        }
        Ok(table)
    }
}

/// The single persisted root object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub schedules: KeyedTable<ScheduleKey, ScheduleRow>,
    #[serde(default)]
    pub logs: KeyedTable<LogKey, LogEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn find_user(&self, mat: &str) -> Option<&User> {
        self.users.iter().find(|user| user.mat.trim() == mat.trim())
    }

    pub fn find_user_mut(&mut self, mat: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.mat.trim() == mat.trim())
    }
}

fn deserialize_mat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMat {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawMat::deserialize(deserializer)? {
        RawMat::Text(text) => text,
        RawMat::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedVigilante {
    #[serde(deserialize_with = "deserialize_mat")]
    pub mat: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub perfil: Option<Perfil>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUsersPayload {
    pub vigilantes: Vec<SeedVigilante>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserPayload {
    #[serde(deserialize_with = "deserialize_mat")]
    pub mat: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub perfil: Option<Perfil>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginPayload {
    #[serde(default, deserialize_with = "deserialize_mat")]
    pub mat: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[serde(default, deserialize_with = "deserialize_mat")]
    pub mat: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleDayPayload {
    pub month: String,
    #[serde(default, rename = "type")]
    pub variant: Option<String>,
    #[serde(deserialize_with = "deserialize_mat")]
    pub mat: String,
    pub day: u32,
    pub mode: EditMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUsersResponse {
    pub success: bool,
    pub added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
