use serde::Deserialize;

pub type EntityId = u64;

/// Paginated amoCRM envelope. Every collection endpoint wraps its items into
/// `_embedded.{collection}`; the envelope itself may lack `_embedded` entirely.
#[derive(Deserialize, Debug, Clone)]
pub struct Page<E> {
    pub _embedded: Option<E>,
}

// region:    --- Leads

#[derive(Deserialize, Debug, Clone)]
pub struct LeadsEmbedded {
    pub leads: Option<Vec<Lead>>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone)]
pub struct Lead {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub price: i64,
    pub created_at: i64,
    pub status_id: EntityId,
    pub responsible_user_id: EntityId,
    pub pipeline_id: EntityId,
    pub _embedded: Option<LeadEmbedded>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LeadEmbedded {
    pub contacts: Option<Vec<ContactRef>>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone)]
pub struct ContactRef {
    pub id: EntityId,
    #[serde(default)]
    pub is_main: bool,
}

impl Lead {
    /// Contacts embedded via `with=contacts`, empty when amoCRM sent none.
    pub fn contact_refs(&self) -> &[ContactRef] {
        self._embedded
            .as_ref()
            .and_then(|e| e.contacts.as_deref())
            .unwrap_or_default()
    }
}

// endregion: --- Leads

// region:    --- Pipelines & statuses

#[derive(Deserialize, Debug, Clone)]
pub struct PipelinesEmbedded {
    pub pipelines: Option<Vec<Pipeline>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Pipeline {
    pub _embedded: Option<PipelineEmbedded>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PipelineEmbedded {
    pub statuses: Option<Vec<Status>>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Status {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub pipeline_id: EntityId,
}

// endregion: --- Pipelines & statuses

// region:    --- Users

#[derive(Deserialize, Debug, Clone)]
pub struct UsersEmbedded {
    pub users: Option<Vec<User>>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub rights: serde_json::Value,
}

// endregion: --- Users

// region:    --- Contacts

#[derive(Deserialize, Debug, Clone)]
pub struct ContactsEmbedded {
    pub contacts: Option<Vec<Contact>>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: EntityId,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub custom_fields_values: Option<Vec<CustomField>>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CustomField {
    pub field_id: u64,
    #[serde(default)]
    pub field_name: String,
    pub field_code: Option<String>,
    pub field_type: Option<String>,
    pub values: Vec<Val>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Val {
    #[serde(default)]
    pub value: FlexibleType,
    pub enum_id: Option<u64>,
    pub enum_code: Option<String>,
}

/// amoCRM returns numeric custom fields as JSON numbers and the rest as
/// strings; list and legal-entity fields carry objects, some values are null.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FlexibleType {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Other(serde_json::Value),
}

impl Default for FlexibleType {
    fn default() -> Self {
        FlexibleType::Other(serde_json::Value::Null)
    }
}

impl FlexibleType {
    /// Scalar values as text, `None` for objects, arrays and null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FlexibleType::Str(s) => Some(s.clone()),
            FlexibleType::Int(i) => Some(i.to_string()),
            FlexibleType::Float(n) => Some(n.to_string()),
            FlexibleType::Bool(b) => Some(b.to_string()),
            FlexibleType::Other(_) => None,
        }
    }
}

// endregion: --- Contacts
