use crate::model::data::{Contact, EntityId, Lead, Status, User};
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct JoinedLead {
    pub name: String,
    pub price: i64,
    pub created_at: i64,
    /// `null` when the lead's status was not among the fetched statuses.
    pub status: Option<JoinedStatus>,
    /// `null` when the responsible user was not returned by amoCRM.
    pub responsible: Option<JoinedResponsible>,
    pub contacts: Vec<JoinedContact>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct JoinedStatus {
    pub name: String,
    pub color: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct JoinedResponsible {
    pub name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct JoinedContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl From<&Status> for JoinedStatus {
    fn from(s: &Status) -> Self {
        JoinedStatus {
            name: s.name.clone(),
            color: s.color.clone(),
        }
    }
}

impl From<&User> for JoinedResponsible {
    fn from(u: &User) -> Self {
        JoinedResponsible {
            name: u.name.clone(),
        }
    }
}

impl From<&Contact> for JoinedContact {
    fn from(c: &Contact) -> Self {
        let mut joined = JoinedContact {
            name: c.name.clone(),
            ..Default::default()
        };

        // Later fields with the same code overwrite earlier ones
        for field in c.custom_fields_values.iter().flatten() {
            let slot = match field.field_code.as_deref() {
                Some("PHONE") => &mut joined.phone,
                Some("EMAIL") => &mut joined.email,
                Some("POSITION") => &mut joined.position,
                _ => continue,
            };
            if let Some(text) = field.values.first().and_then(|v| v.value.as_text()) {
                *slot = Some(text);
            }
        }

        joined
    }
}

/// Builds one [`JoinedLead`] per lead, in lead order. Related records that
/// were not fetched never fail the join: status and responsible become
/// `None`, unmatched contacts are left out.
pub fn join_entities(
    leads: &[Lead],
    statuses: &[Status],
    users: &[User],
    contacts: &[Contact],
) -> Vec<JoinedLead> {
    let statuses = index_by_id(statuses, |s| s.id);
    let users = index_by_id(users, |u| u.id);
    let contact_index = index_by_id(contacts, |c| c.id);

    leads
        .iter()
        .map(|lead| {
            let status = statuses.get(&lead.status_id).map(|&s| JoinedStatus::from(s));
            if status.is_none() {
                warn!("lead {}: status {} not found", lead.id, lead.status_id);
            }

            let responsible = users
                .get(&lead.responsible_user_id)
                .map(|&u| JoinedResponsible::from(u));
            if responsible.is_none() {
                warn!(
                    "lead {}: responsible user {} not found",
                    lead.id, lead.responsible_user_id
                );
            }

            let contacts = lead
                .contact_refs()
                .iter()
                .filter_map(|r| match contact_index.get(&r.id) {
                    Some(&c) => Some(JoinedContact::from(c)),
                    None => {
                        warn!("lead {}: contact {} not found", lead.id, r.id);
                        None
                    }
                })
                .collect();

            JoinedLead {
                name: lead.name.clone(),
                price: lead.price,
                created_at: lead.created_at,
                status,
                responsible,
                contacts,
            }
        })
        .collect()
}

// First record wins on duplicate ids, same as a linear find.
fn index_by_id<'a, T>(items: &'a [T], id: impl Fn(&T) -> EntityId) -> HashMap<EntityId, &'a T> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        index.entry(id(item)).or_insert(item);
    }
    index
}
