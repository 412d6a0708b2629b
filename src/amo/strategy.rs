//! How each related entity is fetched. amoCRM filters users and contacts
//! server-side but has no filter for statuses, so those come from the full
//! pipeline list and are narrowed down locally.

use crate::model::data::{
    Contact, ContactsEmbedded, EntityId, Page, PipelinesEmbedded, Status, User, UsersEmbedded,
};
use log::debug;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Write;

pub trait RelatedFetch {
    type Entity;
    type Envelope: DeserializeOwned;

    fn path(&self) -> &str;

    /// Raw query string sent with the request, `None` for no query at all.
    fn query(&self, ids: &[EntityId]) -> Option<String>;

    /// Pulls the requested entities out of a decoded response, keeping
    /// upstream order.
    fn select(&self, envelope: Self::Envelope, ids: &[EntityId]) -> Vec<Self::Entity>;
}

/// `filter[id][0]=1&filter[id][1]=2…`
pub fn filter_query(param: &str, ids: &[EntityId]) -> String {
    ids.iter()
        .enumerate()
        .fold(String::new(), |mut output, (ind, id)| {
            if !output.is_empty() {
                output.push('&');
            }
            let _ = write!(output, "filter[{param}][{ind}]={id}");
            output
        })
}

// amoCRM drops an empty filter and answers with a page of everything, so the
// requested ids are enforced here as well.
fn keep_requested<T>(
    items: impl IntoIterator<Item = T>,
    ids: &[EntityId],
    id: impl Fn(&T) -> EntityId,
) -> Vec<T> {
    let wanted: HashSet<EntityId> = ids.iter().copied().collect();
    items.into_iter().filter(|item| wanted.contains(&id(item))).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStatuses;

impl RelatedFetch for PipelineStatuses {
    type Entity = Status;
    type Envelope = Page<PipelinesEmbedded>;

    fn path(&self) -> &str {
        "/leads/pipelines"
    }

    fn query(&self, _ids: &[EntityId]) -> Option<String> {
        None
    }

    fn select(&self, envelope: Self::Envelope, ids: &[EntityId]) -> Vec<Status> {
        let pipelines = envelope._embedded.and_then(|e| e.pipelines).unwrap_or_default();
        debug!("scanning {} pipelines for {} statuses", pipelines.len(), ids.len());

        let statuses = pipelines
            .into_iter()
            .filter_map(|p| p._embedded.and_then(|e| e.statuses))
            .flatten();
        keep_requested(statuses, ids, |s| s.id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UsersById;

impl RelatedFetch for UsersById {
    type Entity = User;
    type Envelope = Page<UsersEmbedded>;

    fn path(&self) -> &str {
        "/users"
    }

    fn query(&self, ids: &[EntityId]) -> Option<String> {
        Some(filter_query("id", ids))
    }

    fn select(&self, envelope: Self::Envelope, ids: &[EntityId]) -> Vec<User> {
        let users = envelope._embedded.and_then(|e| e.users).unwrap_or_default();
        keep_requested(users, ids, |u| u.id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactsById;

impl RelatedFetch for ContactsById {
    type Entity = Contact;
    type Envelope = Page<ContactsEmbedded>;

    fn path(&self) -> &str {
        "/contacts"
    }

    fn query(&self, ids: &[EntityId]) -> Option<String> {
        Some(filter_query("id", ids))
    }

    fn select(&self, envelope: Self::Envelope, ids: &[EntityId]) -> Vec<Contact> {
        let contacts = envelope._embedded.and_then(|e| e.contacts).unwrap_or_default();
        keep_requested(contacts, ids, |c| c.id)
    }
}
