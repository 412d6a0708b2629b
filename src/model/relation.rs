use crate::model::data::{EntityId, Lead};
use std::collections::HashSet;

/// Identifiers of every entity the leads point at, each list free of
/// duplicates and kept in first-occurrence order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RelationIds {
    pub status_ids: Vec<EntityId>,
    pub responsible_ids: Vec<EntityId>,
    pub contact_ids: Vec<EntityId>,
}

impl RelationIds {
    pub fn from_leads(leads: &[Lead]) -> RelationIds {
        let mut statuses = IdSet::default();
        let mut responsible = IdSet::default();
        let mut contacts = IdSet::default();

        for lead in leads {
            statuses.insert(lead.status_id);
            responsible.insert(lead.responsible_user_id);
            for contact in lead.contact_refs() {
                contacts.insert(contact.id);
            }
        }

        RelationIds {
            status_ids: statuses.ids,
            responsible_ids: responsible.ids,
            contact_ids: contacts.ids,
        }
    }
}

#[derive(Default)]
struct IdSet {
    seen: HashSet<EntityId>,
    ids: Vec<EntityId>,
}

impl IdSet {
    fn insert(&mut self, id: EntityId) {
        if self.seen.insert(id) {
            self.ids.push(id);
        }
    }
}
