use crate::amo::{AmoClient, ContactsById, PipelineStatuses, RelatedFetch, UsersById};
use crate::error::Error;
use crate::model::data::{Contact, Status, User};
use crate::model::joined::{join_entities, JoinedLead};
use crate::model::relation::RelationIds;
use crate::Result;
use log::{debug, error};

/// Leads joined with their status, responsible user and contacts.
pub struct LeadsPipeline<S = PipelineStatuses, U = UsersById, C = ContactsById> {
    client: AmoClient,
    statuses: S,
    users: U,
    contacts: C,
}

impl LeadsPipeline {
    pub fn new(client: AmoClient) -> Self {
        LeadsPipeline::with_strategies(client, PipelineStatuses, UsersById, ContactsById)
    }
}

impl<S, U, C> LeadsPipeline<S, U, C>
where
    S: RelatedFetch<Entity = Status>,
    U: RelatedFetch<Entity = User>,
    C: RelatedFetch<Entity = Contact>,
{
    pub fn with_strategies(client: AmoClient, statuses: S, users: U, contacts: C) -> Self {
        LeadsPipeline {
            client,
            statuses,
            users,
            contacts,
        }
    }

    /// Any failing request fails the whole call with [`Error::FetchFailed`];
    /// the cause is logged here and never handed to the caller.
    pub async fn joined_leads(&self) -> Result<Vec<JoinedLead>> {
        self.run().await.map_err(|err| {
            error!("Failed to obtain joined leads: {err}");
            Error::FetchFailed
        })
    }

    async fn run(&self) -> Result<Vec<JoinedLead>> {
        let leads = self.client.fetch_leads().await?;

        let ids = RelationIds::from_leads(&leads);
        debug!("relation ids: {:?}", ids);

        // Independent of each other; the first error drops the other two
        let (statuses, users, contacts) = tokio::try_join!(
            self.client.fetch_related(&self.statuses, &ids.status_ids),
            self.client.fetch_related(&self.users, &ids.responsible_ids),
            self.client.fetch_related(&self.contacts, &ids.contact_ids),
        )?;

        Ok(join_entities(&leads, &statuses, &users, &contacts))
    }
}
