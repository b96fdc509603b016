// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use jobtrack_app::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, ContactId, ContactPatch,
    ContactStatus, ListQuery, NetworkContact, NewApplication, NewNetworkContact, RecordStatus,
    RecordStore, UserId,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{APPLICATIONS_TABLE, CONTACTS_TABLE, Client, Session, eq_filter, ilike_contains};

/// `RecordStore` over the hosted tables using one signed-in session.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    session: Session,
    refreshed: bool,
}

impl RemoteStore {
    pub fn new(client: Client, session: Session) -> Self {
        Self {
            client,
            session,
            refreshed: false,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Returns the session once after it was refreshed so the caller can
    /// persist the new tokens.
    pub fn take_refreshed(&mut self) -> Option<&Session> {
        if !self.refreshed {
            return None;
        }
        self.refreshed = false;
        Some(&self.session)
    }

    fn token(&mut self, owner: &UserId) -> Result<String> {
        if self.session.user.id != *owner {
            bail!(
                "session belongs to {} but the request names {owner} -- sign in again",
                self.session.user.id
            );
        }
        if self.session.is_expired(OffsetDateTime::now_utc()) {
            let refreshed = self.client.refresh(&self.session)?;
            info!("refreshed session for {}", refreshed.user.email);
            self.session = refreshed;
            self.refreshed = true;
        }
        Ok(self.session.access_token.clone())
    }

    fn list<S, T>(
        &mut self,
        table: &str,
        owner: &UserId,
        query: &ListQuery<S>,
    ) -> Result<Vec<T>>
    where
        S: RecordStatus,
        T: serde::de::DeserializeOwned,
    {
        let token = self.token(owner)?;
        let owner_filter = eq_filter(owner.as_str());
        let status_filter = query.filter.status().map(|status| eq_filter(status.as_str()));
        let limit = query.limit.map(|limit| limit.to_string());

        let mut params = vec![
            ("select", "*"),
            ("user_id", owner_filter.as_str()),
            ("order", "created_at.desc"),
        ];
        if let Some(status) = &status_filter {
            params.push(("status", status.as_str()));
        }
        if query.active_only {
            params.push(("active_apps", "eq.true"));
        }
        if let Some(limit) = &limit {
            params.push(("limit", limit.as_str()));
        }
        debug!("list {table} filter={}", query.filter.label());
        self.client.select(&token, table, &params)
    }

    fn get<T: serde::de::DeserializeOwned>(
        &mut self,
        table: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<Option<T>> {
        let token = self.token(owner)?;
        let id_filter = eq_filter(id);
        let owner_filter = eq_filter(owner.as_str());
        let mut rows: Vec<T> = self.client.select(
            &token,
            table,
            &[
                ("select", "*"),
                ("id", id_filter.as_str()),
                ("user_id", owner_filter.as_str()),
                ("limit", "1"),
            ],
        )?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    fn insert<D: Serialize, T: serde::de::DeserializeOwned>(
        &mut self,
        table: &str,
        owner: &UserId,
        draft: &D,
        created_at: OffsetDateTime,
    ) -> Result<T> {
        let token = self.token(owner)?;
        self.client.insert(
            &token,
            table,
            &InsertRow {
                draft,
                user_id: owner,
                created_at,
            },
        )
    }

    fn update<P: Serialize>(
        &mut self,
        table: &str,
        owner: &UserId,
        id: &str,
        patch: &P,
    ) -> Result<()> {
        let token = self.token(owner)?;
        let id_filter = eq_filter(id);
        let owner_filter = eq_filter(owner.as_str());
        self.client.patch(
            &token,
            table,
            &[
                ("id", id_filter.as_str()),
                ("user_id", owner_filter.as_str()),
            ],
            patch,
        )
    }

    fn delete(&mut self, table: &str, owner: &UserId, id: &str) -> Result<()> {
        let token = self.token(owner)?;
        let id_filter = eq_filter(id);
        let owner_filter = eq_filter(owner.as_str());
        self.client.delete(
            &token,
            table,
            &[
                ("id", id_filter.as_str()),
                ("user_id", owner_filter.as_str()),
            ],
        )
    }
}

impl RecordStore for RemoteStore {
    fn list_applications(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        self.list(APPLICATIONS_TABLE, owner, query)
    }

    fn get_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<Application>> {
        self.get(APPLICATIONS_TABLE, owner, id.as_str())
    }

    fn insert_application(
        &mut self,
        owner: &UserId,
        draft: &NewApplication,
        created_at: OffsetDateTime,
    ) -> Result<Application> {
        self.insert(APPLICATIONS_TABLE, owner, draft, created_at)
    }

    fn update_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.update(APPLICATIONS_TABLE, owner, id.as_str(), patch)
    }

    fn delete_application(&mut self, owner: &UserId, id: &ApplicationId) -> Result<()> {
        self.delete(APPLICATIONS_TABLE, owner, id.as_str())
    }

    fn list_contacts(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ContactStatus>,
    ) -> Result<Vec<NetworkContact>> {
        // Contacts have no active flag; the scope only applies to applications.
        let query = ListQuery {
            active_only: false,
            ..*query
        };
        self.list(CONTACTS_TABLE, owner, &query)
    }

    fn get_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<Option<NetworkContact>> {
        self.get(CONTACTS_TABLE, owner, id.as_str())
    }

    fn insert_contact(
        &mut self,
        owner: &UserId,
        draft: &NewNetworkContact,
        created_at: OffsetDateTime,
    ) -> Result<NetworkContact> {
        self.insert(CONTACTS_TABLE, owner, draft, created_at)
    }

    fn update_contact(
        &mut self,
        owner: &UserId,
        id: &ContactId,
        patch: &ContactPatch,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.update(CONTACTS_TABLE, owner, id.as_str(), patch)
    }

    fn delete_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<()> {
        self.delete(CONTACTS_TABLE, owner, id.as_str())
    }

    fn contacts_at_company(
        &mut self,
        owner: &UserId,
        company: &str,
    ) -> Result<Vec<NetworkContact>> {
        let token = self.token(owner)?;
        let owner_filter = eq_filter(owner.as_str());
        let company_filter = ilike_contains(company);
        self.client
            .select(
                &token,
                CONTACTS_TABLE,
                &[
                    ("select", "*"),
                    ("user_id", owner_filter.as_str()),
                    ("company", company_filter.as_str()),
                    ("order", "name.asc"),
                ],
            )
            .with_context(|| format!("load contacts at {company:?}"))
    }
}

#[derive(Serialize)]
struct InsertRow<'a, D: Serialize> {
    #[serde(flatten)]
    draft: &'a D,
    user_id: &'a UserId,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}
