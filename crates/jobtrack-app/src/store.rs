// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Storage seam between the coordinators and a backend.
//!
//! Every call names the owner explicitly. Implementations must scope both
//! reads and writes to that owner; a row owned by someone else behaves as
//! if it did not exist.

use anyhow::Result;
use std::fmt;
use time::OffsetDateTime;

use crate::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, ContactId, ContactPatch,
    ContactStatus, ListQuery, NetworkContact, NewApplication, NewNetworkContact, Record, UserId,
};

pub trait RecordStore {
    /// Owned applications, newest first, narrowed by the query.
    fn list_applications(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>>;

    fn get_application(&mut self, owner: &UserId, id: &ApplicationId)
    -> Result<Option<Application>>;

    /// Returns the stored row.
    fn insert_application(
        &mut self,
        owner: &UserId,
        draft: &NewApplication,
        created_at: OffsetDateTime,
    ) -> Result<Application>;

    fn update_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> Result<()>;

    fn delete_application(&mut self, owner: &UserId, id: &ApplicationId) -> Result<()>;

    fn list_contacts(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ContactStatus>,
    ) -> Result<Vec<NetworkContact>>;

    fn get_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<Option<NetworkContact>>;

    fn insert_contact(
        &mut self,
        owner: &UserId,
        draft: &NewNetworkContact,
        created_at: OffsetDateTime,
    ) -> Result<NetworkContact>;

    fn update_contact(&mut self, owner: &UserId, id: &ContactId, patch: &ContactPatch)
    -> Result<()>;

    fn delete_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<()>;

    /// Owned contacts whose company contains `company` case-insensitively,
    /// ordered by name.
    fn contacts_at_company(&mut self, owner: &UserId, company: &str)
    -> Result<Vec<NetworkContact>>;
}

/// Routes generic coordinator calls to the per-table store methods.
pub trait Persisted: Record + Sized {
    type Draft: Clone + fmt::Debug;

    /// Lowercase singular, as in "Failed to add application".
    const SINGULAR: &'static str;
    /// Lowercase plural, as in "Failed to load your applications".
    const PLURAL: &'static str;

    fn list<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        query: &ListQuery<Self::Status>,
    ) -> Result<Vec<Self>>;

    fn fetch<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &Self::Id,
    ) -> Result<Option<Self>>;

    fn insert<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        draft: &Self::Draft,
        created_at: OffsetDateTime,
    ) -> Result<Self>;

    fn update<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &Self::Id,
        patch: &Self::Patch,
    ) -> Result<()>;

    fn remove<S: RecordStore + ?Sized>(store: &mut S, owner: &UserId, id: &Self::Id)
    -> Result<()>;
}

impl Persisted for Application {
    type Draft = NewApplication;

    const SINGULAR: &'static str = "application";
    const PLURAL: &'static str = "applications";

    fn list<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Self>> {
        store.list_applications(owner, query)
    }

    fn fetch<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<Self>> {
        store.get_application(owner, id)
    }

    fn insert<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        draft: &NewApplication,
        created_at: OffsetDateTime,
    ) -> Result<Self> {
        store.insert_application(owner, draft, created_at)
    }

    fn update<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> Result<()> {
        store.update_application(owner, id, patch)
    }

    fn remove<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<()> {
        store.delete_application(owner, id)
    }
}

impl Persisted for NetworkContact {
    type Draft = NewNetworkContact;

    const SINGULAR: &'static str = "contact";
    const PLURAL: &'static str = "network contacts";

    fn list<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        query: &ListQuery<ContactStatus>,
    ) -> Result<Vec<Self>> {
        store.list_contacts(owner, query)
    }

    fn fetch<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Self>> {
        store.get_contact(owner, id)
    }

    fn insert<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        draft: &NewNetworkContact,
        created_at: OffsetDateTime,
    ) -> Result<Self> {
        store.insert_contact(owner, draft, created_at)
    }

    fn update<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &ContactId,
        patch: &ContactPatch,
    ) -> Result<()> {
        store.update_contact(owner, id, patch)
    }

    fn remove<S: RecordStore + ?Sized>(
        store: &mut S,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<()> {
        store.delete_contact(owner, id)
    }
}
