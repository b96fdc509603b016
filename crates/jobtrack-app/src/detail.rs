// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{error, warn};

use crate::{
    Application, ApplicationId, ContactId, NetworkContact, Notice, Persisted, RecordStore,
    TabKind, UserId, related_contacts,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDetail {
    pub application: Application,
    pub related: Vec<NetworkContact>,
    /// The related-contacts fetch failed; `related` is empty because of it.
    pub related_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetail {
    pub contact: NetworkContact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome<T> {
    Loaded(T),
    /// The record is gone or unreadable; go back to its list.
    Redirect { tab: TabKind, notice: Notice },
}

impl<T> DetailOutcome<T> {
    pub fn loaded(self) -> Option<T> {
        match self {
            Self::Loaded(detail) => Some(detail),
            Self::Redirect { .. } => None,
        }
    }
}

pub fn load_application_detail<S>(
    store: &mut S,
    owner: &UserId,
    id: &ApplicationId,
) -> DetailOutcome<ApplicationDetail>
where
    S: RecordStore + ?Sized,
{
    let application = match fetch_owned::<Application, S>(store, owner, id) {
        Ok(application) => application,
        Err(notice) => {
            return DetailOutcome::Redirect {
                tab: TabKind::Applications,
                notice,
            };
        }
    };

    let (related, related_failed) = if application.company.trim().is_empty() {
        (Vec::new(), false)
    } else {
        match store.contacts_at_company(owner, &application.company) {
            Ok(contacts) => (
                related_contacts(&application, &contacts)
                    .into_iter()
                    .cloned()
                    .collect(),
                false,
            ),
            Err(err) => {
                warn!(
                    "Failed to load contacts related to {}: {err:#}",
                    application.company
                );
                (Vec::new(), true)
            }
        }
    };

    DetailOutcome::Loaded(ApplicationDetail {
        application,
        related,
        related_failed,
    })
}

pub fn load_contact_detail<S>(
    store: &mut S,
    owner: &UserId,
    id: &ContactId,
) -> DetailOutcome<ContactDetail>
where
    S: RecordStore + ?Sized,
{
    match fetch_owned::<NetworkContact, S>(store, owner, id) {
        Ok(contact) => DetailOutcome::Loaded(ContactDetail { contact }),
        Err(notice) => DetailOutcome::Redirect {
            tab: TabKind::Network,
            notice,
        },
    }
}

/// Exactly one owned row, or the notice to show on the way back to the list.
fn fetch_owned<R, S>(store: &mut S, owner: &UserId, id: &R::Id) -> Result<R, Notice>
where
    R: Persisted,
    S: RecordStore + ?Sized,
{
    match R::fetch(store, owner, id) {
        Ok(Some(row)) => Ok(row),
        Ok(None) => {
            warn!("{} {id} not found for {owner}", R::SINGULAR);
            Err(missing_notice::<R>())
        }
        Err(err) => {
            error!("Failed to load {} {id}: {err:#}", R::SINGULAR);
            Err(missing_notice::<R>())
        }
    }
}

fn missing_notice<R: Persisted>() -> Notice {
    Notice::error(format!("Failed to load {} details", R::SINGULAR))
}
