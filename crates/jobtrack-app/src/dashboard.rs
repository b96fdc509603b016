// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::error;

use crate::{Application, ListQuery, NetworkContact, RecordStore, UserId};

pub const DASHBOARD_RECENT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub recent_contacts: Vec<NetworkContact>,
    pub recent_applications: Vec<Application>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.recent_contacts.is_empty() && self.recent_applications.is_empty()
    }
}

/// Newest contacts and newest active applications. A failing section is
/// logged and left empty.
pub fn load_dashboard<S>(store: &mut S, owner: &UserId) -> Dashboard
where
    S: RecordStore + ?Sized,
{
    let recent_contacts = store
        .list_contacts(owner, &ListQuery::all().limit(DASHBOARD_RECENT))
        .unwrap_or_else(|err| {
            error!("Failed to load recent contacts: {err:#}");
            Vec::new()
        });
    let recent_applications = store
        .list_applications(
            owner,
            &ListQuery::all().active_only().limit(DASHBOARD_RECENT),
        )
        .unwrap_or_else(|err| {
            error!("Failed to load recent applications: {err:#}");
            Vec::new()
        });
    Dashboard {
        recent_contacts,
        recent_applications,
    }
}
