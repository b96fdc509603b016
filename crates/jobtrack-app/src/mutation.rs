// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Writes a change to the store and then brings the in-memory list in line
//! with it. Store failures never touch the list.

use time::OffsetDateTime;
use tracing::{error, info};

use crate::{
    Application, ApplicationPatch, ListView, Notice, Persisted, Reconciliation, RecordStore,
    UserId, plan_create, plan_delete, plan_update,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// No signed-in owner; the store was not called.
    Skipped,
    Applied {
        notice: Notice,
        refetched: bool,
        /// Error from the follow-up refetch, if one ran and failed.
        follow_up: Option<Notice>,
    },
    Failed(Notice),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// The notice the user should see first.
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Skipped => None,
            Self::Applied {
                follow_up: Some(notice),
                ..
            } => Some(notice),
            Self::Applied { notice, .. } => Some(notice),
            Self::Failed(notice) => Some(notice),
        }
    }
}

pub fn create<R, S>(
    store: &mut S,
    owner: Option<&UserId>,
    view: &mut ListView<R>,
    draft: &R::Draft,
) -> MutationOutcome
where
    R: Persisted,
    S: RecordStore + ?Sized,
{
    create_at(store, owner, view, draft, OffsetDateTime::now_utc())
}

/// `create` with an explicit client-side creation timestamp.
pub fn create_at<R, S>(
    store: &mut S,
    owner: Option<&UserId>,
    view: &mut ListView<R>,
    draft: &R::Draft,
    created_at: OffsetDateTime,
) -> MutationOutcome
where
    R: Persisted,
    S: RecordStore + ?Sized,
{
    let Some(owner) = owner else {
        return MutationOutcome::Skipped;
    };
    match R::insert(store, owner, draft, created_at) {
        Ok(row) => {
            info!("created {} {}", R::SINGULAR, row.id());
            let decision = plan_create(view.query(), row);
            reconcile(
                store,
                owner,
                view,
                decision,
                format!("{} added successfully", R::NOUN),
            )
        }
        Err(err) => {
            error!("Failed to add {}: {err:#}", R::SINGULAR);
            MutationOutcome::Failed(Notice::error(format!("Failed to add {}", R::SINGULAR)))
        }
    }
}

pub fn update<R, S>(
    store: &mut S,
    owner: Option<&UserId>,
    view: &mut ListView<R>,
    id: &R::Id,
    patch: R::Patch,
) -> MutationOutcome
where
    R: Persisted,
    S: RecordStore + ?Sized,
{
    let Some(owner) = owner else {
        return MutationOutcome::Skipped;
    };
    if let Err(err) = R::update(store, owner, id, &patch) {
        error!("Failed to update {} {id}: {err:#}", R::SINGULAR);
        return MutationOutcome::Failed(Notice::error(format!(
            "Failed to update {}",
            R::SINGULAR
        )));
    }
    let decision = plan_update(view.query(), id.clone(), patch);
    reconcile(
        store,
        owner,
        view,
        decision,
        format!("{} updated successfully", R::NOUN),
    )
}

pub fn delete<R, S>(
    store: &mut S,
    owner: Option<&UserId>,
    view: &mut ListView<R>,
    id: &R::Id,
) -> MutationOutcome
where
    R: Persisted,
    S: RecordStore + ?Sized,
{
    let Some(owner) = owner else {
        return MutationOutcome::Skipped;
    };
    if let Err(err) = R::remove(store, owner, id) {
        error!("Failed to delete {} {id}: {err:#}", R::SINGULAR);
        return MutationOutcome::Failed(Notice::error(format!(
            "Failed to delete {}",
            R::SINGULAR
        )));
    }
    reconcile(
        store,
        owner,
        view,
        plan_delete(id.clone()),
        format!("{} deleted successfully", R::NOUN),
    )
}

/// Flips the active flag through the regular update path.
pub fn toggle_active<S>(
    store: &mut S,
    owner: Option<&UserId>,
    view: &mut ListView<Application>,
    application: &Application,
) -> MutationOutcome
where
    S: RecordStore + ?Sized,
{
    update(
        store,
        owner,
        view,
        &application.id,
        ApplicationPatch::set_active(!application.active_apps),
    )
}

fn reconcile<R, S>(
    store: &mut S,
    owner: &UserId,
    view: &mut ListView<R>,
    decision: Reconciliation<R>,
    message: String,
) -> MutationOutcome
where
    R: Persisted,
    S: RecordStore + ?Sized,
{
    let refetched = matches!(decision, Reconciliation::Refetch(_));
    let follow_up = view.apply(store, owner, decision);
    MutationOutcome::Applied {
        notice: Notice::success(message),
        refetched,
        follow_up,
    }
}
