// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ListQuery, Record};

/// How the in-memory list follows a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation<R: Record> {
    Prepend(R),
    Patch { id: R::Id, patch: R::Patch },
    Remove(R::Id),
    Refetch(ListQuery<R::Status>),
}

impl<R: Record> Reconciliation<R> {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Prepend(_) => "prepend",
            Self::Patch { .. } => "patch",
            Self::Remove(_) => "remove",
            Self::Refetch(_) => "refetch",
        }
    }
}

pub fn plan_create<R: Record>(query: &ListQuery<R::Status>, created: R) -> Reconciliation<R> {
    if query.admits(&created) {
        Reconciliation::Prepend(created)
    } else {
        Reconciliation::Refetch(*query)
    }
}

pub fn plan_update<R: Record>(
    query: &ListQuery<R::Status>,
    id: R::Id,
    patch: R::Patch,
) -> Reconciliation<R> {
    if patch_leaves_query::<R>(query, &patch) {
        Reconciliation::Refetch(*query)
    } else {
        Reconciliation::Patch { id, patch }
    }
}

pub fn plan_delete<R: Record>(id: R::Id) -> Reconciliation<R> {
    Reconciliation::Remove(id)
}

/// True when the patch touches a field the list query narrows on. Turning
/// the active flag off always counts, whatever the current scope.
pub fn patch_leaves_query<R: Record>(query: &ListQuery<R::Status>, patch: &R::Patch) -> bool {
    if R::patched_active(patch) == Some(false) {
        return true;
    }
    if let Some(status) = R::patched_status(patch)
        && !query.filter.matches(status)
    {
        return true;
    }
    false
}

/// Applies a local decision. Returns the query to reload when the decision
/// is a refetch; the caller owns the store round trip.
pub fn apply_reconciliation<R: Record>(
    items: &mut Vec<R>,
    decision: Reconciliation<R>,
) -> Option<ListQuery<R::Status>> {
    match decision {
        Reconciliation::Prepend(record) => {
            items.insert(0, record);
            None
        }
        Reconciliation::Patch { id, patch } => {
            if let Some(record) = items.iter_mut().find(|record| *record.id() == id) {
                record.apply_patch(&patch);
            }
            None
        }
        Reconciliation::Remove(id) => {
            items.retain(|record| *record.id() != id);
            None
        }
        Reconciliation::Refetch(query) => Some(query),
    }
}
