// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::error;

use crate::{
    ListQuery, Notice, Persisted, Reconciliation, Record, RecordStore, Searchable, StatusFilter,
    UserId, apply_reconciliation, search,
};

/// Fetched rows of one record kind plus the query and search box that
/// narrow them. The server narrows by status; search runs over what was
/// fetched.
#[derive(Debug, Clone)]
pub struct ListView<R: Record> {
    items: Vec<R>,
    query: ListQuery<R::Status>,
    search: String,
    loading: bool,
    stale: bool,
}

impl<R: Record> Default for ListView<R> {
    fn default() -> Self {
        Self::new(ListQuery::all())
    }
}

impl<R: Record> ListView<R> {
    pub fn new(query: ListQuery<R::Status>) -> Self {
        Self {
            items: Vec::new(),
            query,
            search: String::new(),
            loading: false,
            stale: true,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn query(&self) -> &ListQuery<R::Status> {
        &self.query
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True until the current query has been fetched once.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|record| record.id() == id)
    }

    /// Changing the status filter invalidates the fetched rows.
    pub fn set_filter(&mut self, filter: StatusFilter<R::Status>) -> bool {
        if self.query.filter == filter {
            return false;
        }
        self.query.filter = filter;
        self.stale = true;
        true
    }

    pub fn cycle_filter(&mut self) -> StatusFilter<R::Status> {
        let next = self.query.filter.cycle();
        self.set_filter(next);
        next
    }

    pub fn set_active_only(&mut self, active_only: bool) -> bool {
        if self.query.active_only == active_only {
            return false;
        }
        self.query.active_only = active_only;
        self.stale = true;
        true
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Replaces the rows on success. On failure the previous rows stay and
    /// an error notice comes back.
    pub fn finish_load(&mut self, result: Result<Vec<R>>) -> Option<Notice>
    where
        R: Persisted,
    {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.stale = false;
                None
            }
            Err(err) => {
                error!("Failed to load {}: {err:#}", R::PLURAL);
                Some(Notice::error(format!("Failed to load your {}", R::PLURAL)))
            }
        }
    }

    /// Without an owner nothing is fetched and nothing changes.
    pub fn load<S>(&mut self, store: &mut S, owner: Option<&UserId>) -> Option<Notice>
    where
        R: Persisted,
        S: RecordStore + ?Sized,
    {
        let owner = owner?;
        self.begin_load();
        let query = self.query;
        self.finish_load(R::list(store, owner, &query))
    }

    /// Applies a local decision. A refetch decision reloads from the store.
    pub fn apply<S>(
        &mut self,
        store: &mut S,
        owner: &UserId,
        decision: Reconciliation<R>,
    ) -> Option<Notice>
    where
        R: Persisted,
        S: RecordStore + ?Sized,
    {
        let refetch = apply_reconciliation(&mut self.items, decision)?;
        self.query = refetch;
        self.load(store, Some(owner))
    }

    pub fn visible(&self) -> Vec<&R>
    where
        R: Searchable,
    {
        search(&self.items, &self.search)
    }
}
