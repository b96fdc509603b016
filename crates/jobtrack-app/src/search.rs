// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Application, NetworkContact};

/// Text fields a record exposes to the list search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    fn search_text(&self) -> String {
        self.search_fields().join(" ").to_lowercase()
    }
}

impl Searchable for Application {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.company, &self.link, &self.username]
    }
}

impl Searchable for NetworkContact {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.name,
            &self.company,
            &self.role,
            &self.location,
            &self.notes,
            &self.action_items,
        ]
    }
}

pub fn matches_search<T: Searchable + ?Sized>(record: &T, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    record.search_text().contains(&query.to_lowercase())
}

pub fn search<'a, T: Searchable>(records: &'a [T], query: &str) -> Vec<&'a T> {
    records
        .iter()
        .filter(|record| matches_search(*record, query))
        .collect()
}
