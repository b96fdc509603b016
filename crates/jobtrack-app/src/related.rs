// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Company cross-reference between applications and contacts.
//!
//! Companies are free text, so the link is a query-time substring match and
//! not a foreign key. A contact can match many applications or none, and
//! renaming a company silently breaks the link.

use crate::{Application, NetworkContact};

/// Case-insensitive "contact company contains application company". An empty
/// application company matches nothing.
pub fn company_matches(application_company: &str, contact_company: &str) -> bool {
    let needle = application_company.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    contact_company.to_lowercase().contains(&needle)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyLink<'a, 'c> {
    pub application: &'a Application,
    pub contacts: Vec<&'c NetworkContact>,
}

/// Joins every application with the contacts the predicate pairs it with.
/// Contacts come back ordered by name.
pub fn join_by_company<'a, 'c, P>(
    applications: &'a [Application],
    contacts: &'c [NetworkContact],
    predicate: P,
) -> Vec<CompanyLink<'a, 'c>>
where
    P: Fn(&Application, &NetworkContact) -> bool,
{
    applications
        .iter()
        .map(|application| {
            let mut matched = contacts
                .iter()
                .filter(|contact| predicate(application, *contact))
                .collect::<Vec<_>>();
            matched.sort_by(|left, right| left.name.cmp(&right.name));
            CompanyLink {
                application,
                contacts: matched,
            }
        })
        .collect()
}

/// Contacts working at `application`'s company, ordered by name.
pub fn related_contacts<'c>(
    application: &Application,
    contacts: &'c [NetworkContact],
) -> Vec<&'c NetworkContact> {
    join_by_company(std::slice::from_ref(application), contacts, same_company)
        .into_iter()
        .next()
        .map(|link| link.contacts)
        .unwrap_or_default()
}

fn same_company(application: &Application, contact: &NetworkContact) -> bool {
    company_matches(&application.company, &contact.company)
}
