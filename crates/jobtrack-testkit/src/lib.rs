// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use jobtrack_app::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, ContactId, ContactPatch,
    ContactStatus, ListQuery, NetworkContact, NewApplication, NewNetworkContact, Record,
    RecordStatus, RecordStore, SessionUser, UserId, company_matches, suggested_second_contact,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use time::macros::datetime;
use time::{Date, Duration, OffsetDateTime};

const COMPANIES: [&str; 14] = [
    "Acme",
    "Globex",
    "Initech",
    "Umbrella Analytics",
    "Hooli",
    "Stark Industries",
    "Wayne Data",
    "Cyberdyne",
    "Soylent Labs",
    "Tyrell Systems",
    "Vandelay Imports",
    "Wonka Logistics",
    "Pied Piper",
    "Massive Dynamic",
];
const COMPANY_SUFFIXES: [&str; 5] = ["", " Corp", " Inc", " Labs", " Group"];

const ROLES: [&str; 12] = [
    "Data Engineer",
    "Analytics Engineer",
    "Software Engineer",
    "Engineering Manager",
    "Recruiter",
    "Technical Recruiter",
    "Data Scientist",
    "BI Developer",
    "Product Manager",
    "Staff Engineer",
    "Hiring Manager",
    "",
];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const LOCATIONS: [&str; 10] = [
    "Remote",
    "Austin, TX",
    "Seattle, WA",
    "Denver, CO",
    "Raleigh, NC",
    "Pittsburgh, PA",
    "Portland, OR",
    "Chicago, IL",
    "New York, NY",
    "Boston, MA",
];

const NOTES: [&str; 8] = [
    "met at a data meetup",
    "referred by a former teammate",
    "replied to cold message",
    "alumni network",
    "spoke on a conference panel",
    "shared a posting on LinkedIn",
    "coffee chat scheduled",
    "",
];

const ACTION_ITEMS: [&str; 6] = [
    "send thank-you note",
    "ask about referral",
    "share portfolio link",
    "follow up after interview",
    "check in next month",
    "",
];

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_APPLICATIONS: usize = 12;
pub const DEMO_CONTACTS: usize = 16;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Seeded generator for plausible job-search rows.
#[derive(Debug, Clone)]
pub struct JobFaker {
    rng: DeterministicRng,
}

impl JobFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn company(&mut self) -> String {
        self.pick(&COMPANIES).to_owned()
    }

    pub fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn application(&mut self) -> NewApplication {
        let company = self.company();
        let slug = company.to_lowercase().replace(' ', "");
        let username = if self.rng.chance(60) {
            format!("{}.jobs", self.pick(&FIRST_NAMES).to_lowercase())
        } else {
            String::new()
        };
        NewApplication {
            link: format!("https://careers.{slug}.com/jobs/{}", 1000 + self.rng.int_n(9000)),
            company,
            active_apps: self.rng.chance(70),
            status: self.pick_status::<ApplicationStatus>(),
            username,
            password: String::new(),
        }
    }

    /// Contacts carry a company variant ("Acme Corp") so they cross-reference
    /// applications at the base name.
    pub fn contact(&mut self, first_contact: Date) -> NewNetworkContact {
        let company = format!("{}{}", self.company(), self.pick(&COMPANY_SUFFIXES));
        let second_contact = if self.rng.chance(80) {
            suggested_second_contact(first_contact)
        } else {
            None
        };
        NewNetworkContact {
            name: self.person_name(),
            status: self.pick_status::<ContactStatus>(),
            company,
            role: self.pick(&ROLES).to_owned(),
            linkedin_profile: String::new(),
            location: self.pick(&LOCATIONS).to_owned(),
            date_of_first_contact: first_contact,
            second_contact,
            notes: self.pick(&NOTES).to_owned(),
            action_items: self.pick(&ACTION_ITEMS).to_owned(),
        }
    }

    pub fn days_before(&mut self, anchor: OffsetDateTime, max_days: i64) -> OffsetDateTime {
        let days = self.rng.int_n(max_days.max(1) as usize) as i64;
        let minutes = self.rng.int_n(24 * 60) as i64;
        anchor - Duration::days(days) - Duration::minutes(minutes)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_status<S: RecordStatus>(&mut self) -> S {
        S::ALL[self.rng.int_n(S::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreOp {
    List,
    Get,
    Insert,
    Update,
    Delete,
    Related,
}

/// In-memory `RecordStore` with the same owner scoping as the hosted
/// backend. Operations can be set to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    applications: Vec<Application>,
    contacts: Vec<NetworkContact>,
    next_id: u64,
    failing: BTreeSet<StoreOp>,
    calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo rows for `owner`, stamped in the weeks before `now`.
    pub fn seeded_demo(owner: &UserId, seed: u64, now: OffsetDateTime) -> Result<Self> {
        let mut store = Self::new();
        let mut faker = JobFaker::new(seed);
        for _ in 0..DEMO_APPLICATIONS {
            let created_at = faker.days_before(now, 60);
            let draft = faker.application();
            store
                .insert_application(owner, &draft, created_at)
                .context("seed demo application")?;
        }
        for _ in 0..DEMO_CONTACTS {
            let created_at = faker.days_before(now, 60);
            let draft = faker.contact(created_at.date());
            store
                .insert_contact(owner, &draft, created_at)
                .context("seed demo contact")?;
        }
        Ok(store)
    }

    pub fn fail(&mut self, op: StoreOp) {
        self.failing.insert(op);
    }

    pub fn recover(&mut self, op: StoreOp) {
        self.failing.remove(&op);
    }

    /// Number of store calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn contacts(&self) -> &[NetworkContact] {
        &self.contacts
    }

    /// Stores a row as-is, bypassing owner stamping.
    pub fn put_application(&mut self, application: Application) {
        self.applications.push(application);
    }

    pub fn put_contact(&mut self, contact: NetworkContact) {
        self.contacts.push(contact);
    }

    fn check(&mut self, op: StoreOp) -> Result<()> {
        self.calls += 1;
        if self.failing.contains(&op) {
            bail!("injected {op:?} failure");
        }
        Ok(())
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

fn owned_page<R: Record>(
    rows: &[R],
    owner: &UserId,
    query: &ListQuery<R::Status>,
) -> Vec<R> {
    let mut page = rows
        .iter()
        .filter(|row| row.owner() == owner && query.admits(*row))
        .cloned()
        .collect::<Vec<_>>();
    page.sort_by_key(|row| std::cmp::Reverse(row.created_at()));
    if let Some(limit) = query.limit {
        page.truncate(limit);
    }
    page
}

impl RecordStore for MemoryStore {
    fn list_applications(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        self.check(StoreOp::List)?;
        Ok(owned_page(&self.applications, owner, query))
    }

    fn get_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<Application>> {
        self.check(StoreOp::Get)?;
        Ok(self
            .applications
            .iter()
            .find(|row| row.id == *id && row.user_id == *owner)
            .cloned())
    }

    fn insert_application(
        &mut self,
        owner: &UserId,
        draft: &NewApplication,
        created_at: OffsetDateTime,
    ) -> Result<Application> {
        self.check(StoreOp::Insert)?;
        let id = ApplicationId::new(self.next_id("app"));
        let row = draft.clone().into_record(id, owner, created_at);
        self.applications.push(row.clone());
        Ok(row)
    }

    fn update_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> Result<()> {
        self.check(StoreOp::Update)?;
        if let Some(row) = self
            .applications
            .iter_mut()
            .find(|row| row.id == *id && row.user_id == *owner)
        {
            patch.apply(row);
        }
        Ok(())
    }

    fn delete_application(&mut self, owner: &UserId, id: &ApplicationId) -> Result<()> {
        self.check(StoreOp::Delete)?;
        self.applications
            .retain(|row| !(row.id == *id && row.user_id == *owner));
        Ok(())
    }

    fn list_contacts(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ContactStatus>,
    ) -> Result<Vec<NetworkContact>> {
        self.check(StoreOp::List)?;
        Ok(owned_page(&self.contacts, owner, query))
    }

    fn get_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<Option<NetworkContact>> {
        self.check(StoreOp::Get)?;
        Ok(self
            .contacts
            .iter()
            .find(|row| row.id == *id && row.user_id == *owner)
            .cloned())
    }

    fn insert_contact(
        &mut self,
        owner: &UserId,
        draft: &NewNetworkContact,
        created_at: OffsetDateTime,
    ) -> Result<NetworkContact> {
        self.check(StoreOp::Insert)?;
        let id = ContactId::new(self.next_id("contact"));
        let row = draft.clone().into_record(id, owner, created_at);
        self.contacts.push(row.clone());
        Ok(row)
    }

    fn update_contact(
        &mut self,
        owner: &UserId,
        id: &ContactId,
        patch: &ContactPatch,
    ) -> Result<()> {
        self.check(StoreOp::Update)?;
        if let Some(row) = self
            .contacts
            .iter_mut()
            .find(|row| row.id == *id && row.user_id == *owner)
        {
            patch.apply(row);
        }
        Ok(())
    }

    fn delete_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<()> {
        self.check(StoreOp::Delete)?;
        self.contacts
            .retain(|row| !(row.id == *id && row.user_id == *owner));
        Ok(())
    }

    fn contacts_at_company(
        &mut self,
        owner: &UserId,
        company: &str,
    ) -> Result<Vec<NetworkContact>> {
        self.check(StoreOp::Related)?;
        let mut matched = self
            .contacts
            .iter()
            .filter(|row| row.user_id == *owner && company_matches(company, &row.company))
            .cloned()
            .collect::<Vec<_>>();
        matched.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(matched)
    }
}

pub fn demo_user() -> SessionUser {
    SessionUser {
        id: UserId::new(DEMO_USER_ID),
        email: "demo@jobtrack.local".to_owned(),
    }
}

pub fn temp_session_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("session.json");
    Ok((dir, path))
}

pub fn fixture_datetime() -> OffsetDateTime {
    datetime!(2026-02-19 12:34:56 UTC)
}
