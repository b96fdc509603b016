// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::{Date, OffsetDateTime};

use crate::ids::*;

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// Status enumerations shared by both record kinds. The wire value is the
/// human label the backend stores verbatim.
pub trait RecordStatus: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Connected,
    #[serde(rename = "Need Referral")]
    NeedReferral,
    Applied,
    Interview,
    Offer,
    Rejected,
    #[serde(rename = "No Response")]
    NoResponse,
}

impl RecordStatus for ApplicationStatus {
    const ALL: &'static [Self] = &[
        Self::Connected,
        Self::NeedReferral,
        Self::Applied,
        Self::Interview,
        Self::Offer,
        Self::Rejected,
        Self::NoResponse,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::NeedReferral => "Need Referral",
            Self::Applied => "Applied",
            Self::Interview => "Interview",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
            Self::NoResponse => "No Response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactStatus {
    Active,
    Inactive,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl RecordStatus for ContactStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Inactive, Self::FollowUp];

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::FollowUp => "Follow-up",
        }
    }
}

/// Server-side status narrowing for a list. `All` is the "all" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<S> {
    All,
    Only(S),
}

impl<S: RecordStatus> StatusFilter<S> {
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        S::parse(trimmed).map(Self::Only)
    }

    pub fn matches(self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    pub fn status(self) -> Option<S> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }

    /// Steps through `all` and then every status in declaration order.
    pub fn cycle(self) -> Self {
        match self {
            Self::All => S::ALL.first().copied().map_or(Self::All, Self::Only),
            Self::Only(current) => {
                let position = S::ALL.iter().position(|status| *status == current);
                match position.and_then(|index| S::ALL.get(index + 1)) {
                    Some(next) => Self::Only(*next),
                    None => Self::All,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<S> {
    pub filter: StatusFilter<S>,
    pub active_only: bool,
    pub limit: Option<usize>,
}

impl<S: RecordStatus> ListQuery<S> {
    pub fn all() -> Self {
        Self {
            filter: StatusFilter::All,
            active_only: false,
            limit: None,
        }
    }

    pub fn with_filter(filter: StatusFilter<S>) -> Self {
        Self {
            filter,
            ..Self::all()
        }
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn admits<R: Record<Status = S>>(&self, record: &R) -> bool {
        self.filter.matches(record.status()) && (!self.active_only || record.is_active())
    }
}

impl<S: RecordStatus> Default for ListQuery<S> {
    fn default() -> Self {
        Self::all()
    }
}

/// Common surface of the two owner-scoped record kinds.
pub trait Record: Clone + fmt::Debug {
    type Id: Clone + Eq + fmt::Debug + fmt::Display;
    type Status: RecordStatus;
    type Patch: Clone + fmt::Debug;

    /// Capitalized noun used in user-facing notices.
    const NOUN: &'static str;

    fn id(&self) -> &Self::Id;
    fn owner(&self) -> &UserId;
    fn status(&self) -> Self::Status;
    fn created_at(&self) -> OffsetDateTime;

    fn is_active(&self) -> bool {
        true
    }

    fn apply_patch(&mut self, patch: &Self::Patch);

    fn patched_status(patch: &Self::Patch) -> Option<Self::Status>;

    fn patched_active(_patch: &Self::Patch) -> Option<bool> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub company: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub link: String,
    #[serde(default)]
    pub active_apps: bool,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "nullable_text")]
    pub username: String,
    // Stored exactly as entered; only the UI masks it.
    #[serde(default, deserialize_with = "nullable_text")]
    pub password: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record for Application {
    type Id = ApplicationId;
    type Status = ApplicationStatus;
    type Patch = ApplicationPatch;

    const NOUN: &'static str = "Application";

    fn id(&self) -> &ApplicationId {
        &self.id
    }

    fn owner(&self) -> &UserId {
        &self.user_id
    }

    fn status(&self) -> ApplicationStatus {
        self.status
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.active_apps
    }

    fn apply_patch(&mut self, patch: &ApplicationPatch) {
        patch.apply(self);
    }

    fn patched_status(patch: &ApplicationPatch) -> Option<ApplicationStatus> {
        patch.status
    }

    fn patched_active(patch: &ApplicationPatch) -> Option<bool> {
        patch.active_apps
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContact {
    pub id: ContactId,
    pub user_id: UserId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub name: String,
    pub status: ContactStatus,
    #[serde(default, deserialize_with = "nullable_text")]
    pub company: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub role: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub linkedin_profile: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub location: String,
    #[serde(with = "calendar_date")]
    pub date_of_first_contact: Date,
    #[serde(default, with = "calendar_date::option")]
    pub second_contact: Option<Date>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub notes: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub action_items: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record for NetworkContact {
    type Id = ContactId;
    type Status = ContactStatus;
    type Patch = ContactPatch;

    const NOUN: &'static str = "Contact";

    fn id(&self) -> &ContactId {
        &self.id
    }

    fn owner(&self) -> &UserId {
        &self.user_id
    }

    fn status(&self) -> ContactStatus {
        self.status
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn apply_patch(&mut self, patch: &ContactPatch) {
        patch.apply(self);
    }

    fn patched_status(patch: &ContactPatch) -> Option<ContactStatus> {
        patch.status
    }
}

/// Client-supplied columns of a new application row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewApplication {
    pub company: String,
    pub link: String,
    pub active_apps: bool,
    pub status: ApplicationStatus,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNetworkContact {
    pub name: String,
    pub status: ContactStatus,
    pub company: String,
    pub role: String,
    pub linkedin_profile: String,
    pub location: String,
    #[serde(serialize_with = "calendar_date::serialize")]
    pub date_of_first_contact: Date,
    #[serde(serialize_with = "calendar_date::option::serialize")]
    pub second_contact: Option<Date>,
    pub notes: String,
    pub action_items: String,
}

impl NewApplication {
    pub fn into_record(
        self,
        id: ApplicationId,
        owner: &UserId,
        created_at: OffsetDateTime,
    ) -> Application {
        Application {
            id,
            user_id: owner.clone(),
            company: self.company,
            link: self.link,
            active_apps: self.active_apps,
            status: self.status,
            username: self.username,
            password: self.password,
            created_at,
        }
    }
}

impl NewNetworkContact {
    pub fn into_record(
        self,
        id: ContactId,
        owner: &UserId,
        created_at: OffsetDateTime,
    ) -> NetworkContact {
        NetworkContact {
            id,
            user_id: owner.clone(),
            name: self.name,
            status: self.status,
            company: self.company,
            role: self.role,
            linkedin_profile: self.linkedin_profile,
            location: self.location,
            date_of_first_contact: self.date_of_first_contact,
            second_contact: self.second_contact,
            notes: self.notes,
            action_items: self.action_items,
            created_at,
        }
    }
}

/// Named-field update. `None` leaves the column untouched both remotely and
/// in memory. There is no `created_at` member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_apps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ApplicationPatch {
    pub fn set_active(active: bool) -> Self {
        Self {
            active_apps: Some(active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, application: &mut Application) {
        if let Some(company) = &self.company {
            application.company.clone_from(company);
        }
        if let Some(link) = &self.link {
            application.link.clone_from(link);
        }
        if let Some(active) = self.active_apps {
            application.active_apps = active;
        }
        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(username) = &self.username {
            application.username.clone_from(username);
        }
        if let Some(password) = &self.password {
            application.password.clone_from(password);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_named_date"
    )]
    pub date_of_first_contact: Option<Date>,
    /// `Some(None)` clears the follow-up date.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_clearable_date"
    )]
    pub second_contact: Option<Option<Date>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_items: Option<String>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, contact: &mut NetworkContact) {
        if let Some(name) = &self.name {
            contact.name.clone_from(name);
        }
        if let Some(status) = self.status {
            contact.status = status;
        }
        if let Some(company) = &self.company {
            contact.company.clone_from(company);
        }
        if let Some(role) = &self.role {
            contact.role.clone_from(role);
        }
        if let Some(profile) = &self.linkedin_profile {
            contact.linkedin_profile.clone_from(profile);
        }
        if let Some(location) = &self.location {
            contact.location.clone_from(location);
        }
        if let Some(date) = self.date_of_first_contact {
            contact.date_of_first_contact = date;
        }
        if let Some(second) = self.second_contact {
            contact.second_contact = second;
        }
        if let Some(notes) = &self.notes {
            contact.notes.clone_from(notes);
        }
        if let Some(items) = &self.action_items {
            contact.action_items.clone_from(items);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Applications,
    Network,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Dashboard, Self::Applications, Self::Network];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Applications => "applications",
            Self::Network => "network",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    SignIn,
    SignUp,
    Application,
    Contact,
}

impl FormKind {
    pub const fn requires_session(self) -> bool {
        matches!(self, Self::Application | Self::Contact)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Form(FormKind),
}

fn nullable_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn serialize_named_date<S>(
    value: &Option<Date>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    calendar_date::option::serialize(value, serializer)
}

fn serialize_clearable_date<S>(
    value: &Option<Option<Date>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    calendar_date::option::serialize(&value.flatten(), serializer)
}

#[cfg(test)]
mod tests {
    use super::{
        Application, ApplicationPatch, ApplicationStatus, ContactPatch, ContactStatus,
        NetworkContact, RecordStatus, StatusFilter,
    };
    use anyhow::Result;
    use time::{Date, Month};

    #[test]
    fn status_labels_round_trip_through_parse() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(ContactStatus::parse("Follow-up"), Some(ContactStatus::FollowUp));
        assert_eq!(ContactStatus::parse("follow-up"), None);
    }

    #[test]
    fn status_filter_treats_empty_and_all_as_sentinel() {
        assert_eq!(
            StatusFilter::<ApplicationStatus>::parse(""),
            Some(StatusFilter::All)
        );
        assert_eq!(
            StatusFilter::<ApplicationStatus>::parse("ALL"),
            Some(StatusFilter::All)
        );
        assert_eq!(
            StatusFilter::parse("Need Referral"),
            Some(StatusFilter::Only(ApplicationStatus::NeedReferral))
        );
        assert_eq!(StatusFilter::<ContactStatus>::parse("Pending"), None);
    }

    #[test]
    fn status_filter_cycle_visits_every_status_then_wraps() {
        let mut filter = StatusFilter::<ContactStatus>::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter = filter.cycle();
            seen.push(filter);
        }
        assert_eq!(
            seen,
            vec![
                StatusFilter::Only(ContactStatus::Active),
                StatusFilter::Only(ContactStatus::Inactive),
                StatusFilter::Only(ContactStatus::FollowUp),
                StatusFilter::All,
            ]
        );
    }

    #[test]
    fn application_decodes_backend_row_with_null_text() -> Result<()> {
        let row = r#"{
            "id": "a1",
            "user_id": "u1",
            "company": "Acme",
            "link": null,
            "active_apps": true,
            "status": "No Response",
            "username": "jane",
            "password": null,
            "created_at": "2024-03-01T10:15:00.123456+00:00"
        }"#;
        let application: Application = serde_json::from_str(row)?;
        assert_eq!(application.status, ApplicationStatus::NoResponse);
        assert_eq!(application.link, "");
        assert_eq!(application.password, "");
        assert_eq!(application.created_at.year(), 2024);
        Ok(())
    }

    #[test]
    fn contact_decodes_nullable_second_contact() -> Result<()> {
        let row = r#"{
            "id": "c1",
            "user_id": "u1",
            "name": "Jane",
            "status": "Follow-up",
            "company": "ACME Corp",
            "role": "Engineer",
            "linkedin_profile": "",
            "location": "Remote",
            "date_of_first_contact": "2024-01-01",
            "second_contact": null,
            "notes": "",
            "action_items": "",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let contact: NetworkContact = serde_json::from_str(row)?;
        assert_eq!(contact.status, ContactStatus::FollowUp);
        assert_eq!(contact.second_contact, None);
        assert_eq!(
            contact.date_of_first_contact,
            Date::from_calendar_date(2024, Month::January, 1)?
        );
        Ok(())
    }

    #[test]
    fn application_patch_serializes_only_named_fields() -> Result<()> {
        let patch = ApplicationPatch::set_active(false);
        assert_eq!(serde_json::to_string(&patch)?, r#"{"active_apps":false}"#);
        Ok(())
    }

    #[test]
    fn contact_patch_can_clear_second_contact() -> Result<()> {
        let patch = ContactPatch {
            second_contact: Some(None),
            ..ContactPatch::default()
        };
        assert_eq!(serde_json::to_string(&patch)?, r#"{"second_contact":null}"#);

        let dated = ContactPatch {
            second_contact: Some(Some(Date::from_calendar_date(2024, Month::January, 8)?)),
            ..ContactPatch::default()
        };
        assert_eq!(
            serde_json::to_string(&dated)?,
            r#"{"second_contact":"2024-01-08"}"#
        );
        Ok(())
    }
}
