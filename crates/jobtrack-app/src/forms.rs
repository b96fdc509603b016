// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::{Date, Duration};

use crate::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, ContactId, ContactPatch,
    ContactStatus, FormKind, NetworkContact, NewApplication, NewNetworkContact,
};

pub const FOLLOW_UP_DAYS: i64 = 7;

/// Suggested follow-up date for a contact first reached on `first_contact`.
pub fn suggested_second_contact(first_contact: Date) -> Option<Date> {
    first_contact.checked_add(Duration::days(FOLLOW_UP_DAYS))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFormInput {
    pub company: String,
    pub link: String,
    pub active_apps: bool,
    pub status: ApplicationStatus,
    pub username: String,
    pub password: String,
}

impl Default for ApplicationFormInput {
    fn default() -> Self {
        Self {
            company: String::new(),
            link: String::new(),
            active_apps: true,
            status: ApplicationStatus::Applied,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl From<&Application> for ApplicationFormInput {
    fn from(application: &Application) -> Self {
        Self {
            company: application.company.clone(),
            link: application.link.clone(),
            active_apps: application.active_apps,
            status: application.status,
            username: application.username.clone(),
            password: application.password.clone(),
        }
    }
}

impl ApplicationFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            bail!("company is required -- enter a company name and retry");
        }
        Ok(())
    }

    pub fn to_draft(&self) -> NewApplication {
        NewApplication {
            company: self.company.trim().to_owned(),
            link: self.link.trim().to_owned(),
            active_apps: self.active_apps,
            status: self.status,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Edits name every form field.
    pub fn to_patch(&self) -> ApplicationPatch {
        let draft = self.to_draft();
        ApplicationPatch {
            company: Some(draft.company),
            link: Some(draft.link),
            active_apps: Some(draft.active_apps),
            status: Some(draft.status),
            username: Some(draft.username),
            password: Some(draft.password),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormInput {
    pub name: String,
    pub status: ContactStatus,
    pub company: String,
    pub role: String,
    pub linkedin_profile: String,
    pub location: String,
    pub date_of_first_contact: Date,
    pub second_contact: Option<Date>,
    pub notes: String,
    pub action_items: String,
}

impl ContactFormInput {
    /// Blank contact first reached on `first_contact`, with the follow-up
    /// date prefilled a week later. Clearing it stores no follow-up.
    pub fn new(first_contact: Date) -> Self {
        Self {
            name: String::new(),
            status: ContactStatus::Active,
            company: String::new(),
            role: String::new(),
            linkedin_profile: String::new(),
            location: String::new(),
            date_of_first_contact: first_contact,
            second_contact: suggested_second_contact(first_contact),
            notes: String::new(),
            action_items: String::new(),
        }
    }

    pub fn suggested_second_contact(&self) -> Option<Date> {
        suggested_second_contact(self.date_of_first_contact)
    }

    /// Moves the first contact date. A follow-up still sitting on the old
    /// suggestion moves with it; a chosen or cleared one is kept.
    pub fn set_first_contact(&mut self, first_contact: Date) {
        if self.second_contact.is_some() && self.second_contact == self.suggested_second_contact()
        {
            self.second_contact = suggested_second_contact(first_contact);
        }
        self.date_of_first_contact = first_contact;
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("contact name is required -- enter a name and retry");
        }
        Ok(())
    }

    pub fn to_draft(&self) -> NewNetworkContact {
        NewNetworkContact {
            name: self.name.trim().to_owned(),
            status: self.status,
            company: self.company.trim().to_owned(),
            role: self.role.trim().to_owned(),
            linkedin_profile: self.linkedin_profile.trim().to_owned(),
            location: self.location.trim().to_owned(),
            date_of_first_contact: self.date_of_first_contact,
            second_contact: self.second_contact,
            notes: self.notes.clone(),
            action_items: self.action_items.clone(),
        }
    }

    /// An empty follow-up date clears the stored one.
    pub fn to_patch(&self) -> ContactPatch {
        ContactPatch {
            name: Some(self.name.trim().to_owned()),
            status: Some(self.status),
            company: Some(self.company.trim().to_owned()),
            role: Some(self.role.trim().to_owned()),
            linkedin_profile: Some(self.linkedin_profile.trim().to_owned()),
            location: Some(self.location.trim().to_owned()),
            date_of_first_contact: Some(self.date_of_first_contact),
            second_contact: Some(self.second_contact),
            notes: Some(self.notes.clone()),
            action_items: Some(self.action_items.clone()),
        }
    }
}

impl From<&NetworkContact> for ContactFormInput {
    fn from(contact: &NetworkContact) -> Self {
        Self {
            name: contact.name.clone(),
            status: contact.status,
            company: contact.company.clone(),
            role: contact.role.clone(),
            linkedin_profile: contact.linkedin_profile.clone(),
            location: contact.location.clone(),
            date_of_first_contact: contact.date_of_first_contact,
            second_contact: contact.second_contact,
            notes: contact.notes.clone(),
            action_items: contact.action_items.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl SignInInput {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            bail!("password is required -- enter your password and retry");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpInput {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            bail!("password is required -- choose a password and retry");
        }
        if self.password != self.confirm_password {
            bail!("Passwords do not match");
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        bail!("email is required -- enter your email and retry");
    }
    if !trimmed.contains('@') {
        bail!("email {trimmed:?} is missing an @");
    }
    Ok(())
}

/// Staged form contents. `id` is `None` when the form creates a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    SignIn(SignInInput),
    SignUp(SignUpInput),
    Application {
        id: Option<ApplicationId>,
        input: ApplicationFormInput,
    },
    Contact {
        id: Option<ContactId>,
        input: ContactFormInput,
    },
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::SignIn(_) => FormKind::SignIn,
            Self::SignUp(_) => FormKind::SignUp,
            Self::Application { .. } => FormKind::Application,
            Self::Contact { .. } => FormKind::Contact,
        }
    }

    pub fn blank_for(kind: FormKind, today: Date) -> Self {
        match kind {
            FormKind::SignIn => Self::SignIn(SignInInput::default()),
            FormKind::SignUp => Self::SignUp(SignUpInput::default()),
            FormKind::Application => Self::Application {
                id: None,
                input: ApplicationFormInput::default(),
            },
            FormKind::Contact => Self::Contact {
                id: None,
                input: ContactFormInput::new(today),
            },
        }
    }

    pub fn edit_application(application: &Application) -> Self {
        Self::Application {
            id: Some(application.id.clone()),
            input: application.into(),
        }
    }

    pub fn edit_contact(contact: &NetworkContact) -> Self {
        Self::Contact {
            id: Some(contact.id.clone()),
            input: contact.into(),
        }
    }

    pub fn is_edit(&self) -> bool {
        match self {
            Self::Application { id, .. } => id.is_some(),
            Self::Contact { id, .. } => id.is_some(),
            Self::SignIn(_) | Self::SignUp(_) => false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::SignIn(input) => input.validate(),
            Self::SignUp(input) => input.validate(),
            Self::Application { input, .. } => input.validate(),
            Self::Contact { input, .. } => input.validate(),
        }
    }
}
