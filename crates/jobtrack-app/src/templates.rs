// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Canned outreach messages.
//!
//! Substitution is literal: no article or whitespace repair is done on the
//! interpolated role, so "a Engineer" and doubled spaces are expected output.

use crate::NetworkContact;

pub const DEFAULT_SENDER_NAME: &str = "[Your Name]";
pub const DEFAULT_SENDER_BACKGROUND: &str = "I bring strong skills in data analytics, data engineering, business intelligence, and software development.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageInput {
    pub name: String,
    pub company: String,
    pub role: String,
}

impl MessageInput {
    pub fn new(name: &str, company: &str, role: &str) -> Self {
        Self {
            name: name.to_owned(),
            company: company.to_owned(),
            role: role.to_owned(),
        }
    }
}

impl From<&NetworkContact> for MessageInput {
    fn from(contact: &NetworkContact) -> Self {
        Self::new(&contact.name, &contact.company, &contact.role)
    }
}

/// Signature and background sentence used by the templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderProfile {
    pub name: String,
    pub background: String,
}

impl Default for SenderProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_SENDER_NAME.to_owned(),
            background: DEFAULT_SENDER_BACKGROUND.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Connect,
    FollowUp,
    RecruiterEmail,
}

impl MessageKind {
    pub const ALL: [Self; 3] = [Self::Connect, Self::FollowUp, Self::RecruiterEmail];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Connect => "LinkedIn connect",
            Self::FollowUp => "follow-up",
            Self::RecruiterEmail => "recruiter email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSet {
    pub connect: String,
    pub follow_up: String,
    pub recruiter_email: String,
}

impl MessageSet {
    pub fn get(&self, kind: MessageKind) -> &str {
        match kind {
            MessageKind::Connect => &self.connect,
            MessageKind::FollowUp => &self.follow_up,
            MessageKind::RecruiterEmail => &self.recruiter_email,
        }
    }
}

pub fn generate(input: &MessageInput) -> MessageSet {
    generate_with(input, &SenderProfile::default())
}

pub fn generate_with(input: &MessageInput, sender: &SenderProfile) -> MessageSet {
    MessageSet {
        connect: connect_message(input, sender),
        follow_up: follow_up_message(input, sender),
        recruiter_email: recruiter_email(input, sender),
    }
}

pub fn connect_message(input: &MessageInput, sender: &SenderProfile) -> String {
    let MessageInput {
        name,
        company,
        role,
    } = input;
    let described = if role.is_empty() {
        "someone who works".to_owned()
    } else {
        format!("a {role}")
    };
    format!(
        "Hi {name},\n\n\
         I noticed your profile as {described} at {company}. I'm interested in learning more about your experience there and would love to connect professionally.\n\n\
         Best regards,\n{}",
        sender.name
    )
}

pub fn follow_up_message(input: &MessageInput, sender: &SenderProfile) -> String {
    let MessageInput {
        name,
        company,
        role,
    } = input;
    let described = if role.is_empty() {
        String::new()
    } else {
        format!("as a {role}")
    };
    format!(
        "Hi {name},\n\n\
         Thank you for connecting with me! I really appreciate it.\n\n\
         I'm particularly interested in your experience {described} at {company}. Would you be open to a brief chat about your career path and insights into the industry?\n\n\
         Looking forward to hearing from you!\n\n\
         Best regards,\n{}",
        sender.name
    )
}

pub fn recruiter_email(input: &MessageInput, sender: &SenderProfile) -> String {
    let MessageInput {
        name,
        company,
        role,
    } = input;
    let subject_role = if role.is_empty() { "Position" } else { role.as_str() };
    let position = if role.is_empty() {
        "a position".to_owned()
    } else {
        format!("the {role} position")
    };
    let sender_name = &sender.name;
    let background = &sender.background;
    format!(
        "Subject: Recently Applied for {subject_role} at {company}\n\n\
         Dear {name},\n\n\
         I hope this email finds you well. My name is {sender_name}, and I'm reaching out regarding my recent application for {position} at {company}.\n\n\
         {background} I believe my interdisciplinary background would be a great fit for {company} and the role I've applied for.\n\n\
         I'm particularly excited about this opportunity and would appreciate the chance to discuss how my skills and experience align with what you're looking for. Would it be possible to schedule a brief conversation?\n\n\
         Thank you for your time and consideration. \n\n\
         Best regards,\n{sender_name}"
    )
}

#[cfg(test)]
mod tests {
    use super::{MessageInput, MessageKind, SenderProfile, generate, generate_with};

    fn jane() -> MessageInput {
        MessageInput::new("Jane", "Acme", "Engineer")
    }

    #[test]
    fn connect_template_keeps_literal_article() {
        let messages = generate(&jane());
        assert!(
            messages
                .connect
                .contains("I noticed your profile as a Engineer at Acme.")
        );
        assert!(messages.connect.starts_with("Hi Jane,\n\n"));
    }

    #[test]
    fn connect_template_without_role_says_someone_who_works() {
        let messages = generate(&MessageInput::new("Jane", "Acme", ""));
        assert!(
            messages
                .connect
                .contains("as someone who works at Acme.")
        );
    }

    #[test]
    fn follow_up_without_role_keeps_double_space() {
        let with_role = generate(&jane());
        assert!(
            with_role
                .follow_up
                .contains("your experience as a Engineer at Acme.")
        );

        let without_role = generate(&MessageInput::new("Jane", "Acme", ""));
        assert!(without_role.follow_up.contains("your experience  at Acme."));
    }

    #[test]
    fn recruiter_email_subject_and_position() {
        let messages = generate(&jane());
        assert!(
            messages
                .recruiter_email
                .starts_with("Subject: Recently Applied for Engineer at Acme\n\n")
        );
        assert!(
            messages
                .recruiter_email
                .contains("my recent application for the Engineer position at Acme.")
        );

        let no_role = generate(&MessageInput::new("Jane", "Acme", ""));
        assert!(
            no_role
                .recruiter_email
                .starts_with("Subject: Recently Applied for Position at Acme")
        );
        assert!(
            no_role
                .recruiter_email
                .contains("my recent application for a position at Acme.")
        );
    }

    #[test]
    fn sender_profile_signs_every_template() {
        let sender = SenderProfile {
            name: "Sam".to_owned(),
            background: "I build data pipelines.".to_owned(),
        };
        let messages = generate_with(&jane(), &sender);
        for kind in MessageKind::ALL {
            assert!(messages.get(kind).ends_with("Best regards,\nSam"));
        }
        assert!(messages.recruiter_email.contains("My name is Sam,"));
        assert!(
            messages
                .recruiter_email
                .contains("I build data pipelines. I believe my interdisciplinary background")
        );
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate(&jane()), generate(&jane()));
    }
}
