// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppMode, FormKind, FormPayload, Notice, SessionUser, TabKind, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub session: Option<SessionUser>,
    pub status: Option<Notice>,
    pub form_payload: Option<FormPayload>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Form(FormKind::SignIn),
            active_tab: TabKind::Dashboard,
            session: None,
            status: None,
            form_payload: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    SetActiveTab(TabKind),
    OpenForm(FormPayload),
    SetFormPayload(FormPayload),
    SubmitForm,
    CancelForm,
    SignedIn(SessionUser),
    SignedOut,
    SetStatus(Notice),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(TabKind),
    FormSubmitted(FormKind),
    FormCanceled,
    SessionChanged(Option<UserId>),
    StatusUpdated(Notice),
    StatusCleared,
}

impl AppState {
    pub fn owner(&self) -> Option<&UserId> {
        self.session.as_ref().map(|user| &user.id)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SetActiveTab(tab) => {
                if !self.is_signed_in() || self.active_tab == tab {
                    return Vec::new();
                }
                self.active_tab = tab;
                vec![AppEvent::TabChanged(tab)]
            }
            AppCommand::OpenForm(payload) => {
                let kind = payload.kind();
                if kind.requires_session() && !self.is_signed_in() {
                    return vec![self.set_status(Notice::error("sign in first"))];
                }
                self.form_payload = Some(payload);
                self.mode = AppMode::Form(kind);
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetFormPayload(payload) => {
                if self.mode == AppMode::Form(payload.kind()) {
                    self.form_payload = Some(payload);
                }
                Vec::new()
            }
            AppCommand::SubmitForm => self.submit_form(),
            AppCommand::CancelForm => self.cancel_form(),
            AppCommand::SignedIn(user) => {
                let owner = user.id.clone();
                self.session = Some(user);
                self.form_payload = None;
                self.mode = AppMode::Nav;
                vec![
                    AppEvent::SessionChanged(Some(owner)),
                    AppEvent::ModeChanged(self.mode),
                ]
            }
            AppCommand::SignedOut => {
                self.session = None;
                self.form_payload = None;
                self.active_tab = TabKind::Dashboard;
                self.mode = AppMode::Form(FormKind::SignIn);
                vec![
                    AppEvent::SessionChanged(None),
                    AppEvent::ModeChanged(self.mode),
                ]
            }
            AppCommand::SetStatus(notice) => vec![self.set_status(notice)],
            AppCommand::ClearStatus => {
                self.status = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn submit_form(&mut self) -> Vec<AppEvent> {
        let AppMode::Form(kind) = self.mode else {
            return vec![self.set_status(Notice::error("no form is open"))];
        };
        let Some(payload) = &self.form_payload else {
            return vec![self.set_status(Notice::error("form is empty"))];
        };
        if let Err(error) = payload.validate() {
            return vec![self.set_status(Notice::error(error.to_string()))];
        }
        vec![AppEvent::FormSubmitted(kind)]
    }

    /// Auth forms swap between each other; record forms close back to nav.
    fn cancel_form(&mut self) -> Vec<AppEvent> {
        let AppMode::Form(kind) = self.mode else {
            return Vec::new();
        };
        if !kind.requires_session() && !self.is_signed_in() {
            let other = match kind {
                FormKind::SignIn => FormKind::SignUp,
                _ => FormKind::SignIn,
            };
            self.mode = AppMode::Form(other);
            self.form_payload = None;
            return vec![AppEvent::ModeChanged(self.mode)];
        }
        self.mode = AppMode::Nav;
        self.form_payload = None;
        vec![AppEvent::FormCanceled, AppEvent::ModeChanged(self.mode)]
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        if !self.is_signed_in() {
            return Vec::new();
        }
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn set_status(&mut self, notice: Notice) -> AppEvent {
        self.status = Some(notice.clone());
        AppEvent::StatusUpdated(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{
        AppMode, ApplicationFormInput, FormKind, FormPayload, Notice, SessionUser, SignInInput,
        TabKind, UserId,
    };
    use time::macros::date;

    fn signed_in() -> AppState {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SignedIn(SessionUser {
            id: UserId::new("u1"),
            email: "jane@example.com".to_owned(),
        }));
        state
    }

    #[test]
    fn starts_on_sign_in_surface() {
        let state = AppState::default();
        assert_eq!(state.mode, AppMode::Form(FormKind::SignIn));
        assert_eq!(state.owner(), None);
    }

    #[test]
    fn tab_rotation_wraps_when_signed_in() {
        let mut state = signed_in();
        state.active_tab = TabKind::Network;

        let events = state.dispatch(AppCommand::NextTab);
        assert_eq!(state.active_tab, TabKind::Dashboard);
        assert_eq!(events, vec![AppEvent::TabChanged(TabKind::Dashboard)]);
    }

    #[test]
    fn tab_navigation_is_ignored_when_signed_out() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::NextTab).is_empty());
        assert!(
            state
                .dispatch(AppCommand::SetActiveTab(TabKind::Network))
                .is_empty()
        );
        assert_eq!(state.active_tab, TabKind::Dashboard);
    }

    #[test]
    fn record_form_requires_session() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::OpenForm(FormPayload::blank_for(
            FormKind::Application,
            date!(2024 - 01 - 01),
        )));
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated(Notice::error("sign in first"))]
        );
        assert_eq!(state.mode, AppMode::Form(FormKind::SignIn));
    }

    #[test]
    fn submit_validates_payload() {
        let mut state = signed_in();
        state.dispatch(AppCommand::OpenForm(FormPayload::Application {
            id: None,
            input: ApplicationFormInput::default(),
        }));

        let events = state.dispatch(AppCommand::SubmitForm);
        assert!(matches!(
            events.as_slice(),
            [AppEvent::StatusUpdated(notice)] if notice.is_error()
        ));

        state.dispatch(AppCommand::SetFormPayload(FormPayload::Application {
            id: None,
            input: ApplicationFormInput {
                company: "Acme".to_owned(),
                ..ApplicationFormInput::default()
            },
        }));
        assert_eq!(
            state.dispatch(AppCommand::SubmitForm),
            vec![AppEvent::FormSubmitted(FormKind::Application)]
        );
    }

    #[test]
    fn cancel_swaps_auth_forms_when_signed_out() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::OpenForm(FormPayload::SignIn(
            SignInInput::default(),
        )));
        state.dispatch(AppCommand::CancelForm);
        assert_eq!(state.mode, AppMode::Form(FormKind::SignUp));
        state.dispatch(AppCommand::CancelForm);
        assert_eq!(state.mode, AppMode::Form(FormKind::SignIn));
    }

    #[test]
    fn sign_out_returns_to_sign_in_surface() {
        let mut state = signed_in();
        state.active_tab = TabKind::Applications;

        let events = state.dispatch(AppCommand::SignedOut);
        assert_eq!(state.session, None);
        assert_eq!(state.active_tab, TabKind::Dashboard);
        assert_eq!(
            events,
            vec![
                AppEvent::SessionChanged(None),
                AppEvent::ModeChanged(AppMode::Form(FormKind::SignIn)),
            ]
        );
    }
}
