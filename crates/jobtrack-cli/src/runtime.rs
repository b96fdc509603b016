// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use jobtrack_app::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, ContactId, ContactPatch,
    ContactStatus, ListQuery, NetworkContact, NewApplication, NewNetworkContact, RecordStore,
    SenderProfile, SessionUser, UserId,
};
use jobtrack_store::{Client, RemoteStore, Session, SignUpOutcome};
use jobtrack_testkit::MemoryStore;
use jobtrack_tui::{AppRuntime, SignUpResult};
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Runtime over the hosted backend. Holds a store only while signed in and
/// writes every new or refreshed session to `session_path`.
pub struct RemoteRuntime {
    client: Client,
    store: Option<RemoteStore>,
    session_path: PathBuf,
    sender: SenderProfile,
}

impl RemoteRuntime {
    pub fn new(client: Client, session_path: PathBuf, sender: SenderProfile) -> Self {
        Self {
            client,
            store: None,
            session_path,
            sender,
        }
    }

    /// Picks up a saved session. A session the backend no longer accepts is
    /// deleted and the user starts signed out.
    pub fn resume(&mut self, now: OffsetDateTime) -> Result<Option<SessionUser>> {
        let Some(saved) = Session::load(&self.session_path)? else {
            return Ok(None);
        };
        match self.client.resume(saved, now) {
            Some(session) => {
                session.save(&self.session_path)?;
                let user = session.user.clone();
                info!("resumed session for {}", user.email);
                self.store = Some(RemoteStore::new(self.client.clone(), session));
                Ok(Some(user))
            }
            None => {
                Session::remove(&self.session_path)?;
                Ok(None)
            }
        }
    }

    fn start(&mut self, session: Session) -> Result<SessionUser> {
        session.save(&self.session_path)?;
        let user = session.user.clone();
        self.store = Some(RemoteStore::new(self.client.clone(), session));
        Ok(user)
    }

    fn with_store<T>(&mut self, call: impl FnOnce(&mut RemoteStore) -> Result<T>) -> Result<T> {
        let store = self
            .store
            .as_mut()
            .ok_or_else(|| anyhow!("sign in first"))?;
        let result = call(store);
        if let Some(session) = store.take_refreshed()
            && let Err(error) = session.save(&self.session_path)
        {
            warn!("could not save refreshed session: {error:#}");
        }
        result
    }
}

impl RecordStore for RemoteRuntime {
    fn list_applications(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        self.with_store(|store| store.list_applications(owner, query))
    }

    fn get_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<Application>> {
        self.with_store(|store| store.get_application(owner, id))
    }

    fn insert_application(
        &mut self,
        owner: &UserId,
        draft: &NewApplication,
        created_at: OffsetDateTime,
    ) -> Result<Application> {
        self.with_store(|store| store.insert_application(owner, draft, created_at))
    }

    fn update_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> Result<()> {
        self.with_store(|store| store.update_application(owner, id, patch))
    }

    fn delete_application(&mut self, owner: &UserId, id: &ApplicationId) -> Result<()> {
        self.with_store(|store| store.delete_application(owner, id))
    }

    fn list_contacts(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ContactStatus>,
    ) -> Result<Vec<NetworkContact>> {
        self.with_store(|store| store.list_contacts(owner, query))
    }

    fn get_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<Option<NetworkContact>> {
        self.with_store(|store| store.get_contact(owner, id))
    }

    fn insert_contact(
        &mut self,
        owner: &UserId,
        draft: &NewNetworkContact,
        created_at: OffsetDateTime,
    ) -> Result<NetworkContact> {
        self.with_store(|store| store.insert_contact(owner, draft, created_at))
    }

    fn update_contact(
        &mut self,
        owner: &UserId,
        id: &ContactId,
        patch: &ContactPatch,
    ) -> Result<()> {
        self.with_store(|store| store.update_contact(owner, id, patch))
    }

    fn delete_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<()> {
        self.with_store(|store| store.delete_contact(owner, id))
    }

    fn contacts_at_company(
        &mut self,
        owner: &UserId,
        company: &str,
    ) -> Result<Vec<NetworkContact>> {
        self.with_store(|store| store.contacts_at_company(owner, company))
    }
}

impl AppRuntime for RemoteRuntime {
    fn sign_in(&mut self, email: &str, password: &str) -> Result<SessionUser> {
        let session = self.client.sign_in(email, password)?;
        self.start(session)
    }

    fn sign_up(&mut self, email: &str, password: &str) -> Result<SignUpResult> {
        match self.client.sign_up(email, password)? {
            SignUpOutcome::SignedIn(session) => Ok(SignUpResult::SignedIn(self.start(session)?)),
            SignUpOutcome::ConfirmationRequired { .. } => Ok(SignUpResult::ConfirmationRequired),
        }
    }

    /// The local session survives a failed server call so the user stays
    /// signed in and can retry.
    fn sign_out(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            self.client.sign_out(store.session())?;
        }
        Session::remove(&self.session_path)?;
        self.store = None;
        Ok(())
    }

    fn sender_profile(&self) -> SenderProfile {
        self.sender.clone()
    }
}

/// Seeded in-memory runtime for `--demo`. Nothing touches the network or
/// the session file.
pub struct DemoRuntime {
    store: MemoryStore,
    user: SessionUser,
    sender: SenderProfile,
}

impl DemoRuntime {
    pub const SEED: u64 = 7;

    pub fn new(user: SessionUser, sender: SenderProfile, now: OffsetDateTime) -> Result<Self> {
        let store = MemoryStore::seeded_demo(&user.id, Self::SEED, now)?;
        Ok(Self {
            store,
            user,
            sender,
        })
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }
}

impl RecordStore for DemoRuntime {
    fn list_applications(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        self.store.list_applications(owner, query)
    }

    fn get_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<Application>> {
        self.store.get_application(owner, id)
    }

    fn insert_application(
        &mut self,
        owner: &UserId,
        draft: &NewApplication,
        created_at: OffsetDateTime,
    ) -> Result<Application> {
        self.store.insert_application(owner, draft, created_at)
    }

    fn update_application(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
        patch: &ApplicationPatch,
    ) -> Result<()> {
        self.store.update_application(owner, id, patch)
    }

    fn delete_application(&mut self, owner: &UserId, id: &ApplicationId) -> Result<()> {
        self.store.delete_application(owner, id)
    }

    fn list_contacts(
        &mut self,
        owner: &UserId,
        query: &ListQuery<ContactStatus>,
    ) -> Result<Vec<NetworkContact>> {
        self.store.list_contacts(owner, query)
    }

    fn get_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<Option<NetworkContact>> {
        self.store.get_contact(owner, id)
    }

    fn insert_contact(
        &mut self,
        owner: &UserId,
        draft: &NewNetworkContact,
        created_at: OffsetDateTime,
    ) -> Result<NetworkContact> {
        self.store.insert_contact(owner, draft, created_at)
    }

    fn update_contact(
        &mut self,
        owner: &UserId,
        id: &ContactId,
        patch: &ContactPatch,
    ) -> Result<()> {
        self.store.update_contact(owner, id, patch)
    }

    fn delete_contact(&mut self, owner: &UserId, id: &ContactId) -> Result<()> {
        self.store.delete_contact(owner, id)
    }

    fn contacts_at_company(
        &mut self,
        owner: &UserId,
        company: &str,
    ) -> Result<Vec<NetworkContact>> {
        self.store.contacts_at_company(owner, company)
    }
}

impl AppRuntime for DemoRuntime {
    fn sign_in(&mut self, email: &str, _password: &str) -> Result<SessionUser> {
        if !email.eq_ignore_ascii_case(&self.user.email) {
            bail!("demo mode only knows {}", self.user.email);
        }
        Ok(self.user.clone())
    }

    fn sign_up(&mut self, _email: &str, _password: &str) -> Result<SignUpResult> {
        bail!("demo mode does not create accounts")
    }

    fn sign_out(&mut self) -> Result<()> {
        Ok(())
    }

    fn sender_profile(&self) -> SenderProfile {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, RemoteRuntime};
    use anyhow::{Result, anyhow};
    use jobtrack_app::{ListQuery, RecordStore, SenderProfile, SessionUser, UserId};
    use jobtrack_store::{Client, Session};
    use jobtrack_testkit::{
        DEMO_APPLICATIONS, DEMO_CONTACTS, demo_user, fixture_datetime, temp_session_path,
    };
    use jobtrack_tui::{AppRuntime, SignUpResult};
    use std::thread;
    use std::time::Duration;
    use time::OffsetDateTime;
    use tiny_http::{Header, Response, Server};

    const ANON_KEY: &str = "anon-key";

    const TOKEN_BODY: &str = r#"{"access_token":"tok","refresh_token":"ref","expires_in":3600,
        "user":{"id":"u1","email":"jane@example.com"}}"#;

    fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
        Response::from_string(body)
            .with_status_code(status)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            )
    }

    fn mock_server() -> Result<(Server, String)> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        Ok((server, addr))
    }

    fn saved_session() -> Session {
        Session {
            access_token: "access-1".to_owned(),
            refresh_token: "refresh-1".to_owned(),
            expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
            user: SessionUser {
                id: UserId::new("u1"),
                email: "jane@example.com".to_owned(),
            },
        }
    }

    fn remote(addr: &str, path: std::path::PathBuf) -> Result<RemoteRuntime> {
        let client = Client::new(addr, ANON_KEY, Duration::from_secs(1))?;
        Ok(RemoteRuntime::new(client, path, SenderProfile::default()))
    }

    #[test]
    fn records_require_a_session() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        let mut runtime = remote("http://127.0.0.1:1", path)?;
        let error = runtime
            .list_applications(&UserId::new("u1"), &ListQuery::all())
            .expect_err("listing without a session should fail");
        assert_eq!(error.to_string(), "sign in first");
        Ok(())
    }

    #[test]
    fn sign_in_persists_session() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/auth/v1/token?grant_type=password");
            request
                .respond(json_response(TOKEN_BODY, 200))
                .expect("response should succeed");
        });

        let mut runtime = remote(&addr, path.clone())?;
        let user = runtime.sign_in("jane@example.com", "hunter22")?;
        assert_eq!(user.id, UserId::new("u1"));
        let saved = Session::load(&path)?.expect("session should be saved");
        assert_eq!(saved.access_token, "tok");

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn resume_without_saved_session_starts_signed_out() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        let mut runtime = remote("http://127.0.0.1:1", path)?;
        assert_eq!(runtime.resume(OffsetDateTime::now_utc())?, None);
        Ok(())
    }

    #[test]
    fn resume_accepts_a_valid_saved_session() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        saved_session().save(&path)?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/auth/v1/user");
            request
                .respond(json_response(
                    r#"{"id":"u1","email":"jane@example.com"}"#,
                    200,
                ))
                .expect("response should succeed");
        });

        let mut runtime = remote(&addr, path)?;
        let user = runtime.resume(OffsetDateTime::now_utc())?;
        assert_eq!(
            user.map(|user| user.email),
            Some("jane@example.com".to_owned())
        );

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn rejected_saved_session_is_removed() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        saved_session().save(&path)?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            request
                .respond(json_response(r#"{"msg":"invalid JWT"}"#, 401))
                .expect("response should succeed");
        });

        let mut runtime = remote(&addr, path.clone())?;
        assert_eq!(runtime.resume(OffsetDateTime::now_utc())?, None);
        assert_eq!(Session::load(&path)?, None);

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn failed_sign_out_keeps_saved_session() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("sign-in request expected");
            request
                .respond(json_response(TOKEN_BODY, 200))
                .expect("response should succeed");
            let request = server.recv().expect("sign-out request expected");
            assert_eq!(request.url(), "/auth/v1/logout");
            request
                .respond(json_response(r#"{"msg":"upstream down"}"#, 503))
                .expect("response should succeed");
        });

        let mut runtime = remote(&addr, path.clone())?;
        runtime.sign_in("jane@example.com", "hunter22")?;
        assert!(runtime.sign_out().is_err());
        assert!(Session::load(&path)?.is_some());

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn sign_up_reports_pending_confirmation() -> Result<()> {
        let (_dir, path) = temp_session_path()?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            request
                .respond(json_response(
                    r#"{"id":"u9","email":"new@example.com"}"#,
                    200,
                ))
                .expect("response should succeed");
        });

        let mut runtime = remote(&addr, path.clone())?;
        let result = runtime.sign_up("new@example.com", "hunter22")?;
        assert_eq!(result, SignUpResult::ConfirmationRequired);
        assert_eq!(Session::load(&path)?, None);

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn demo_runtime_serves_seeded_rows() -> Result<()> {
        let user = demo_user();
        let mut runtime = DemoRuntime::new(user.clone(), SenderProfile::default(), fixture_datetime())?;
        let applications = runtime.list_applications(&user.id, &ListQuery::all())?;
        let contacts = runtime.list_contacts(&user.id, &ListQuery::all())?;
        assert_eq!(applications.len(), DEMO_APPLICATIONS);
        assert_eq!(contacts.len(), DEMO_CONTACTS);
        assert!(runtime.sign_up("x@example.com", "pw").is_err());
        assert_eq!(runtime.sign_in("DEMO@jobtrack.local", "any")?, user);
        assert!(runtime.sign_out().is_ok());
        Ok(())
    }
}
