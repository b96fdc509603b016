// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use jobtrack_app::{
    ApplicationId, ApplicationPatch, ApplicationStatus, ListQuery, NewApplication, RecordStore,
    SessionUser, StatusFilter, UserId,
};
use jobtrack_store::{Client, RemoteStore, Session, SignUpOutcome};
use jobtrack_testkit::fixture_datetime;
use std::io::Read;
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tiny_http::{Header, Method, Request, Response, Server};

const ANON_KEY: &str = "anon-key";

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn header(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_owned())
}

fn body(request: &mut Request) -> String {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .expect("request body should be readable");
    body
}

fn session() -> Session {
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

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    Ok((server, addr))
}

const APPLICATION_ROW: &str = r#"{
    "id": "a1",
    "user_id": "u1",
    "company": "Acme",
    "link": "https://acme.dev/jobs/1",
    "active_apps": true,
    "status": "Need Referral",
    "username": null,
    "password": null,
    "created_at": "2026-02-19T12:34:56+00:00"
}"#;

#[test]
fn unreachable_backend_names_the_url() {
    let client = Client::new("http://127.0.0.1:1", ANON_KEY, Duration::from_millis(50))
        .expect("client should initialize");
    let error = client
        .sign_in("jane@example.com", "hunter22")
        .expect_err("sign in should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("cannot reach http://127.0.0.1:1"));
    assert!(message.contains("[backend].url"));
}

#[test]
fn empty_settings_are_rejected() {
    assert!(Client::new("", ANON_KEY, Duration::from_secs(1)).is_err());
    assert!(Client::new("http://localhost:54321", " ", Duration::from_secs(1)).is_err());
}

#[test]
fn sign_in_exchanges_password_for_session() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/auth/v1/token?grant_type=password");
        assert_eq!(header(&request, "apikey").as_deref(), Some(ANON_KEY));
        let sent = body(&mut request);
        assert!(sent.contains(r#""email":"jane@example.com""#));
        request
            .respond(json_response(
                r#"{"access_token":"tok","refresh_token":"ref","expires_in":3600,
                    "user":{"id":"u1","email":"jane@example.com"}}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let session = client.sign_in("jane@example.com", "hunter22")?;
    assert_eq!(session.access_token, "tok");
    assert_eq!(session.refresh_token, "ref");
    assert_eq!(session.user.id, UserId::new("u1"));
    assert!(!session.is_expired(OffsetDateTime::now_utc()));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rejected_credentials_surface_backend_message() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
                400,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let error = client
        .sign_in("jane@example.com", "wrong")
        .expect_err("bad credentials should fail");
    assert_eq!(
        error.to_string(),
        "server error (400): Invalid login credentials"
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn sign_up_without_session_requires_confirmation() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/auth/v1/signup");
        request
            .respond(json_response(
                r#"{"id":"u9","email":"new@example.com","confirmation_sent_at":"2026-02-19T12:00:00Z"}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let outcome = client.sign_up("new@example.com", "hunter22")?;
    assert_eq!(
        outcome,
        SignUpOutcome::ConfirmationRequired {
            email: "new@example.com".to_owned()
        }
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_sends_owner_status_and_order_filters() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let url = request.url().to_owned();
        assert!(url.starts_with("/rest/v1/applications?"));
        assert!(url.contains("user_id=eq.u1"));
        assert!(url.contains("order=created_at.desc"));
        assert!(url.contains("status=eq.Need+Referral"));
        assert!(url.contains("active_apps=eq.true"));
        assert_eq!(
            header(&request, "Authorization").as_deref(),
            Some("Bearer access-1")
        );
        request
            .respond(json_response(&format!("[{APPLICATION_ROW}]"), 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let mut store = RemoteStore::new(client, session());
    let query = ListQuery::with_filter(StatusFilter::Only(ApplicationStatus::NeedReferral))
        .active_only();
    let rows = store.list_applications(&UserId::new("u1"), &query)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ApplicationStatus::NeedReferral);
    assert_eq!(rows[0].username, "");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn insert_stamps_owner_and_created_at() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/rest/v1/applications");
        assert_eq!(
            header(&request, "Prefer").as_deref(),
            Some("return=representation")
        );
        let sent: serde_json::Value =
            serde_json::from_str(&body(&mut request)).expect("json body");
        assert_eq!(sent["user_id"], "u1");
        assert_eq!(sent["company"], "Acme");
        assert_eq!(sent["status"], "Need Referral");
        assert_eq!(sent["created_at"], "2026-02-19T12:34:56Z");
        request
            .respond(json_response(&format!("[{APPLICATION_ROW}]"), 201))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let mut store = RemoteStore::new(client, session());
    let draft = NewApplication {
        company: "Acme".to_owned(),
        link: "https://acme.dev/jobs/1".to_owned(),
        active_apps: true,
        status: ApplicationStatus::NeedReferral,
        username: String::new(),
        password: String::new(),
    };
    let row = store.insert_application(&UserId::new("u1"), &draft, fixture_datetime())?;
    assert_eq!(row.id, ApplicationId::new("a1"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_sends_only_named_fields() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Patch);
        let url = request.url().to_owned();
        assert!(url.contains("id=eq.a1"));
        assert!(url.contains("user_id=eq.u1"));
        assert_eq!(body(&mut request), r#"{"active_apps":false}"#);
        request
            .respond(Response::empty(204))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let mut store = RemoteStore::new(client, session());
    store.update_application(
        &UserId::new("u1"),
        &ApplicationId::new("a1"),
        &ApplicationPatch::set_active(false),
    )?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn related_contacts_use_case_insensitive_contains() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let url = request.url().to_owned();
        assert!(url.starts_with("/rest/v1/network_contacts?"));
        assert!(url.contains("company=ilike.*Acme*"));
        assert!(url.contains("order=name.asc"));
        request
            .respond(json_response("[]", 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let mut store = RemoteStore::new(client, session());
    let rows = store.contacts_at_company(&UserId::new("u1"), "Acme")?;
    assert!(rows.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn store_refuses_requests_for_another_owner() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", ANON_KEY, Duration::from_millis(50))?;
    let mut store = RemoteStore::new(client, session());
    let error = store
        .list_applications(&UserId::new("u2"), &ListQuery::all())
        .expect_err("foreign owner should fail before any request");
    assert!(error.to_string().contains("sign in again"));
    Ok(())
}

#[test]
fn expired_session_is_refreshed_before_a_query() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("refresh request expected");
        assert_eq!(request.url(), "/auth/v1/token?grant_type=refresh_token");
        request
            .respond(json_response(
                r#"{"access_token":"access-2","refresh_token":"refresh-2","expires_in":3600,
                    "user":{"id":"u1","email":"jane@example.com"}}"#,
                200,
            ))
            .expect("response should succeed");

        let request = server.recv().expect("list request expected");
        assert_eq!(
            header(&request, "Authorization").as_deref(),
            Some("Bearer access-2")
        );
        request
            .respond(json_response("[]", 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, ANON_KEY, Duration::from_secs(1))?;
    let mut expired = session();
    expired.expires_at = OffsetDateTime::now_utc() - time::Duration::minutes(1);
    let mut store = RemoteStore::new(client, expired);
    store.list_contacts(&UserId::new("u1"), &ListQuery::all())?;

    let refreshed = store.take_refreshed().expect("refresh should be reported");
    assert_eq!(refreshed.access_token, "access-2");
    assert!(store.take_refreshed().is_none());

    handle.join().expect("server thread should join");
    Ok(())
}
