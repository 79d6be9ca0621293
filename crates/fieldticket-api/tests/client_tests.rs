// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use fieldticket_api::Client;
use fieldticket_app::{
    DeleteOutcome, DeleteRequest, LeaseId, NestedList, PasswordUpdate, ProfileField,
    SessionToken, UniqId, UserId,
};
use fieldticket_testkit::LeaseFaker;
use serde_json::{Value, json};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_response(body: String, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn read_body(request: &mut tiny_http::Request) -> Value {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .expect("request body should be readable");
    serde_json::from_str(&body).expect("request body should be json")
}

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    Ok((server, addr))
}

fn delete_request(list: NestedList, uniq: &str) -> DeleteRequest {
    DeleteRequest {
        token: SessionToken::new(1),
        lease_id: LeaseId::from("1001"),
        list,
        uniq_id: UniqId::from(uniq),
    }
}

#[test]
fn unreachable_server_error_names_remediation() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .list_leases()
        .expect_err("list should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("127.0.0.1:1"));
    assert!(message.contains("[api]"));
}

#[test]
fn client_rejects_bad_base_urls() {
    assert!(Client::new("", Duration::from_secs(1)).is_err());
    assert!(Client::new("not a url", Duration::from_secs(1)).is_err());
    assert!(Client::new("ftp://example.com", Duration::from_secs(1)).is_err());
}

#[test]
fn list_leases_decodes_generated_fixtures() -> Result<()> {
    let (server, addr) = mock_server()?;
    let leases = LeaseFaker::new(21).leases(4);
    let payload = serde_json::to_string(&leases)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(*request.method(), Method::Get);
        assert_eq!(request.url(), "/api/leases.php");
        request
            .respond(json_response(payload, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let fetched = client.list_leases()?;
    assert_eq!(fetched, leases);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn null_lease_list_is_empty() -> Result<()> {
    let (server, addr) = mock_server()?;
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response("null".to_owned(), 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    assert!(client.list_leases()?.is_empty());
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_lease_patches_json_and_surfaces_failures() -> Result<()> {
    let (server, addr) = mock_server()?;
    let lease = LeaseFaker::new(22).lease(0);
    let expected = serde_json::to_value(&lease)?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("first request expected");
        assert_eq!(*request.method(), Method::Patch);
        assert_eq!(request.url(), "/api/leases.php");
        assert_eq!(read_body(&mut request), expected);
        request
            .respond(json_response("{}".to_owned(), 200))
            .expect("response should succeed");

        let request = server.recv().expect("second request expected");
        request
            .respond(json_response(
                r#"{"message":"lease is locked"}"#.to_owned(),
                500,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    client.update_lease(&lease)?;
    let error = client
        .update_lease(&lease)
        .expect_err("500 should be an error");
    assert_eq!(error.to_string(), "server error (500): lease is locked");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_sends_body_and_maps_status_to_outcome() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("first request expected");
        assert_eq!(*request.method(), Method::Delete);
        assert_eq!(
            read_body(&mut request),
            json!({"LeaseID": "1001", "Tanks": [{"UniqID": "T1"}]})
        );
        request
            .respond(json_response("{}".to_owned(), 200))
            .expect("response should succeed");

        let mut request = server.recv().expect("second request expected");
        assert_eq!(
            read_body(&mut request),
            json!({"LeaseID": "1001", "Wells": [{"UniqID": "W3"}]})
        );
        request
            .respond(json_response(
                r#"{"error":"foreign key"}"#.to_owned(),
                409,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    assert_eq!(
        client.delete_nested(&delete_request(NestedList::Tanks, "T1"))?,
        DeleteOutcome::Deleted
    );
    assert_eq!(
        client.delete_nested(&delete_request(NestedList::Wells, "W3"))?,
        DeleteOutcome::InUse { status: 409 }
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn user_tags_decode_mixed_rows() -> Result<()> {
    let (server, addr) = mock_server()?;
    let rows = LeaseFaker::new(23).user_tags(3);
    let payload = serde_json::to_string(&rows)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/usertags.php");
        request
            .respond(json_response(payload, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    assert_eq!(client.list_user_tags()?, rows);
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn user_details_pick_the_requested_user() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/userdetails.php?id=u2");
        let body = json!({
            "success": true,
            "users": [
                {"UserID": "u1", "FullName": "Other", "Role": "P"},
                {"UserID": "u2", "FullName": "Pat Doe", "Email": "pat@example.com", "Role": "A"}
            ]
        });
        request
            .respond(json_response(body.to_string(), 200))
            .expect("response should succeed");

        let request = server.recv().expect("second request expected");
        request
            .respond(json_response(
                r#"{"success": false, "users": []}"#.to_owned(),
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let user = client.get_user_details(&UserId::from("u2"))?;
    assert_eq!(user.full_name.as_deref(), Some("Pat Doe"));
    assert_eq!(user.field(ProfileField::Email), Some("pat@example.com"));
    assert_eq!(user.role_label(), "Admin");

    assert!(client.get_user_details(&UserId::from("u2")).is_err());
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn profile_and_password_updates_return_success_flag() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("profile request expected");
        assert_eq!(*request.method(), Method::Patch);
        let body = read_body(&mut request);
        assert_eq!(body["Phone"], json!("555-0111"));
        request
            .respond(json_response(r#"{"success": true}"#.to_owned(), 200))
            .expect("response should succeed");

        let mut request = server.recv().expect("password request expected");
        assert_eq!(
            read_body(&mut request),
            json!({"UserID": "u2", "Sec": "hunter2"})
        );
        request
            .respond(json_response(r#"{"success": false}"#.to_owned(), 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let mut user: fieldticket_app::UserDetails =
        serde_json::from_value(json!({"UserID": "u2", "Phone": "555-0100"}))?;
    user.set_field(ProfileField::Phone, "555-0111");
    assert!(client.update_user_details(&user)?);

    let update = PasswordUpdate {
        user_id: UserId::from("u2"),
        secret: "hunter2".to_owned(),
    };
    assert!(!client.change_password(&update)?);

    handle.join().expect("server thread should join");
    Ok(())
}
