// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use fieldticket_api::Client;
use fieldticket_app::{
    DeleteOutcome, DeleteRequest, EditTab, Lease, LeaseCommand, LeaseEvent, LeaseField, LeaseId,
    LeaseRuntime, LeaseScreen, NestedList, OptionSets, PasswordChange, ProfileEditor,
    ProfileField, SortDirection, TankField, UniqId, UserId, WellField,
};
use tracing::info;

pub struct ApiRuntime<'a> {
    client: &'a Client,
}

impl<'a> ApiRuntime<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }
}

impl LeaseRuntime for ApiRuntime<'_> {
    fn fetch_leases(&mut self) -> Result<Vec<Lease>> {
        self.client.list_leases()
    }

    fn save_lease(&mut self, lease: &Lease) -> Result<()> {
        self.client.update_lease(lease)
    }

    fn delete_nested(&mut self, request: &DeleteRequest) -> Result<DeleteOutcome> {
        self.client.delete_nested(request)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseQuery {
    pub search: Option<String>,
    pub sort: Option<LeaseField>,
    pub descending: bool,
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseEdit {
    pub tab: Option<EditTab>,
    pub fields: Vec<(LeaseField, String)>,
    pub add_tanks: Vec<String>,
    pub add_wells: Vec<String>,
    pub delete_tanks: Vec<UniqId>,
    pub delete_wells: Vec<UniqId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditReport {
    pub removed: Vec<(NestedList, UniqId)>,
    pub toasts: Vec<String>,
    pub saved: bool,
    /// The lease as listed after the post-save refresh.
    pub reloaded: Option<Lease>,
}

/// Load the collection and position the screen on the requested view.
pub fn run_lease_query(
    screen: &mut LeaseScreen,
    runtime: &mut dyn LeaseRuntime,
    query: &LeaseQuery,
) -> Result<()> {
    ensure_accepted(&screen.refresh(runtime))?;

    if let Some(term) = &query.search {
        ensure_accepted(&screen.dispatch(LeaseCommand::Search(term.clone())))?;
    }

    let key = query.sort.unwrap_or(screen.sort_key);
    let wanted = if query.descending {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    if key != screen.sort_key || wanted != screen.sort_direction {
        screen.dispatch(LeaseCommand::SortBy(key));
        if screen.sort_direction != wanted {
            screen.dispatch(LeaseCommand::SortBy(key));
        }
    }

    if let Some(page) = query.page {
        screen.dispatch(LeaseCommand::GoToPage(page));
    }
    Ok(())
}

/// One edit session end to end: server deletes first, then field edits and
/// new rows, then merge-on-save. A session with nothing left to save is
/// closed without a PATCH.
pub fn run_lease_edit(
    screen: &mut LeaseScreen,
    runtime: &mut dyn LeaseRuntime,
    lease_id: &LeaseId,
    edit: &LeaseEdit,
) -> Result<EditReport> {
    ensure_accepted(&screen.refresh(runtime))?;
    ensure_accepted(&screen.dispatch(LeaseCommand::Open(lease_id.clone())))?;

    let mut report = EditReport::default();
    let deletes = edit
        .delete_tanks
        .iter()
        .map(|id| (NestedList::Tanks, id))
        .chain(edit.delete_wells.iter().map(|id| (NestedList::Wells, id)));
    for (list, uniq_id) in deletes {
        let events = screen.delete_nested(runtime, list, uniq_id);
        ensure_accepted(&events)?;
        for event in events {
            match event {
                LeaseEvent::NestedRemoved(list, id) => report.removed.push((list, id)),
                LeaseEvent::ToastRaised(message) => {
                    report.toasts.push(message);
                    screen.dispatch(LeaseCommand::DismissToast);
                }
                _ => {}
            }
        }
    }

    for (field, value) in &edit.fields {
        ensure_accepted(&screen.dispatch(LeaseCommand::SetField(*field, value.clone())))?;
    }

    for tank_id in &edit.add_tanks {
        let index = added_row(&screen.dispatch(LeaseCommand::AddTank), NestedList::Tanks)?;
        ensure_accepted(&screen.dispatch(LeaseCommand::UpdateTank {
            index,
            field: TankField::TankId,
            value: tank_id.clone(),
        }))?;
    }
    for well_id in &edit.add_wells {
        let index = added_row(&screen.dispatch(LeaseCommand::AddWell), NestedList::Wells)?;
        ensure_accepted(&screen.dispatch(LeaseCommand::UpdateWell {
            index,
            field: WellField::WellId,
            value: well_id.clone(),
        }))?;
    }

    if let Some(tab) = edit.tab {
        screen.dispatch(LeaseCommand::SelectTab(tab));
    }

    // Confirmed deletions are already final on the server.
    let pending = screen
        .edit()
        .is_some_and(|session| session.has_unsaved_edits());
    if !pending {
        screen.dispatch(LeaseCommand::Cancel);
        return Ok(report);
    }

    let events = screen.save(runtime);
    if !events
        .iter()
        .any(|event| matches!(event, LeaseEvent::Saved(_)))
    {
        ensure_accepted(&events)?;
        bail!("lease {lease_id} was not saved -- reopen it and retry");
    }
    info!(lease = %lease_id, "lease saved");
    report.saved = true;
    report.reloaded = screen
        .leases()
        .iter()
        .find(|lease| &lease.id == lease_id)
        .cloned();
    Ok(report)
}

pub fn load_options(client: &Client) -> Result<OptionSets> {
    let rows = client.list_user_tags()?;
    Ok(OptionSets::from_tags(&rows))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChange {
    pub fields: Vec<(ProfileField, String)>,
    pub password: Option<PasswordChange>,
}

/// Load the user's profile and apply `change`. Returns the editor holding
/// the profile as the server last accepted it.
pub fn run_profile(
    client: &Client,
    user_id: &UserId,
    change: &ProfileChange,
) -> Result<ProfileEditor> {
    let mut editor = ProfileEditor::default();
    editor.load(client.get_user_details(user_id)?);

    if !change.fields.is_empty() {
        editor.begin_edit()?;
        for (field, value) in &change.fields {
            editor.set_field(*field, value.clone())?;
        }
        let edited = editor.begin_save()?;
        let accepted = client.update_user_details(&edited);
        editor.finish_save(edited, accepted)?;
        info!(user = %user_id, "profile updated");
    }

    if let Some(password) = &change.password {
        editor.password = password.clone();
        let update = editor.begin_password_change()?;
        let accepted = client.change_password(&update);
        editor.finish_password_change(accepted)?;
        info!(user = %user_id, "password changed");
    }

    Ok(editor)
}

/// Screen operations report rejections through the status line rather than
/// as errors; lift the first one into an error.
fn ensure_accepted(events: &[LeaseEvent]) -> Result<()> {
    for event in events {
        if let LeaseEvent::StatusUpdated(message) = event {
            bail!("{message}");
        }
    }
    Ok(())
}

fn added_row(events: &[LeaseEvent], list: NestedList) -> Result<usize> {
    ensure_accepted(events)?;
    events
        .iter()
        .find_map(|event| match event {
            LeaseEvent::RowExpanded(expanded, Some(index)) if *expanded == list => Some(*index),
            _ => None,
        })
        .ok_or_else(|| anyhow::anyhow!("new {} row was not added", list.label().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::{
        ApiRuntime, LeaseEdit, LeaseQuery, ProfileChange, run_lease_edit, run_lease_query,
        run_profile,
    };
    use anyhow::{Result, anyhow};
    use fieldticket_api::Client;
    use fieldticket_app::{
        Lease, LeaseField, LeaseId, LeaseScreen, NestedList, PasswordChange, ProfileField,
        ScreenOptions, UniqId, UserId,
    };
    use fieldticket_testkit::LeaseFaker;
    use serde_json::Value;
    use std::io::Read;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Method, Response, Server};

    /// Serve `count` requests: GETs return `leases`, DELETEs answer with
    /// `delete_status`, PATCH bodies are collected and acknowledged.
    fn lease_server(
        leases: Vec<Lease>,
        delete_status: u16,
        count: usize,
    ) -> Result<(String, thread::JoinHandle<Vec<Value>>)> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let payload = serde_json::to_string(&leases)?;

        let handle = thread::spawn(move || {
            let mut patched = Vec::new();
            for _ in 0..count {
                let mut request = server.recv().expect("request expected");
                let mut body = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut body)
                    .expect("request body should be readable");
                let (status, reply) = match request.method() {
                    Method::Get => (200, payload.clone()),
                    Method::Delete => (delete_status, "{}".to_owned()),
                    _ => {
                        patched.push(serde_json::from_str(&body).expect("patch body is json"));
                        (200, "{}".to_owned())
                    }
                };
                let response = Response::from_string(reply)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("valid content type header"),
                    );
                request.respond(response).expect("response should succeed");
            }
            patched
        });
        Ok((addr, handle))
    }

    #[test]
    fn query_positions_search_sort_and_page() -> Result<()> {
        let leases = LeaseFaker::new(3).leases(30);
        let (addr, handle) = lease_server(leases, 200, 1)?;
        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = ApiRuntime::new(&client);
        let mut screen = LeaseScreen::new(ScreenOptions::default())?;

        run_lease_query(
            &mut screen,
            &mut runtime,
            &LeaseQuery {
                search: None,
                sort: Some(LeaseField::LeaseId),
                descending: true,
                page: Some(9),
            },
        )?;
        handle.join().map_err(|_| anyhow!("server thread panicked"))?;

        assert_eq!(screen.page_count(), 3);
        assert_eq!(screen.page(), 3);
        let rows = screen.page_rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].id, LeaseId::from("1005"));
        assert_eq!(rows[5].id, LeaseId::from("1000"));
        Ok(())
    }

    #[test]
    fn edit_deletes_then_saves_merged_lease() -> Result<()> {
        let leases = LeaseFaker::new(5).leases(2);
        let target = leases[0].clone();
        let (addr, handle) = lease_server(leases, 200, 4)?;
        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = ApiRuntime::new(&client);
        let mut screen = LeaseScreen::new(ScreenOptions::default())?;

        let report = run_lease_edit(
            &mut screen,
            &mut runtime,
            &target.id,
            &LeaseEdit {
                fields: vec![(LeaseField::District, "7C".to_owned())],
                add_tanks: vec!["1000-9".to_owned()],
                delete_tanks: vec![UniqId::from("T1")],
                ..LeaseEdit::default()
            },
        )?;
        let patched = handle
            .join()
            .map_err(|_| anyhow!("server thread panicked"))?;

        assert!(report.saved);
        assert_eq!(report.removed, vec![(NestedList::Tanks, UniqId::from("T1"))]);
        assert!(report.toasts.is_empty());
        assert!(report.reloaded.is_some());

        assert_eq!(patched.len(), 1);
        let body = &patched[0];
        assert_eq!(body["District"], "7C");
        let tank_ids: Vec<&str> = body["Tanks"]
            .as_array()
            .map(|tanks| {
                tanks
                    .iter()
                    .filter_map(|tank| tank["TankID"].as_str())
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(tank_ids.len(), target.tanks.len());
        assert!(!tank_ids.contains(&"1000-1"));
        assert!(tank_ids.contains(&"1000-9"));
        assert!(screen.edit().is_none());
        Ok(())
    }

    #[test]
    fn refused_delete_is_a_toast_and_skips_the_save() -> Result<()> {
        let leases = LeaseFaker::new(5).leases(1);
        let target = leases[0].clone();
        let (addr, handle) = lease_server(leases, 409, 2)?;
        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = ApiRuntime::new(&client);
        let mut screen = LeaseScreen::new(ScreenOptions::default())?;

        let report = run_lease_edit(
            &mut screen,
            &mut runtime,
            &target.id,
            &LeaseEdit {
                delete_tanks: vec![UniqId::from("T1")],
                ..LeaseEdit::default()
            },
        )?;
        let patched = handle
            .join()
            .map_err(|_| anyhow!("server thread panicked"))?;

        assert_eq!(report.toasts, vec!["Tank is currently being used".to_owned()]);
        assert!(report.removed.is_empty());
        assert!(!report.saved);
        assert!(patched.is_empty());
        Ok(())
    }

    #[test]
    fn delete_only_edit_sends_no_patch() -> Result<()> {
        let leases = LeaseFaker::new(5).leases(1);
        let target = leases[0].clone();
        let (addr, handle) = lease_server(leases, 200, 2)?;
        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = ApiRuntime::new(&client);
        let mut screen = LeaseScreen::new(ScreenOptions::default())?;

        let report = run_lease_edit(
            &mut screen,
            &mut runtime,
            &target.id,
            &LeaseEdit {
                delete_tanks: vec![UniqId::from("T1")],
                ..LeaseEdit::default()
            },
        )?;
        let patched = handle
            .join()
            .map_err(|_| anyhow!("server thread panicked"))?;

        assert_eq!(report.removed, vec![(NestedList::Tanks, UniqId::from("T1"))]);
        assert!(!report.saved);
        assert!(patched.is_empty());
        assert!(screen.edit().is_none());
        Ok(())
    }

    #[test]
    fn unknown_lease_is_an_error() -> Result<()> {
        let (addr, handle) = lease_server(LeaseFaker::new(5).leases(1), 200, 1)?;
        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = ApiRuntime::new(&client);
        let mut screen = LeaseScreen::new(ScreenOptions::default())?;

        let error = run_lease_edit(
            &mut screen,
            &mut runtime,
            &LeaseId::from("9999"),
            &LeaseEdit::default(),
        )
        .expect_err("missing lease should fail");
        handle.join().map_err(|_| anyhow!("server thread panicked"))?;
        assert!(error.to_string().contains("lease 9999 not found"));
        Ok(())
    }

    #[test]
    fn profile_rejects_mismatched_password_before_sending() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            let body = r#"{"success": true, "users": [{"UserID": "u1", "FullName": "Pat Doe"}]}"#;
            request
                .respond(Response::from_string(body))
                .expect("response should succeed");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let change = ProfileChange {
            fields: Vec::new(),
            password: Some(PasswordChange {
                password: "one".to_owned(),
                confirm: "two".to_owned(),
            }),
        };
        let error = run_profile(&client, &UserId::from("u1"), &change)
            .expect_err("mismatched password should fail");
        handle.join().map_err(|_| anyhow!("server thread panicked"))?;
        assert!(error.to_string().contains("passwords do not match"));
        Ok(())
    }

    #[test]
    fn profile_edit_adopts_saved_copy() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("details request expected");
            let body = r#"{"success": true, "users": [{"UserID": "u1", "Email": "old@example.com"}]}"#;
            request
                .respond(Response::from_string(body))
                .expect("response should succeed");
            let request = server.recv().expect("update request expected");
            request
                .respond(Response::from_string(r#"{"success": true}"#))
                .expect("response should succeed");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let change = ProfileChange {
            fields: vec![(ProfileField::Email, "new@example.com".to_owned())],
            password: None,
        };
        let editor = run_profile(&client, &UserId::from("u1"), &change)?;
        handle.join().map_err(|_| anyhow!("server thread panicked"))?;

        let user = editor.user().ok_or_else(|| anyhow!("profile should be loaded"))?;
        assert_eq!(user.field(ProfileField::Email), Some("new@example.com"));
        assert!(!editor.is_editing());
        Ok(())
    }
}
