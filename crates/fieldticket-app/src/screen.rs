// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use tracing::{debug, error, warn};

use crate::editor::{DeleteApplied, DeleteRequest, EditSession, SaveApplied, SessionToken};
use crate::paging::{DEFAULT_PAGE_SIZE, clamp_page, page_count, paginate};
use crate::query::{filter, sort};
use crate::reconcile::NestedEditPolicy;
use crate::{
    DeleteOutcome, EditTab, Lease, LeaseField, LeaseId, NestedList, SortDirection, TankField,
    UniqId, WellField,
};

/// Side effects the lease screen needs from the outside world.
pub trait LeaseRuntime {
    fn fetch_leases(&mut self) -> Result<Vec<Lease>>;
    fn save_lease(&mut self, lease: &Lease) -> Result<()>;
    fn delete_nested(&mut self, request: &DeleteRequest) -> Result<DeleteOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenOptions {
    pub page_size: usize,
    pub search_fields: Vec<LeaseField>,
    pub nested_edits: NestedEditPolicy,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_fields: LeaseField::DEFAULT_SEARCH.to_vec(),
            nested_edits: NestedEditPolicy::NewOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseCommand {
    Search(String),
    SortBy(LeaseField),
    NextPage,
    PrevPage,
    GoToPage(usize),
    Open(LeaseId),
    Cancel,
    NextTab,
    PrevTab,
    SelectTab(EditTab),
    SetField(LeaseField, String),
    AddTank,
    AddWell,
    UpdateTank {
        index: usize,
        field: TankField,
        value: String,
    },
    UpdateWell {
        index: usize,
        field: WellField,
        value: String,
    },
    ToggleExpanded(NestedList, usize),
    DiscardDraft(NestedList, usize),
    DismissToast,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseEvent {
    ViewChanged { matches: usize, page: usize, pages: usize },
    SortChanged(LeaseField, SortDirection),
    PageChanged(usize),
    EditOpened(LeaseId),
    EditClosed,
    TabChanged(EditTab),
    WorkingChanged,
    RowExpanded(NestedList, Option<usize>),
    NestedRemoved(NestedList, UniqId),
    ToastRaised(String),
    ToastDismissed,
    Saved(LeaseId),
    Refreshed(usize),
    StatusUpdated(String),
    StatusCleared,
}

/// Lease list with its query state and at most one open edit session.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseScreen {
    leases: Vec<Lease>,
    pub search: String,
    pub sort_key: LeaseField,
    pub sort_direction: SortDirection,
    page: usize,
    options: ScreenOptions,
    edit: Option<EditSession>,
    sessions_opened: u64,
    refreshes_started: u64,
    pub status_line: Option<String>,
}

impl LeaseScreen {
    pub fn new(options: ScreenOptions) -> Result<Self> {
        if options.page_size == 0 {
            bail!("page size must be positive -- set [ui].page_size to 1 or more");
        }
        if options.search_fields.is_empty() {
            bail!("no search fields configured -- list at least one in [ui].search_fields");
        }
        Ok(Self {
            leases: Vec::new(),
            search: String::new(),
            sort_key: LeaseField::LeaseName,
            sort_direction: SortDirection::Asc,
            page: 1,
            options,
            edit: None,
            sessions_opened: 0,
            refreshes_started: 0,
            status_line: None,
        })
    }

    pub fn leases(&self) -> &[Lease] {
        &self.leases
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn page_size(&self) -> usize {
        self.options.page_size
    }

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Filtered, sorted view over the whole collection.
    pub fn visible(&self) -> Vec<&Lease> {
        let mut view = filter(&self.leases, &self.search, &self.options.search_fields);
        sort(&mut view, self.sort_key, self.sort_direction);
        view
    }

    pub fn page_rows(&self) -> Vec<&Lease> {
        let view = self.visible();
        paginate(&view, self.page, self.options.page_size).to_vec()
    }

    pub fn page_count(&self) -> usize {
        page_count(self.visible().len(), self.options.page_size)
    }

    pub fn dispatch(&mut self, command: LeaseCommand) -> Vec<LeaseEvent> {
        match command {
            LeaseCommand::Search(term) => {
                self.search = term;
                self.page = 1;
                vec![self.view_changed()]
            }
            LeaseCommand::SortBy(key) => {
                if key == self.sort_key {
                    self.sort_direction = self.sort_direction.toggled();
                } else {
                    self.sort_key = key;
                    self.sort_direction = SortDirection::Asc;
                }
                vec![
                    LeaseEvent::SortChanged(self.sort_key, self.sort_direction),
                    self.view_changed(),
                ]
            }
            LeaseCommand::NextPage => self.go_to_page(self.page.saturating_add(1)),
            LeaseCommand::PrevPage => self.go_to_page(self.page.saturating_sub(1)),
            LeaseCommand::GoToPage(page) => self.go_to_page(page),
            LeaseCommand::Open(id) => self.open(&id),
            LeaseCommand::Cancel => self.close(),
            LeaseCommand::NextTab => self.with_session(|session| {
                Ok(vec![LeaseEvent::TabChanged(session.rotate_tab(1))])
            }),
            LeaseCommand::PrevTab => self.with_session(|session| {
                Ok(vec![LeaseEvent::TabChanged(session.rotate_tab(-1))])
            }),
            LeaseCommand::SelectTab(tab) => self.with_session(|session| {
                session.select_tab(tab);
                Ok(vec![LeaseEvent::TabChanged(tab)])
            }),
            LeaseCommand::SetField(field, value) => self.with_session(|session| {
                session.update_field(field, value)?;
                Ok(vec![LeaseEvent::WorkingChanged])
            }),
            LeaseCommand::AddTank => self.with_session(|session| {
                let index = session.add_tank()?;
                Ok(vec![
                    LeaseEvent::WorkingChanged,
                    LeaseEvent::TabChanged(EditTab::Tanks),
                    LeaseEvent::RowExpanded(NestedList::Tanks, Some(index)),
                ])
            }),
            LeaseCommand::AddWell => self.with_session(|session| {
                let index = session.add_well()?;
                Ok(vec![
                    LeaseEvent::WorkingChanged,
                    LeaseEvent::TabChanged(EditTab::Wells),
                    LeaseEvent::RowExpanded(NestedList::Wells, Some(index)),
                ])
            }),
            LeaseCommand::UpdateTank {
                index,
                field,
                value,
            } => self.with_session(|session| {
                session.update_tank(index, field, value)?;
                Ok(vec![LeaseEvent::WorkingChanged])
            }),
            LeaseCommand::UpdateWell {
                index,
                field,
                value,
            } => self.with_session(|session| {
                session.update_well(index, field, value)?;
                Ok(vec![LeaseEvent::WorkingChanged])
            }),
            LeaseCommand::ToggleExpanded(list, index) => self.with_session(|session| {
                let expanded = session.toggle_expanded(list, index)?;
                Ok(vec![LeaseEvent::RowExpanded(list, expanded)])
            }),
            LeaseCommand::DiscardDraft(list, index) => self.with_session(|session| {
                session.discard_draft(list, index)?;
                Ok(vec![LeaseEvent::WorkingChanged])
            }),
            LeaseCommand::DismissToast => self.with_session(|session| {
                Ok(if session.dismiss_toast() {
                    vec![LeaseEvent::ToastDismissed]
                } else {
                    Vec::new()
                })
            }),
            LeaseCommand::ClearStatus => {
                self.status_line = None;
                vec![LeaseEvent::StatusCleared]
            }
        }
    }

    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.refreshes_started += 1;
        RefreshToken(self.refreshes_started)
    }

    /// Adopt a fetched collection. Only the most recently started refresh is
    /// applied; a failed fetch keeps the previous collection.
    pub fn finish_refresh(
        &mut self,
        token: RefreshToken,
        fetched: Result<Vec<Lease>>,
    ) -> Vec<LeaseEvent> {
        if token.0 != self.refreshes_started {
            warn!(
                token = token.0,
                latest = self.refreshes_started,
                "dropping superseded lease refresh"
            );
            return Vec::new();
        }
        match fetched {
            Ok(leases) => {
                debug!(count = leases.len(), "lease collection refreshed");
                let count = leases.len();
                self.leases = leases;
                self.page = clamp_page(self.page, self.visible().len(), self.options.page_size);
                vec![LeaseEvent::Refreshed(count), self.view_changed()]
            }
            Err(error) => {
                error!("failed to load leases: {error:#}");
                vec![self.set_status(&format!("failed to load leases: {error:#}"))]
            }
        }
    }

    pub fn refresh(&mut self, runtime: &mut dyn LeaseRuntime) -> Vec<LeaseEvent> {
        let token = self.begin_refresh();
        let fetched = runtime.fetch_leases();
        self.finish_refresh(token, fetched)
    }

    /// Delete a persisted tank or well on the server, then apply the outcome
    /// to the open session.
    pub fn delete_nested(
        &mut self,
        runtime: &mut dyn LeaseRuntime,
        list: NestedList,
        uniq_id: &UniqId,
    ) -> Vec<LeaseEvent> {
        let request = match self.edit.as_ref() {
            None => return vec![self.set_status("no lease is open")],
            Some(session) => session.request_delete(list, uniq_id),
        };
        let request = match request {
            Ok(request) => request,
            Err(error) => return vec![self.set_status(&format!("{error:#}"))],
        };
        let outcome = runtime.delete_nested(&request);
        let Some(session) = self.edit.as_mut() else {
            return Vec::new();
        };
        match session.apply_delete(&request, outcome) {
            DeleteApplied::Removed => vec![
                LeaseEvent::NestedRemoved(list, request.uniq_id),
                LeaseEvent::WorkingChanged,
            ],
            DeleteApplied::InUse(message) => vec![LeaseEvent::ToastRaised(message)],
            DeleteApplied::Failed(_) | DeleteApplied::Stale => Vec::new(),
        }
    }

    /// Merge, submit and, on success, close the session and reload the list.
    /// A failed save leaves the session open.
    pub fn save(&mut self, runtime: &mut dyn LeaseRuntime) -> Vec<LeaseEvent> {
        let policy = self.options.nested_edits;
        let request = match self.edit.as_mut() {
            None => return vec![self.set_status("no lease is open")],
            Some(session) => session.begin_save(policy),
        };
        let request = match request {
            Ok(request) => request,
            Err(error) => return vec![self.set_status(&format!("{error:#}"))],
        };
        let lease_id = request.payload.id.clone();
        let result = runtime.save_lease(&request.payload);
        let Some(session) = self.edit.as_mut() else {
            return Vec::new();
        };
        match session.finish_save(request.token, result) {
            SaveApplied::Saved => {
                self.edit = None;
                let mut events = vec![
                    LeaseEvent::Saved(lease_id.clone()),
                    LeaseEvent::EditClosed,
                    self.set_status(&format!("lease {lease_id} saved")),
                ];
                events.extend(self.refresh(runtime));
                events
            }
            SaveApplied::Failed(message) => {
                error!(lease = %lease_id, "failed to save lease: {message}");
                vec![self.set_status(&format!("save failed: {message}"))]
            }
            SaveApplied::Stale => Vec::new(),
        }
    }

    fn open(&mut self, id: &LeaseId) -> Vec<LeaseEvent> {
        let Some(lease) = self.leases.iter().find(|lease| &lease.id == id) else {
            return vec![self.set_status(&format!("lease {id} not found"))];
        };
        self.sessions_opened += 1;
        let token = SessionToken::new(self.sessions_opened);
        self.edit = Some(EditSession::open(lease, token));
        vec![
            LeaseEvent::EditOpened(id.clone()),
            LeaseEvent::TabChanged(EditTab::Basic),
        ]
    }

    fn close(&mut self) -> Vec<LeaseEvent> {
        if self.edit.take().is_none() {
            return Vec::new();
        }
        vec![LeaseEvent::EditClosed, self.set_status("edit canceled")]
    }

    fn go_to_page(&mut self, page: usize) -> Vec<LeaseEvent> {
        self.page = clamp_page(page, self.visible().len(), self.options.page_size);
        vec![LeaseEvent::PageChanged(self.page)]
    }

    fn with_session(
        &mut self,
        action: impl FnOnce(&mut EditSession) -> Result<Vec<LeaseEvent>>,
    ) -> Vec<LeaseEvent> {
        let Some(session) = self.edit.as_mut() else {
            return vec![self.set_status("no lease is open")];
        };
        match action(session) {
            Ok(events) => events,
            Err(error) => {
                warn!("edit rejected: {error:#}");
                vec![self.set_status(&format!("{error:#}"))]
            }
        }
    }

    fn view_changed(&self) -> LeaseEvent {
        let matches = self.visible().len();
        LeaseEvent::ViewChanged {
            matches,
            page: self.page,
            pages: page_count(matches, self.options.page_size),
        }
    }

    fn set_status(&mut self, message: &str) -> LeaseEvent {
        self.status_line = Some(message.to_owned());
        LeaseEvent::StatusUpdated(message.to_owned())
    }
}
