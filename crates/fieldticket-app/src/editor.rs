// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Edit buffer for a single lease.
//!
//! An [`EditSession`] owns an immutable snapshot of the lease as loaded and a
//! working copy the form mutates. Server effects are split in two: a request
//! value produced from the session (bound to its token) and an apply step that
//! takes the outcome. Outcomes carrying a token other than the live session's
//! are dropped.

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::forms::validate_payload;
use crate::reconcile::{NestedEditPolicy, merge_with_policy, without_deleted};
use crate::{
    DeleteOutcome, EditTab, Lease, LeaseField, LeaseId, NestedList, Tank, TankField, UniqId, Well,
    WellField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Open,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub raised_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub token: SessionToken,
    pub lease_id: LeaseId,
    pub list: NestedList,
    pub uniq_id: UniqId,
}

impl DeleteRequest {
    /// `{"LeaseID": .., "Tanks": [{"UniqID": ..}]}` (or `Wells`).
    pub fn body(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("LeaseID".to_owned(), json!(self.lease_id));
        body.insert(
            self.list.wire_key().to_owned(),
            json!([{ "UniqID": self.uniq_id }]),
        );
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteApplied {
    Removed,
    InUse(String),
    Failed(String),
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub token: SessionToken,
    pub payload: Lease,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveApplied {
    Saved,
    Failed(String),
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    token: SessionToken,
    original: Lease,
    pub working: Lease,
    pub active_tab: EditTab,
    expanded_tank: Option<usize>,
    expanded_well: Option<usize>,
    phase: EditPhase,
    deleted: BTreeSet<(NestedList, UniqId)>,
    pub toast: Option<Toast>,
}

impl EditSession {
    pub fn open(lease: &Lease, token: SessionToken) -> Self {
        debug!(lease = %lease.id, token = token.get(), "edit session opened");
        Self {
            token,
            original: lease.clone(),
            working: lease.clone(),
            active_tab: EditTab::Basic,
            expanded_tank: None,
            expanded_well: None,
            phase: EditPhase::Open,
            deleted: BTreeSet::new(),
            toast: None,
        }
    }

    pub const fn token(&self) -> SessionToken {
        self.token
    }

    pub const fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn original(&self) -> &Lease {
        &self.original
    }

    pub const fn expanded(&self, list: NestedList) -> Option<usize> {
        match list {
            NestedList::Tanks => self.expanded_tank,
            NestedList::Wells => self.expanded_well,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.original != self.working
    }

    /// Dirty beyond deletions the server has already confirmed.
    pub fn has_unsaved_edits(&self) -> bool {
        without_deleted(self.original.clone(), &self.deleted) != self.working
    }

    pub fn select_tab(&mut self, tab: EditTab) {
        self.active_tab = tab;
    }

    pub fn rotate_tab(&mut self, delta: isize) -> EditTab {
        let tabs = EditTab::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        self.active_tab
    }

    pub fn update_field(&mut self, field: LeaseField, value: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        if !field.is_editable() {
            bail!("{} is read-only -- it cannot be changed here", field.wire_name());
        }
        self.working.set_field(field, value);
        Ok(())
    }

    /// Append a blank tank, expand it and switch to the tanks tab. Returns its
    /// index.
    pub fn add_tank(&mut self) -> Result<usize> {
        self.ensure_open()?;
        self.working.tanks.push(Tank::draft(&self.working.id));
        let index = self.working.tanks.len() - 1;
        self.expanded_tank = Some(index);
        self.active_tab = EditTab::Tanks;
        Ok(index)
    }

    pub fn add_well(&mut self) -> Result<usize> {
        self.ensure_open()?;
        self.working.wells.push(Well::draft(&self.working.id));
        let index = self.working.wells.len() - 1;
        self.expanded_well = Some(index);
        self.active_tab = EditTab::Wells;
        Ok(index)
    }

    pub fn update_tank(
        &mut self,
        index: usize,
        field: TankField,
        value: impl Into<String>,
    ) -> Result<()> {
        self.ensure_open()?;
        let count = self.working.tanks.len();
        let tank = self
            .working
            .tanks
            .get_mut(index)
            .ok_or_else(|| anyhow!("tank {index} out of range -- lease has {count} tanks"))?;
        *tank = tank.with_field(field, value);
        Ok(())
    }

    pub fn update_well(
        &mut self,
        index: usize,
        field: WellField,
        value: impl Into<String>,
    ) -> Result<()> {
        self.ensure_open()?;
        let count = self.working.wells.len();
        let well = self
            .working
            .wells
            .get_mut(index)
            .ok_or_else(|| anyhow!("well {index} out of range -- lease has {count} wells"))?;
        *well = well.with_field(field, value);
        Ok(())
    }

    /// Expand `index`, collapsing whatever row was expanded; toggling the
    /// expanded row collapses it.
    pub fn toggle_expanded(&mut self, list: NestedList, index: usize) -> Result<Option<usize>> {
        let count = self.working.nested_len(list);
        if index >= count {
            bail!(
                "{} {index} out of range -- lease has {count}",
                list.label().to_lowercase()
            );
        }
        let slot = self.expanded_slot(list);
        *slot = if *slot == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(*slot)
    }

    /// Drop an entity that was added in this session and never saved.
    pub fn discard_draft(&mut self, list: NestedList, index: usize) -> Result<()> {
        self.ensure_open()?;
        let is_draft = match list {
            NestedList::Tanks => self.working.tanks.get(index).map(|t| t.uniq_id.is_draft()),
            NestedList::Wells => self.working.wells.get(index).map(|w| w.uniq_id.is_draft()),
        };
        match is_draft {
            None => bail!("{} {index} out of range", list.label().to_lowercase()),
            Some(false) => bail!(
                "{} {index} is saved on the server -- delete it instead",
                list.label().to_lowercase()
            ),
            Some(true) => {}
        }
        match list {
            NestedList::Tanks => {
                self.working.tanks.remove(index);
            }
            NestedList::Wells => {
                self.working.wells.remove(index);
            }
        }
        self.shift_expanded(list, index);
        Ok(())
    }

    /// Build the server delete for a persisted tank or well.
    pub fn request_delete(&self, list: NestedList, uniq_id: &UniqId) -> Result<DeleteRequest> {
        self.ensure_open()?;
        if uniq_id.is_draft() {
            bail!(
                "{} has not been saved yet -- discard the draft instead",
                list.label().to_lowercase()
            );
        }
        if !self.working.nested_ids(list).contains(&uniq_id) {
            bail!(
                "{} {uniq_id} is not on lease {}",
                list.label().to_lowercase(),
                self.working.id
            );
        }
        Ok(DeleteRequest {
            token: self.token,
            lease_id: self.working.id.clone(),
            list,
            uniq_id: uniq_id.clone(),
        })
    }

    pub fn apply_delete(
        &mut self,
        request: &DeleteRequest,
        outcome: Result<DeleteOutcome>,
    ) -> DeleteApplied {
        if request.token != self.token {
            warn!(
                request = request.token.get(),
                live = self.token.get(),
                "dropping delete result for a closed edit session"
            );
            return DeleteApplied::Stale;
        }
        match outcome {
            Ok(DeleteOutcome::Deleted) => {
                self.remove_nested(request.list, &request.uniq_id);
                self.deleted
                    .insert((request.list, request.uniq_id.clone()));
                debug!(lease = %request.lease_id, uniq_id = %request.uniq_id, "nested entity deleted");
                DeleteApplied::Removed
            }
            Ok(DeleteOutcome::InUse { status }) => {
                let message = request.list.in_use_message();
                warn!(lease = %request.lease_id, uniq_id = %request.uniq_id, status, "delete refused");
                self.toast = Some(Toast {
                    message: message.clone(),
                    raised_at: OffsetDateTime::now_utc(),
                });
                DeleteApplied::InUse(message)
            }
            Err(error) => {
                warn!(lease = %request.lease_id, uniq_id = %request.uniq_id, "delete failed: {error:#}");
                DeleteApplied::Failed(format!("{error:#}"))
            }
        }
    }

    pub fn dismiss_toast(&mut self) -> bool {
        self.toast.take().is_some()
    }

    /// Produce the merged payload and validate it. The session
    /// stays in `Saving` until [`EditSession::finish_save`] runs.
    pub fn begin_save(&mut self, policy: NestedEditPolicy) -> Result<SaveRequest> {
        if self.phase == EditPhase::Saving {
            bail!("a save is already in flight -- wait for it to finish");
        }
        let merged = merge_with_policy(&self.original, &self.working, policy);
        let payload = without_deleted(merged, &self.deleted);
        validate_payload(&payload, &self.original)
            .with_context(|| format!("lease {} cannot be saved", self.working.id))?;
        self.phase = EditPhase::Saving;
        Ok(SaveRequest {
            token: self.token,
            payload,
        })
    }

    pub fn finish_save(&mut self, token: SessionToken, result: Result<()>) -> SaveApplied {
        if token != self.token {
            warn!(
                request = token.get(),
                live = self.token.get(),
                "dropping save result for a closed edit session"
            );
            return SaveApplied::Stale;
        }
        self.phase = EditPhase::Open;
        match result {
            Ok(()) => SaveApplied::Saved,
            Err(error) => SaveApplied::Failed(format!("{error:#}")),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.phase == EditPhase::Saving {
            bail!("lease {} is being saved -- wait for the save to finish", self.working.id);
        }
        Ok(())
    }

    fn expanded_slot(&mut self, list: NestedList) -> &mut Option<usize> {
        match list {
            NestedList::Tanks => &mut self.expanded_tank,
            NestedList::Wells => &mut self.expanded_well,
        }
    }

    fn remove_nested(&mut self, list: NestedList, uniq_id: &UniqId) {
        let position = match list {
            NestedList::Tanks => self.working.tanks.iter().position(|t| &t.uniq_id == uniq_id),
            NestedList::Wells => self.working.wells.iter().position(|w| &w.uniq_id == uniq_id),
        };
        let Some(index) = position else {
            return;
        };
        match list {
            NestedList::Tanks => {
                self.working.tanks.remove(index);
            }
            NestedList::Wells => {
                self.working.wells.remove(index);
            }
        }
        self.shift_expanded(list, index);
    }

    fn shift_expanded(&mut self, list: NestedList, removed: usize) {
        let slot = self.expanded_slot(list);
        *slot = match *slot {
            Some(index) if index == removed => None,
            Some(index) if index > removed => Some(index - 1),
            other => other,
        };
    }
}
