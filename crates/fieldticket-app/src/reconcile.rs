// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Merge-on-save for a lease's nested tanks and wells.
//!
//! The save payload takes every scalar from the working copy. Nested lists
//! start from the original snapshot and append the working entities whose
//! `UniqID` the snapshot does not know. Under the default policy, edits made
//! to already-persisted tanks or wells are not forwarded by this path; they
//! keep the values from the snapshot. Nothing here removes an entity: removal
//! only happens through an explicit delete call against the server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{Lease, NestedList, UniqId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NestedEditPolicy {
    /// Existing entities come from the original snapshot.
    #[default]
    NewOnly,
    /// Existing entities come from the working copy when it still has them.
    IncludeEdits,
}

/// Nested entity with a stable identity.
pub trait Keyed {
    fn uniq_id(&self) -> &UniqId;
}

impl Keyed for crate::Tank {
    fn uniq_id(&self) -> &UniqId {
        &self.uniq_id
    }
}

impl Keyed for crate::Well {
    fn uniq_id(&self) -> &UniqId {
        &self.uniq_id
    }
}

pub fn merge(original: &Lease, working: &Lease) -> Lease {
    merge_with_policy(original, working, NestedEditPolicy::NewOnly)
}

pub fn merge_with_policy(original: &Lease, working: &Lease, policy: NestedEditPolicy) -> Lease {
    let mut payload = working.clone();
    payload.tanks = merge_list(&original.tanks, &working.tanks, policy);
    payload.wells = merge_list(&original.wells, &working.wells, policy);
    payload
}

/// `original ++ working.filter(id not in original)`, by `UniqID` identity.
pub fn merge_list<T: Keyed + Clone>(
    original: &[T],
    working: &[T],
    policy: NestedEditPolicy,
) -> Vec<T> {
    let known: BTreeSet<&UniqId> = original.iter().map(Keyed::uniq_id).collect();

    let mut merged: Vec<T> = original
        .iter()
        .map(|entity| match policy {
            NestedEditPolicy::NewOnly => entity.clone(),
            NestedEditPolicy::IncludeEdits => working
                .iter()
                .find(|candidate| candidate.uniq_id() == entity.uniq_id())
                .unwrap_or(entity)
                .clone(),
        })
        .collect();

    merged.extend(
        working
            .iter()
            .filter(|entity| !known.contains(entity.uniq_id()))
            .cloned(),
    );
    merged
}

/// Drop entities the server already confirmed as deleted so a save does not
/// send them back.
pub fn without_deleted(mut payload: Lease, deleted: &BTreeSet<(NestedList, UniqId)>) -> Lease {
    if deleted.is_empty() {
        return payload;
    }
    payload
        .tanks
        .retain(|tank| !deleted.contains(&(NestedList::Tanks, tank.uniq_id.clone())));
    payload
        .wells
        .retain(|well| !deleted.contains(&(NestedList::Wells, well.uniq_id.clone())));
    payload
}
