// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::reconcile::Keyed;
use crate::{Lease, Tank, Well};

const FLAG_VALUES: [&str; 2] = ["Y", "N"];

/// Checks the edit form enforces before a lease is handed to the reconciler.
pub fn validate_lease(lease: &Lease) -> Result<()> {
    validate_scalars(lease)?;
    for (index, tank) in lease.tanks.iter().enumerate() {
        validate_tank(index, tank)?;
    }
    for (index, well) in lease.wells.iter().enumerate() {
        validate_well(index, well)?;
    }
    Ok(())
}

/// Checks a save payload against the copy it was loaded from.
///
/// Nested rows carried over unchanged from `original` are not checked. Drafts
/// and rows that differ from their original are.
pub fn validate_payload(payload: &Lease, original: &Lease) -> Result<()> {
    validate_scalars(payload)?;
    for (index, tank) in payload.tanks.iter().enumerate() {
        if !is_unchanged(tank, &original.tanks) {
            validate_tank(index, tank)?;
        }
    }
    for (index, well) in payload.wells.iter().enumerate() {
        if !is_unchanged(well, &original.wells) {
            validate_well(index, well)?;
        }
    }
    Ok(())
}

fn is_unchanged<T: Keyed + PartialEq>(row: &T, original: &[T]) -> bool {
    !row.uniq_id().is_draft()
        && original
            .iter()
            .any(|known| known.uniq_id() == row.uniq_id() && known == row)
}

fn validate_scalars(lease: &Lease) -> Result<()> {
    if lease.id.as_str().trim().is_empty() {
        bail!("lease id is missing -- reload the lease list and reopen the lease");
    }
    if lease.name.trim().is_empty() {
        bail!("lease name is required -- enter a name and retry");
    }
    if let Some(active) = lease.active.as_deref()
        && !active.is_empty()
        && !FLAG_VALUES.contains(&active)
    {
        bail!("lease active flag must be Y or N, got {active:?}");
    }
    Ok(())
}

fn validate_tank(index: usize, tank: &Tank) -> Result<()> {
    let position = index + 1;
    if tank.tank_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        bail!("tank {position} needs a tank id -- fill in Tank ID on the tanks tab and retry");
    }
    validate_flag("tank", position, tank.active.as_deref())
}

fn validate_well(index: usize, well: &Well) -> Result<()> {
    let position = index + 1;
    if well.well_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        bail!("well {position} needs a well id -- fill in Well ID on the wells tab and retry");
    }
    validate_flag("well", position, well.active.as_deref())
}

fn validate_flag(kind: &str, position: usize, active: Option<&str>) -> Result<()> {
    match active {
        Some(flag) if FLAG_VALUES.contains(&flag) => Ok(()),
        Some(flag) => bail!("{kind} {position} active flag must be Y or N, got {flag:?}"),
        None => bail!("{kind} {position} active flag is required -- choose Yes or No and retry"),
    }
}

/// Password change as entered on the profile screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub password: String,
    pub confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            bail!("new password is required -- enter a password and retry");
        }
        if self.password != self.confirm {
            bail!("passwords do not match -- re-enter the confirmation and retry");
        }
        Ok(())
    }
}
