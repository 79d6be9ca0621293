// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ids::*;
use crate::query::Searchable;
use crate::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditTab {
    Basic,
    Additional,
    Tags,
    Tanks,
    Wells,
}

impl EditTab {
    pub const ALL: [Self; 5] = [
        Self::Basic,
        Self::Additional,
        Self::Tags,
        Self::Tanks,
        Self::Wells,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Additional => "additional",
            Self::Tags => "tags",
            Self::Tanks => "tanks",
            Self::Wells => "wells",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(Self::Basic),
            "additional" => Some(Self::Additional),
            "tags" => Some(Self::Tags),
            "tanks" => Some(Self::Tanks),
            "wells" => Some(Self::Wells),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NestedList {
    Tanks,
    Wells,
}

impl NestedList {
    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::Tanks => "Tanks",
            Self::Wells => "Wells",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tanks => "Tank",
            Self::Wells => "Well",
        }
    }

    pub const fn tab(self) -> EditTab {
        match self {
            Self::Tanks => EditTab::Tanks,
            Self::Wells => EditTab::Wells,
        }
    }

    pub fn in_use_message(self) -> String {
        format!("{} is currently being used", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseField {
    LeaseId,
    LeaseName,
    PumperId,
    ReliefId,
    Rrc,
    Active,
    District,
    Purchaser,
    PurchaserLeaseNo,
    PropertyNum,
    MaxPressure,
    MaxInj,
    Target,
    WellType,
    ShowOil,
    ShowGas,
    ShowWater,
    Tag1,
    Tag2,
    Tag3,
    Tag4,
}

impl LeaseField {
    pub const ALL: [Self; 21] = [
        Self::LeaseId,
        Self::LeaseName,
        Self::PumperId,
        Self::ReliefId,
        Self::Rrc,
        Self::Active,
        Self::District,
        Self::Purchaser,
        Self::PurchaserLeaseNo,
        Self::PropertyNum,
        Self::MaxPressure,
        Self::MaxInj,
        Self::Target,
        Self::WellType,
        Self::ShowOil,
        Self::ShowGas,
        Self::ShowWater,
        Self::Tag1,
        Self::Tag2,
        Self::Tag3,
        Self::Tag4,
    ];

    pub const DEFAULT_SEARCH: [Self; 4] =
        [Self::LeaseId, Self::LeaseName, Self::PumperId, Self::Rrc];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::LeaseId => "LeaseID",
            Self::LeaseName => "LeaseName",
            Self::PumperId => "PumperID",
            Self::ReliefId => "ReliefID",
            Self::Rrc => "RRC",
            Self::Active => "Active",
            Self::District => "District",
            Self::Purchaser => "Purchaser",
            Self::PurchaserLeaseNo => "PurchaserLeaseNo",
            Self::PropertyNum => "PropertyNum",
            Self::MaxPressure => "MaxPressure",
            Self::MaxInj => "MaxInj",
            Self::Target => "Target",
            Self::WellType => "WellType",
            Self::ShowOil => "ShowOil",
            Self::ShowGas => "ShowGas",
            Self::ShowWater => "ShowWater",
            Self::Tag1 => "Tag1",
            Self::Tag2 => "Tag2",
            Self::Tag3 => "Tag3",
            Self::Tag4 => "Tag4",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().eq_ignore_ascii_case(value))
    }

    pub const fn tab(self) -> EditTab {
        match self {
            Self::LeaseId
            | Self::LeaseName
            | Self::PumperId
            | Self::ReliefId
            | Self::Rrc
            | Self::Active => EditTab::Basic,
            Self::Tag1 | Self::Tag2 | Self::Tag3 | Self::Tag4 => EditTab::Tags,
            _ => EditTab::Additional,
        }
    }

    /// `LeaseID` keys the PATCH and `WellType` is server-derived.
    pub const fn is_editable(self) -> bool {
        !matches!(self, Self::LeaseId | Self::WellType)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TankField {
    TankId,
    Size,
    BblsPerInch,
    Active,
    TankType,
    GasCoeff,
    ExcludeDrawsFromProd,
    WpTankNum,
}

impl TankField {
    pub const ALL: [Self; 8] = [
        Self::TankId,
        Self::Size,
        Self::BblsPerInch,
        Self::Active,
        Self::TankType,
        Self::GasCoeff,
        Self::ExcludeDrawsFromProd,
        Self::WpTankNum,
    ];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::TankId => "TankID",
            Self::Size => "Size",
            Self::BblsPerInch => "BBLSperInch",
            Self::Active => "Active",
            Self::TankType => "TankType",
            Self::GasCoeff => "GasCoeff",
            Self::ExcludeDrawsFromProd => "ExcludeDrawsFromProd",
            Self::WpTankNum => "WPTankNum",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WellField {
    WellId,
    Active,
    PropertyNum,
    AllocPct,
    Api,
    Cp,
    Rrc,
    ExternalPropertyNumber,
}

impl WellField {
    pub const ALL: [Self; 8] = [
        Self::WellId,
        Self::Active,
        Self::PropertyNum,
        Self::AllocPct,
        Self::Api,
        Self::Cp,
        Self::Rrc,
        Self::ExternalPropertyNumber,
    ];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::WellId => "WellID",
            Self::Active => "Active",
            Self::PropertyNum => "PropertyNum",
            Self::AllocPct => "AllocPct",
            Self::Api => "API",
            Self::Cp => "CP",
            Self::Rrc => "RRC",
            Self::ExternalPropertyNumber => "ExternalPropertyNumber",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    #[serde(rename = "LeaseID", deserialize_with = "wire::required_string")]
    pub id: LeaseId,
    #[serde(rename = "LeaseName", deserialize_with = "wire::required_string")]
    pub name: String,
    #[serde(
        rename = "PumperID",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub pumper_id: Option<String>,
    #[serde(
        rename = "ReliefID",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub relief_id: Option<String>,
    #[serde(
        rename = "RRC",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub rrc: Option<String>,
    #[serde(
        rename = "Active",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<String>,
    #[serde(
        rename = "District",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub district: Option<String>,
    #[serde(
        rename = "Purchaser",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchaser: Option<String>,
    #[serde(
        rename = "PurchaserLeaseNo",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchaser_lease_no: Option<String>,
    #[serde(
        rename = "PropertyNum",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_num: Option<String>,
    #[serde(
        rename = "MaxPressure",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_pressure: Option<String>,
    #[serde(
        rename = "MaxInj",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_inj: Option<String>,
    #[serde(
        rename = "Target",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<String>,
    #[serde(
        rename = "WellType",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub well_type: Option<String>,
    #[serde(
        rename = "ShowOil",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_oil: Option<String>,
    #[serde(
        rename = "ShowGas",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_gas: Option<String>,
    #[serde(
        rename = "ShowWater",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_water: Option<String>,
    #[serde(
        rename = "Tag1",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag1: Option<String>,
    #[serde(
        rename = "Tag2",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag2: Option<String>,
    #[serde(
        rename = "Tag3",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag3: Option<String>,
    #[serde(
        rename = "Tag4",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag4: Option<String>,
    #[serde(rename = "Tanks", default, deserialize_with = "wire::list_or_null")]
    pub tanks: Vec<Tank>,
    #[serde(rename = "Wells", default, deserialize_with = "wire::list_or_null")]
    pub wells: Vec<Well>,
    /// Server attributes the client does not model; echoed back on save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Lease {
    pub fn new(id: impl Into<LeaseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pumper_id: None,
            relief_id: None,
            rrc: None,
            active: None,
            district: None,
            purchaser: None,
            purchaser_lease_no: None,
            property_num: None,
            max_pressure: None,
            max_inj: None,
            target: None,
            well_type: None,
            show_oil: None,
            show_gas: None,
            show_water: None,
            tag1: None,
            tag2: None,
            tag3: None,
            tag4: None,
            tanks: Vec::new(),
            wells: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn field(&self, field: LeaseField) -> Option<&str> {
        match field {
            LeaseField::LeaseId => Some(self.id.as_str()),
            LeaseField::LeaseName => Some(&self.name),
            other => self.optional_slot(other).and_then(Option::as_deref),
        }
    }

    /// An empty value clears an optional field.
    pub fn set_field(&mut self, field: LeaseField, value: impl Into<String>) {
        let value = value.into();
        match field {
            LeaseField::LeaseId => self.id = LeaseId::new(value),
            LeaseField::LeaseName => self.name = value,
            other => {
                if let Some(slot) = self.optional_slot_mut(other) {
                    *slot = (!value.is_empty()).then_some(value);
                }
            }
        }
    }

    pub fn nested_ids(&self, list: NestedList) -> Vec<&UniqId> {
        match list {
            NestedList::Tanks => self.tanks.iter().map(|tank| &tank.uniq_id).collect(),
            NestedList::Wells => self.wells.iter().map(|well| &well.uniq_id).collect(),
        }
    }

    pub fn nested_len(&self, list: NestedList) -> usize {
        match list {
            NestedList::Tanks => self.tanks.len(),
            NestedList::Wells => self.wells.len(),
        }
    }

    fn optional_slot(&self, field: LeaseField) -> Option<&Option<String>> {
        let slot = match field {
            LeaseField::PumperId => &self.pumper_id,
            LeaseField::ReliefId => &self.relief_id,
            LeaseField::Rrc => &self.rrc,
            LeaseField::Active => &self.active,
            LeaseField::District => &self.district,
            LeaseField::Purchaser => &self.purchaser,
            LeaseField::PurchaserLeaseNo => &self.purchaser_lease_no,
            LeaseField::PropertyNum => &self.property_num,
            LeaseField::MaxPressure => &self.max_pressure,
            LeaseField::MaxInj => &self.max_inj,
            LeaseField::Target => &self.target,
            LeaseField::WellType => &self.well_type,
            LeaseField::ShowOil => &self.show_oil,
            LeaseField::ShowGas => &self.show_gas,
            LeaseField::ShowWater => &self.show_water,
            LeaseField::Tag1 => &self.tag1,
            LeaseField::Tag2 => &self.tag2,
            LeaseField::Tag3 => &self.tag3,
            LeaseField::Tag4 => &self.tag4,
            LeaseField::LeaseId | LeaseField::LeaseName => return None,
        };
        Some(slot)
    }

    fn optional_slot_mut(&mut self, field: LeaseField) -> Option<&mut Option<String>> {
        let slot = match field {
            LeaseField::PumperId => &mut self.pumper_id,
            LeaseField::ReliefId => &mut self.relief_id,
            LeaseField::Rrc => &mut self.rrc,
            LeaseField::Active => &mut self.active,
            LeaseField::District => &mut self.district,
            LeaseField::Purchaser => &mut self.purchaser,
            LeaseField::PurchaserLeaseNo => &mut self.purchaser_lease_no,
            LeaseField::PropertyNum => &mut self.property_num,
            LeaseField::MaxPressure => &mut self.max_pressure,
            LeaseField::MaxInj => &mut self.max_inj,
            LeaseField::Target => &mut self.target,
            LeaseField::WellType => &mut self.well_type,
            LeaseField::ShowOil => &mut self.show_oil,
            LeaseField::ShowGas => &mut self.show_gas,
            LeaseField::ShowWater => &mut self.show_water,
            LeaseField::Tag1 => &mut self.tag1,
            LeaseField::Tag2 => &mut self.tag2,
            LeaseField::Tag3 => &mut self.tag3,
            LeaseField::Tag4 => &mut self.tag4,
            LeaseField::LeaseId | LeaseField::LeaseName => return None,
        };
        Some(slot)
    }
}

impl Searchable for Lease {
    type Field = LeaseField;

    fn field_value(&self, field: LeaseField) -> Option<&str> {
        self.field(field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    #[serde(rename = "UniqID", default)]
    pub uniq_id: UniqId,
    #[serde(rename = "LeaseID", default)]
    pub lease_id: LeaseId,
    #[serde(
        rename = "TankID",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tank_id: Option<String>,
    #[serde(
        rename = "Size",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,
    #[serde(
        rename = "BBLSperInch",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bbls_per_inch: Option<String>,
    #[serde(
        rename = "Active",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<String>,
    #[serde(
        rename = "TankType",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tank_type: Option<String>,
    #[serde(
        rename = "GasCoeff",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_coeff: Option<String>,
    #[serde(
        rename = "ExcludeDrawsFromProd",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_draws_from_prod: Option<String>,
    #[serde(
        rename = "WPTankNum",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub wp_tank_num: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Tank {
    /// Blank tank for `lease`, matching the defaults the server expects for a
    /// new row.
    pub fn draft(lease: &LeaseId) -> Self {
        Self {
            uniq_id: UniqId::default(),
            lease_id: lease.clone(),
            tank_id: Some(String::new()),
            size: Some(String::new()),
            bbls_per_inch: Some(String::new()),
            active: Some("Y".to_owned()),
            tank_type: Some("T".to_owned()),
            gas_coeff: Some(String::new()),
            exclude_draws_from_prod: Some("N".to_owned()),
            wp_tank_num: Some(String::new()),
            extra: BTreeMap::new(),
        }
    }

    pub fn field(&self, field: TankField) -> Option<&str> {
        match field {
            TankField::TankId => self.tank_id.as_deref(),
            TankField::Size => self.size.as_deref(),
            TankField::BblsPerInch => self.bbls_per_inch.as_deref(),
            TankField::Active => self.active.as_deref(),
            TankField::TankType => self.tank_type.as_deref(),
            TankField::GasCoeff => self.gas_coeff.as_deref(),
            TankField::ExcludeDrawsFromProd => self.exclude_draws_from_prod.as_deref(),
            TankField::WpTankNum => self.wp_tank_num.as_deref(),
        }
    }

    /// Copy of this tank carrying `value` in `field`.
    pub fn with_field(&self, field: TankField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let slot = match field {
            TankField::TankId => &mut next.tank_id,
            TankField::Size => &mut next.size,
            TankField::BblsPerInch => &mut next.bbls_per_inch,
            TankField::Active => &mut next.active,
            TankField::TankType => &mut next.tank_type,
            TankField::GasCoeff => &mut next.gas_coeff,
            TankField::ExcludeDrawsFromProd => &mut next.exclude_draws_from_prod,
            TankField::WpTankNum => &mut next.wp_tank_num,
        };
        *slot = Some(value.into());
        next
    }
}

impl Searchable for Tank {
    type Field = TankField;

    fn field_value(&self, field: TankField) -> Option<&str> {
        self.field(field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    #[serde(rename = "UniqID", default)]
    pub uniq_id: UniqId,
    #[serde(rename = "LeaseID", default)]
    pub lease_id: LeaseId,
    #[serde(
        rename = "WellID",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub well_id: Option<String>,
    #[serde(
        rename = "Active",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<String>,
    #[serde(
        rename = "PropertyNum",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_num: Option<String>,
    #[serde(
        rename = "AllocPct",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub alloc_pct: Option<String>,
    #[serde(
        rename = "API",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub api: Option<String>,
    #[serde(
        rename = "CP",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cp: Option<String>,
    #[serde(
        rename = "RRC",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub rrc: Option<String>,
    #[serde(
        rename = "ExternalPropertyNumber",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_property_number: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Well {
    pub fn draft(lease: &LeaseId) -> Self {
        Self {
            uniq_id: UniqId::default(),
            lease_id: lease.clone(),
            well_id: Some(String::new()),
            active: Some("Y".to_owned()),
            property_num: Some(String::new()),
            alloc_pct: Some(String::new()),
            api: None,
            cp: None,
            rrc: None,
            external_property_number: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn field(&self, field: WellField) -> Option<&str> {
        match field {
            WellField::WellId => self.well_id.as_deref(),
            WellField::Active => self.active.as_deref(),
            WellField::PropertyNum => self.property_num.as_deref(),
            WellField::AllocPct => self.alloc_pct.as_deref(),
            WellField::Api => self.api.as_deref(),
            WellField::Cp => self.cp.as_deref(),
            WellField::Rrc => self.rrc.as_deref(),
            WellField::ExternalPropertyNumber => self.external_property_number.as_deref(),
        }
    }

    pub fn with_field(&self, field: WellField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let slot = match field {
            WellField::WellId => &mut next.well_id,
            WellField::Active => &mut next.active,
            WellField::PropertyNum => &mut next.property_num,
            WellField::AllocPct => &mut next.alloc_pct,
            WellField::Api => &mut next.api,
            WellField::Cp => &mut next.cp,
            WellField::Rrc => &mut next.rrc,
            WellField::ExternalPropertyNumber => &mut next.external_property_number,
        };
        *slot = Some(value.into());
        next
    }
}

impl Searchable for Well {
    type Field = WellField;

    fn field_value(&self, field: WellField) -> Option<&str> {
        self.field(field)
    }
}

/// Result of a server-side nested delete that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The server refused because the entity is referenced elsewhere.
    InUse { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Pumper,
    Operator,
    Admin,
    Partner,
}

impl UserRole {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pumper => "P",
            Self::Operator => "O",
            Self::Admin => "A",
            Self::Partner => "I",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "P" => Some(Self::Pumper),
            "O" => Some(Self::Operator),
            "A" => Some(Self::Admin),
            "I" => Some(Self::Partner),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pumper => "Pumper",
            Self::Operator => "Operator",
            Self::Admin => "Admin",
            Self::Partner => "Partner",
        }
    }
}

/// Option row from `usertags.php`; one endpoint serves both tags and users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTag {
    #[serde(
        rename = "UserID",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    #[serde(
        rename = "FullName",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_name: Option<String>,
    #[serde(
        rename = "Role",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(
        rename = "TagID",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag_id: Option<String>,
    #[serde(
        rename = "TagDesc",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag_desc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileField {
    Email,
    Phone,
}

impl ProfileField {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    #[serde(rename = "UserID", deserialize_with = "wire::required_string")]
    pub user_id: UserId,
    #[serde(
        rename = "FullName",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_name: Option<String>,
    #[serde(
        rename = "Email",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        rename = "Phone",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        rename = "Role",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(
        rename = "Message",
        default,
        deserialize_with = "wire::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UserDetails {
    pub fn role_label(&self) -> &'static str {
        self.role
            .as_deref()
            .and_then(UserRole::parse)
            .map_or("", UserRole::label)
    }

    pub fn field(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Email => self.email.as_deref(),
            ProfileField::Phone => self.phone.as_deref(),
        }
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
        };
        *slot = Some(value.into());
    }
}
