// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{TagId, UserId, UserRole, UserTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOption {
    pub id: TagId,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOption {
    pub id: UserId,
    pub full_name: String,
}

/// Select options for the lease form, split out of the combined user/tag
/// listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSets {
    pub tags: Vec<TagOption>,
    pub pumpers: Vec<UserOption>,
    pub relief: Vec<UserOption>,
}

impl OptionSets {
    pub fn from_tags(rows: &[UserTag]) -> Self {
        let tags = rows
            .iter()
            .filter_map(|row| {
                let id = non_empty(row.tag_id.as_deref())?;
                let description = non_empty(row.tag_desc.as_deref())?;
                Some(TagOption {
                    id: TagId::from(id),
                    description: description.to_owned(),
                })
            })
            .collect();

        let pumpers: Vec<UserOption> = rows
            .iter()
            .filter(|row| row.role.as_deref() == Some(UserRole::Pumper.code()))
            .filter_map(|row| {
                let id = non_empty(row.user_id.as_deref())?;
                Some(UserOption {
                    id: UserId::from(id),
                    full_name: row.full_name.clone().unwrap_or_default(),
                })
            })
            .collect();

        Self {
            tags,
            relief: pumpers.clone(),
            pumpers,
        }
    }

    pub fn pumper_name(&self, id: &str) -> Option<&str> {
        self.pumpers
            .iter()
            .find(|option| option.id.as_str() == id)
            .map(|option| option.full_name.as_str())
    }

    pub fn tag_description(&self, id: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|option| option.id.as_str() == id)
            .map(|option| option.description.as_str())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
