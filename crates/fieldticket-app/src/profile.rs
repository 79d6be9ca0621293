// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use tracing::warn;

use crate::forms::PasswordChange;
use crate::{ProfileField, UserDetails, UserId};

/// Body of a password change: only the user id and the new secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordUpdate {
    #[serde(rename = "UserID")]
    pub user_id: UserId,
    #[serde(rename = "Sec")]
    pub secret: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEditor {
    loaded: Option<UserDetails>,
    edited: Option<UserDetails>,
    pub password: PasswordChange,
}

impl ProfileEditor {
    pub fn load(&mut self, user: UserDetails) {
        self.loaded = Some(user);
        self.edited = None;
    }

    pub fn user(&self) -> Option<&UserDetails> {
        self.loaded.as_ref()
    }

    pub fn edited(&self) -> Option<&UserDetails> {
        self.edited.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.edited.is_some()
    }

    pub fn begin_edit(&mut self) -> Result<()> {
        let user = self
            .loaded
            .as_ref()
            .ok_or_else(|| anyhow!("profile is not loaded -- sign in and reload"))?;
        self.edited = Some(user.clone());
        Ok(())
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) -> Result<()> {
        let edited = self
            .edited
            .as_mut()
            .ok_or_else(|| anyhow!("profile is not in edit mode -- start editing first"))?;
        edited.set_field(field, value);
        Ok(())
    }

    /// Drop unsaved profile edits.
    pub fn cancel(&mut self) {
        self.edited = None;
    }

    /// The edited copy to PATCH.
    pub fn begin_save(&self) -> Result<UserDetails> {
        self.edited
            .clone()
            .ok_or_else(|| anyhow!("profile is not in edit mode -- nothing to save"))
    }

    /// Adopt `saved` once the server reports success.
    pub fn finish_save(&mut self, saved: UserDetails, accepted: Result<bool>) -> Result<()> {
        let accepted = accepted.context("update profile")?;
        if !accepted {
            warn!(user = %saved.user_id, "profile update rejected by server");
            bail!("server rejected the profile update -- check the fields and retry");
        }
        self.loaded = Some(saved);
        self.edited = None;
        Ok(())
    }

    pub fn begin_password_change(&self) -> Result<PasswordUpdate> {
        let user = self
            .loaded
            .as_ref()
            .ok_or_else(|| anyhow!("profile is not loaded -- sign in and reload"))?;
        self.password.validate()?;
        Ok(PasswordUpdate {
            user_id: user.user_id.clone(),
            secret: self.password.password.clone(),
        })
    }

    pub fn finish_password_change(&mut self, accepted: Result<bool>) -> Result<()> {
        let accepted = accepted.context("change password")?;
        if !accepted {
            bail!("server rejected the password change -- try a different password");
        }
        self.password = PasswordChange::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ProfileEditor;
    use crate::{ProfileField, UserDetails};
    use anyhow::{Result, anyhow};

    fn user() -> Result<UserDetails> {
        Ok(serde_json::from_value(serde_json::json!({
            "UserID": "u7",
            "FullName": "Pat Doe",
            "Email": "pat@example.com",
            "Phone": "555-0100",
            "Role": "O"
        }))?)
    }

    #[test]
    fn edit_then_cancel_restores_loaded_copy() -> Result<()> {
        let mut editor = ProfileEditor::default();
        assert!(editor.begin_edit().is_err());

        editor.load(user()?);
        editor.begin_edit()?;
        editor.set_field(ProfileField::Phone, "555-0199")?;
        assert_eq!(
            editor.edited().and_then(|u| u.field(ProfileField::Phone)),
            Some("555-0199")
        );

        editor.cancel();
        assert!(!editor.is_editing());
        assert_eq!(
            editor.user().and_then(|u| u.field(ProfileField::Phone)),
            Some("555-0100")
        );
        assert!(editor.set_field(ProfileField::Email, "x").is_err());
        Ok(())
    }

    #[test]
    fn save_adopts_edits_only_on_success() -> Result<()> {
        let mut editor = ProfileEditor::default();
        editor.load(user()?);
        editor.begin_edit()?;
        editor.set_field(ProfileField::Email, "new@example.com")?;

        let edited = editor.begin_save()?;
        assert!(editor.finish_save(edited.clone(), Ok(false)).is_err());
        assert!(editor.is_editing());
        assert!(
            editor
                .finish_save(edited.clone(), Err(anyhow!("timed out")))
                .is_err()
        );

        editor.finish_save(edited, Ok(true))?;
        assert!(!editor.is_editing());
        assert_eq!(
            editor.user().and_then(|u| u.field(ProfileField::Email)),
            Some("new@example.com")
        );
        assert_eq!(editor.user().map(UserDetails::role_label), Some("Operator"));
        Ok(())
    }

    #[test]
    fn password_change_validates_and_clears() -> Result<()> {
        let mut editor = ProfileEditor::default();
        editor.load(user()?);
        editor.password.password = "s3cret".to_owned();
        editor.password.confirm = "s3cre".to_owned();
        assert!(editor.begin_password_change().is_err());

        editor.password.confirm = "s3cret".to_owned();
        let update = editor.begin_password_change()?;
        assert_eq!(
            serde_json::to_value(&update)?,
            serde_json::json!({"UserID": "u7", "Sec": "s3cret"})
        );

        editor.finish_password_change(Ok(true))?;
        assert!(editor.password.password.is_empty());
        assert!(editor.password.confirm.is_empty());
        Ok(())
    }
}
