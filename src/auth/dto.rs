use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;

/// Request body for signup and login. Fields are optional so that a missing
/// field is reported as a validation error rather than a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Returns `(email, password)` when both are present and non-empty.
    pub fn require(self) -> Option<(String, String)> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub profile_setup: bool,
    #[serde(flatten)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub color: Option<String>,
}

impl PublicUser {
    /// View returned by signup: no profile fields exist yet.
    pub fn summary(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            profile_setup: user.profile_setup,
            profile: None,
        }
    }

    /// View returned by login, including the profile fields.
    pub fn with_profile(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            profile_setup: user.profile_setup,
            profile: Some(Profile {
                first_name: user.first_name,
                last_name: user.last_name,
                image: user.image,
                color: user.color,
            }),
        }
    }
}
