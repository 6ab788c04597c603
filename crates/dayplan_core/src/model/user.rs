use serde::{Deserialize, Serialize};

/// Avatar shown when a user never uploaded a profile image.
pub const PLACEHOLDER_PROFILE_IMAGE: &str =
    "https://placehold.co/100x100/4B6CB7/FFFFFF?text=User";

/// Local account record. Owned by the auth collaborator; managers only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl User {
    /// Profile image URL, falling back to the placeholder avatar.
    pub fn avatar(&self) -> &str {
        self.profile_image
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(PLACEHOLDER_PROFILE_IMAGE)
    }
}
