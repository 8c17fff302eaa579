// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

/// Opaque identifier of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

opaque_id!(PostId);
opaque_id!(ViewerId);

/// Row of the `post_likes` relation; existence means "viewer likes post".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MembershipRow {
    pub user_id: ViewerId,
    pub post_id: PostId,
}

/// `GET /auth/v1/user` response, trimmed to what we read.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthUser {
    pub id: ViewerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let row = MembershipRow {
            user_id: ViewerId::new("u1"),
            post_id: "p1".into(),
        };
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"user_id":"u1","post_id":"p1"}"#
        );
        assert_eq!(PostId::new("p1").to_string(), "p1");
    }
}
