//! User profiles and the blank profile template.
//!
//! A profile template is a tree of named fields. Branches are JSON objects;
//! leaves are scalar values, and a leaf that is `null` or an empty string is
//! a placeholder still waiting for an answer. `ProfileNode` keeps the key
//! order of the file so the interview asks questions in template order.

use crate::constants::{PERSONAL_INFO_KEY, USER_NAME_KEY};
use crate::errors::{AppResult, ProfileError};
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One node of a profile tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileNode {
    /// A nested group of fields.
    Branch(IndexMap<String, ProfileNode>),
    /// A single field value.
    Leaf(Value),
}

impl Default for ProfileNode {
    fn default() -> Self {
        ProfileNode::Branch(IndexMap::new())
    }
}

impl ProfileNode {
    /// Returns true for a leaf that has not been filled in yet.
    pub fn is_placeholder(&self) -> bool {
        match self {
            ProfileNode::Leaf(Value::Null) => true,
            ProfileNode::Leaf(Value::String(s)) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            ProfileNode::Leaf(_) => 1,
            ProfileNode::Branch(children) => children.values().map(ProfileNode::leaf_count).sum(),
        }
    }

    /// Number of placeholder leaves that an interview would ask about.
    ///
    /// Fields named `user_name` are supplied externally and not counted.
    pub fn open_question_count(&self) -> usize {
        match self {
            ProfileNode::Leaf(_) => usize::from(self.is_placeholder()),
            ProfileNode::Branch(children) => children
                .iter()
                .filter(|(key, _)| key.as_str() != USER_NAME_KEY)
                .map(|(_, child)| child.open_question_count())
                .sum(),
        }
    }

    /// Returns true when no placeholder leaf is left (ignoring `user_name`).
    pub fn is_complete(&self) -> bool {
        self.open_question_count() == 0
    }

    /// Returns true when both trees have the same keys at the same places.
    pub fn same_shape(&self, other: &ProfileNode) -> bool {
        match (self, other) {
            (ProfileNode::Leaf(_), ProfileNode::Leaf(_)) => true,
            (ProfileNode::Branch(a), ProfileNode::Branch(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| {
                        ka == kb && va.same_shape(vb)
                    })
            }
            _ => false,
        }
    }

    /// Looks up a nested field by path.
    pub fn get_path(&self, path: &[&str]) -> Option<&ProfileNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => match self {
                ProfileNode::Branch(children) => children.get(*head)?.get_path(rest),
                ProfileNode::Leaf(_) => None,
            },
        }
    }
}

/// Reads a `null` field as the type's default, so templates may leave
/// top-level placeholders as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status metadata written when a profile is (re)built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStatus {
    /// RFC 3339 timestamp of the last rebuild; empty in the blank template.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated: String,
    /// Free-text status summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

/// A user's profile, as stored in `<user>_profile.json`.
///
/// Top-level template sections other than `user_name`, `personal_info` and
/// `status` are kept as they are in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default)]
    pub personal_info: ProfileNode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProfileStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Loads a blank profile template.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not JSON, or has no
    /// `personal_info` object.
    pub fn load_template(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;

        let malformed = |reason: &str| ProfileError::MalformedTemplate {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let object = value
            .as_object()
            .ok_or_else(|| malformed("top level must be an object"))?;
        match object.get(PERSONAL_INFO_KEY) {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(malformed("'personal_info' must be an object").into()),
            None => return Err(malformed("missing 'personal_info'").into()),
        }

        serde_json::from_value(value).map_err(|e| malformed(&e.to_string()).into())
    }

    /// Stamps identity and status after a completed interview.
    pub fn mark_collected(&mut self, user_name: &str, summary: &str, now: DateTime<Local>) {
        self.user_name = user_name.to_string();
        self.status.last_updated = now.to_rfc3339();
        self.status.summary = summary.to_string();
    }
}

/// Checks that a user name can be used as a directory and file name.
///
/// # Errors
///
/// Returns `ProfileError::InvalidUserName` for empty names, names with path
/// separators or control characters, and names starting with a dot.
pub fn validate_user_name(user_name: &str) -> Result<&str, ProfileError> {
    let invalid = || ProfileError::InvalidUserName(user_name.to_string());

    if user_name.trim().is_empty() || user_name != user_name.trim() {
        return Err(invalid());
    }
    if user_name.starts_with('.') {
        return Err(invalid());
    }
    if user_name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(invalid());
    }

    Ok(user_name)
}
