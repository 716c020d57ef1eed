//! Flat-file storage for user profiles and session logs.
//!
//! Everything lives under one users root:
//!
//! ```text
//! <users-root>/
//!   blank_profile.json                      shared template (read-only)
//!   <user>/<user>_profile.json              profile
//!   <user>/logs/thread_log_<timestamp>.json one file per session
//! ```

use crate::ai::Message;
use crate::constants::{
    LOGS_SUBDIR, PROFILE_FILE_SUFFIX, SESSION_LOG_PREFIX, SESSION_LOG_TIMESTAMP_FORMAT,
};
use crate::errors::{AppError, AppResult, ProfileError};
use crate::profile::{validate_user_name, UserProfile};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Record of one finished chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    /// `<user>_<thread date with underscores>`
    pub thread_name: String,
    /// Remote thread id; `None` when no turn ever created a thread.
    pub thread_id: Option<String>,
    /// Assistant that answered the session.
    pub assistant_id: String,
    /// Session start, `%Y-%m-%d %H:%M:%S`.
    pub thread_date: String,
    /// The transcript, oldest turn first.
    pub chat: Vec<Message>,
    /// Model-written summary, when summarization is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl SessionLog {
    /// Builds the session name from the user and the session date.
    pub fn thread_name_for(user_name: &str, thread_date: &str) -> String {
        format!("{}_{}", user_name, thread_date.replace(' ', "_"))
    }
}

/// Storage rooted at the users directory.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    users_root: PathBuf,
}

impl ProfileStore {
    /// Creates a store; nothing is touched on disk until something is written.
    pub fn new(users_root: impl Into<PathBuf>) -> Self {
        Self {
            users_root: users_root.into(),
        }
    }

    /// Root directory of all users.
    pub fn users_root(&self) -> &Path {
        &self.users_root
    }

    /// Directory owned by one user.
    pub fn user_dir(&self, user_name: &str) -> AppResult<PathBuf> {
        let user_name = validate_user_name(user_name)?;
        Ok(self.users_root.join(user_name))
    }

    /// `<users-root>/<user>/<user>_profile.json`
    pub fn profile_path(&self, user_name: &str) -> AppResult<PathBuf> {
        let dir = self.user_dir(user_name)?;
        Ok(dir.join(format!("{}{}", user_name, PROFILE_FILE_SUFFIX)))
    }

    /// `<users-root>/<user>/logs/thread_log_<timestamp>.json`
    pub fn session_log_path(&self, user_name: &str, at: DateTime<Local>) -> AppResult<PathBuf> {
        let dir = self.user_dir(user_name)?.join(LOGS_SUBDIR);
        Ok(dir.join(format!(
            "{}{}.json",
            SESSION_LOG_PREFIX,
            at.format(SESSION_LOG_TIMESTAMP_FORMAT)
        )))
    }

    /// Returns true when the user already has a profile file.
    pub fn has_profile(&self, user_name: &str) -> AppResult<bool> {
        Ok(self.profile_path(user_name)?.is_file())
    }

    /// Loads a user's profile, or `None` when the user has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the file cannot be read, or
    /// its contents are not a profile.
    pub fn load_profile(&self, user_name: &str) -> AppResult<Option<UserProfile>> {
        let path = self.profile_path(user_name)?;
        if !path.is_file() {
            debug!("No profile file for user at {:?}", path);
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)?;
        let profile = serde_json::from_str::<UserProfile>(&raw).map_err(|e| {
            ProfileError::MalformedProfile {
                user: user_name.to_string(),
                reason: e.to_string(),
            }
        })?;
        info!("Loaded existing profile");
        Ok(Some(profile))
    }

    /// Writes a profile, replacing any previous one.
    ///
    /// The owner is taken from `profile.user_name`.
    pub fn save_profile(&self, profile: &UserProfile) -> AppResult<PathBuf> {
        let path = self.profile_path(&profile.user_name)?;
        write_json(&path, profile)?;
        info!("Saved profile to {:?}", path);
        Ok(path)
    }

    /// Writes a session log and returns its path.
    ///
    /// Existing logs are never replaced: when a log for the same second
    /// already exists, `_2`, `_3`, ... is appended to the file stem.
    pub fn save_session_log(
        &self,
        user_name: &str,
        log: &SessionLog,
        at: DateTime<Local>,
    ) -> AppResult<PathBuf> {
        let base = self.session_log_path(user_name, at)?;
        if let Some(parent) = base.parent() {
            ensure_directory_exists(parent)?;
        }

        let mut attempt: u32 = 1;
        let (path, file) = loop {
            let path = numbered_path(&base, attempt);
            match open_private(&path, true) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Session log {:?} already exists", path);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };
        write_pretty(file, log)?;
        info!("Saved session log with {} turns to {:?}", log.chat.len(), path);
        Ok(path)
    }

    /// Reads a session log back.
    pub fn load_session_log(path: &Path) -> AppResult<SessionLog> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Creates a directory and its parents, owner-only on unix.
pub fn ensure_directory_exists(dir: &Path) -> AppResult<()> {
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", dir.display(), e),
        ))
    })?;

    #[cfg(unix)]
    {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        debug!("Set 0o700 permissions on {:?}", dir);
    }

    Ok(())
}

/// `base` for the first attempt, `<stem>_<n>.json` after that.
fn numbered_path(base: &Path, attempt: u32) -> PathBuf {
    if attempt <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.with_file_name(format!("{}_{}.json", stem, attempt))
}

/// Opens `path` for writing, owner-only on unix.
///
/// With `create_new` the call fails with `AlreadyExists` instead of
/// truncating an existing file.
fn open_private(path: &Path, create_new: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    let file = options.open(path)?;

    #[cfg(unix)]
    {
        let mut permissions = file.metadata()?.permissions();
        permissions.set_mode(0o600);
        file.set_permissions(permissions)?;
    }
    Ok(file)
}

/// Pretty-prints `value` to `path`, creating parent directories.
fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        ensure_directory_exists(parent)?;
    }
    write_pretty(open_private(path, false)?, value)
}

fn write_pretty<T: Serialize>(file: File, value: &T) -> AppResult<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_paths_follow_layout() {
        let store = ProfileStore::new("/data/users");
        assert_eq!(
            store.profile_path("alice").unwrap(),
            PathBuf::from("/data/users/alice/alice_profile.json")
        );
        assert_eq!(
            store.session_log_path("alice", fixed_time()).unwrap(),
            PathBuf::from("/data/users/alice/logs/thread_log_20240305-140709.json")
        );
    }

    #[test]
    fn test_invalid_user_name_never_reaches_the_filesystem() {
        let store = ProfileStore::new("/data/users");
        let result = store.profile_path("../outside");
        assert!(matches!(
            result,
            Err(AppError::Profile(ProfileError::InvalidUserName(_)))
        ));
    }

    #[test]
    fn test_load_missing_profile_is_none() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        assert!(store.load_profile("bob").unwrap().is_none());
        assert!(!store.has_profile("bob").unwrap());
    }

    #[test]
    fn test_save_then_load_profile() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("users"));

        let mut profile: UserProfile = serde_json::from_value(serde_json::json!({
            "user_name": "",
            "personal_info": {"age": "31", "work": {"role": "nurse"}},
            "status": {"last_updated": "", "summary": ""}
        }))
        .unwrap();
        profile.mark_collected("alice", "Personal information collected", fixed_time());

        let path = store.save_profile(&profile).unwrap();
        assert!(path.ends_with("alice/alice_profile.json"));
        assert!(store.has_profile("alice").unwrap());

        let loaded = store.load_profile("alice").unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_corrupt_profile_is_an_error() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let path = store.profile_path("carol").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2, 3]").unwrap();

        let result = store.load_profile("carol");
        assert!(matches!(
            result,
            Err(AppError::Profile(ProfileError::MalformedProfile { .. }))
        ));
    }

    #[test]
    fn test_session_log_round_trip() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let log = SessionLog {
            thread_name: SessionLog::thread_name_for("alice", "2024-03-05 14:07:09"),
            thread_id: Some("thread_1".to_string()),
            assistant_id: "asst_1".to_string(),
            thread_date: "2024-03-05 14:07:09".to_string(),
            chat: vec![Message::user("hi"), Message::assistant("hello!")],
            summary: None,
        };
        assert_eq!(log.thread_name, "alice_2024-03-05_14:07:09");

        let path = store.save_session_log("alice", &log, fixed_time()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("summary"));

        let back = ProfileStore::load_session_log(&path).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn test_session_logs_in_the_same_second_are_kept() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let log = |reply: &str| SessionLog {
            thread_name: SessionLog::thread_name_for("alice", "2024-03-05 14:07:09"),
            thread_id: None,
            assistant_id: "asst_1".to_string(),
            thread_date: "2024-03-05 14:07:09".to_string(),
            chat: vec![Message::user("hi"), Message::assistant(reply)],
            summary: None,
        };

        let first = store.save_session_log("alice", &log("one"), fixed_time()).unwrap();
        let second = store.save_session_log("alice", &log("two"), fixed_time()).unwrap();
        let third = store.save_session_log("alice", &log("three"), fixed_time()).unwrap();

        assert_eq!(first, store.session_log_path("alice", fixed_time()).unwrap());
        assert_eq!(
            second.file_name().unwrap().to_string_lossy(),
            "thread_log_20240305-140709_2.json"
        );
        assert_eq!(
            third.file_name().unwrap().to_string_lossy(),
            "thread_log_20240305-140709_3.json"
        );
        assert_eq!(ProfileStore::load_session_log(&first).unwrap().chat[1].content, "one");
        assert_eq!(ProfileStore::load_session_log(&second).unwrap().chat[1].content, "two");
        assert_eq!(ProfileStore::load_session_log(&third).unwrap().chat[1].content, "three");
    }

    #[cfg(unix)]
    #[test]
    fn test_created_directories_are_private() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        ensure_directory_exists(&target).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
