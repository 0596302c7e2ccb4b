//! Secret record datatypes

use chrono::{DateTime, NaiveDateTime};

/// Rendering of a password shown on screen
pub const MASKED_PASSWORD: &str = "********";

fn from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened to a secret when an access was logged
pub enum AccessKind {
    /// The secret was created
    Created,
    /// The secret was shown to the user
    Viewed,
    /// The secret was edited
    Changed,
    /// The secret was exported
    Exported,
    /// The secret was synchronised with another application
    Synced,
    /// An access type unknown to this library
    Unknown(i32),
}

impl From<i32> for AccessKind {
    fn from(id: i32) -> AccessKind {
        match id {
            1 => AccessKind::Created,
            2 => AccessKind::Viewed,
            3 => AccessKind::Changed,
            4 => AccessKind::Exported,
            5 => AccessKind::Synced,
            x => AccessKind::Unknown(x),
        }
    }
}

impl From<AccessKind> for i32 {
    fn from(kind: AccessKind) -> i32 {
        match kind {
            AccessKind::Created => 1,
            AccessKind::Viewed => 2,
            AccessKind::Changed => 3,
            AccessKind::Exported => 4,
            AccessKind::Synced => 5,
            AccessKind::Unknown(x) => x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One entry of a secret's access history
pub struct AccessLogEntry {
    /// Type of access
    pub kind: AccessKind,
    /// Milliseconds since the Unix epoch
    pub time_millis: i64,
}

impl AccessLogEntry {
    /// When the access happened, if the stored time is representable
    pub fn time(&self) -> Option<NaiveDateTime> {
        from_millis(self.time_millis)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// A single stored credential
pub struct SecretRecord {
    /// Title the user gave this secret
    pub description: Option<String>,
    /// Account name or id
    pub username: Option<String>,
    /// Password or PIN
    pub password: Option<String>,
    /// Email address tied to the account
    pub email: Option<String>,
    /// Free form notes
    pub note: Option<String>,
    /// Access history, most recent first
    pub access_log: Vec<AccessLogEntry>,
    /// Last modification in milliseconds since the Unix epoch, 0 if never recorded
    pub last_changed_millis: i64,
}

impl SecretRecord {
    /// Title of this secret
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Account name of this secret
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Email of this secret
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Notes for this secret
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Password as written to exports, always in clear
    pub fn password_for_export(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Password as shown on screen, masked unless empty
    pub fn password_for_display(&self) -> &str {
        match self.password.as_deref() {
            None | Some("") => "",
            Some(_) => MASKED_PASSWORD,
        }
    }

    /// Last modification time, if one was recorded
    pub fn last_changed(&self) -> Option<NaiveDateTime> {
        match self.last_changed_millis {
            0 => None,
            millis => from_millis(millis),
        }
    }
}
