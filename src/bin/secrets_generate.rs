//! Generates a sample container using secrets-rs
//!
//! Primarily for verifying secrets-rs changes. The container is written to
//! `secrets_rs.bin` with the password `secretsrs`.

use chrono::NaiveDate;
use secrets_rs::records::{AccessKind, AccessLogEntry};
use secrets_rs::{Container, Error, Password, SecretRecord};
use std::fs::File;
use std::path::PathBuf;

fn sample_millis(month: u32) -> i64 {
    NaiveDate::from_ymd_opt(2020, month, 1)
        .and_then(|date| date.and_hms_opt(1, 2, 3))
        .map(|time| time.and_utc().timestamp_millis())
        .unwrap_or_default()
}

fn main() -> Result<(), Error> {
    let created = sample_millis(4);
    let viewed = sample_millis(5);
    let record = SecretRecord {
        description: Some("Bar".to_string()),
        username: Some("foo".to_string()),
        password: Some("secretsrs".to_string()),
        email: Some("foo@example.com".to_string()),
        note: Some("Sample secret".to_string()),
        access_log: vec![
            AccessLogEntry {
                kind: AccessKind::Viewed,
                time_millis: viewed,
            },
            AccessLogEntry {
                kind: AccessKind::Created,
                time_millis: created,
            },
        ],
        last_changed_millis: created,
    };

    let output_path = PathBuf::from("secrets_rs.bin");
    let mut file = File::create(output_path).expect("Could not open output file");

    let mut container = Container::from_records(vec![record])?;
    container.set_password(&Password::new("secretsrs"));
    container.write(&mut file)?;
    Ok(())
}
