use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;
use secrets_rs::records::{AccessKind, AccessLogEntry};
use secrets_rs::{Container, ContainerHeader, Password, SaltAndRounds, SecretRecord};
use std::io::Cursor;

fn record() -> impl Strategy<Value = SecretRecord> {
    let text = || option::of(".{0,24}");
    let entry = (0i32..7, any::<i64>()).prop_map(|(kind, time_millis)| AccessLogEntry {
        kind: AccessKind::from(kind),
        time_millis,
    });
    (
        (text(), text(), text(), text(), text()),
        vec(entry, 0..3),
        any::<i64>(),
    )
        .prop_map(
            |((description, username, password, email, note), access_log, last_changed_millis)| {
                SecretRecord {
                    description,
                    username,
                    password,
                    email,
                    note,
                    access_log,
                    last_changed_millis,
                }
            },
        )
}

fn write_container(
    records: Vec<SecretRecord>,
    salt: Vec<u8>,
    rounds: u8,
    password: &str,
) -> Vec<u8> {
    let mut container = Container::from_records(records).unwrap();
    *container.header_mut() = ContainerHeader::Salted(SaltAndRounds::new(salt, rounds).unwrap());
    container.set_password(&Password::new(password));
    let mut output = Vec::new();
    container.write(&mut output).unwrap();
    output
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn same_password_returns_records(
        salt in vec(any::<u8>(), 0..32),
        rounds in 4u8..=6,
        password in ".{0,12}",
        records in vec(record(), 0..4),
    ) {
        let data = write_container(records.clone(), salt, rounds, &password);
        let locked = secrets_rs::from_reader(Cursor::new(data)).unwrap();
        let unlocked = locked.unlock(&Password::new(password)).unwrap();
        prop_assert_eq!(unlocked.records(), &records[..]);
    }

    #[test]
    fn other_password_fails(
        salt in vec(any::<u8>(), 0..32),
        rounds in 4u8..=6,
        password in ".{0,12}",
        other in ".{0,12}",
        records in vec(record(), 1..3),
    ) {
        prop_assume!(password != other);
        let data = write_container(records, salt, rounds, &password);
        let locked = secrets_rs::from_reader(Cursor::new(data)).unwrap();
        prop_assert!(locked.unlock(&Password::new(other)).is_err());
    }
}

#[test]
fn rewritten_container_keeps_cipher() -> Result<(), secrets_rs::Error> {
    let records = vec![SecretRecord {
        description: Some("Mail".to_string()),
        password: Some("pa55".to_string()),
        ..Default::default()
    }];
    let data = write_container(records, vec![3; 16], 5, "first");
    let mut unlocked =
        secrets_rs::from_reader(Cursor::new(data))?.unlock(&Password::new("first"))?;
    unlocked.push(SecretRecord {
        description: Some("Phone".to_string()),
        ..Default::default()
    });

    let mut rewritten = Vec::new();
    unlocked.write(&mut rewritten)?;
    let reopened =
        secrets_rs::from_reader(Cursor::new(rewritten))?.unlock(&Password::new("first"))?;
    assert_eq!(reopened.records(), unlocked.records());
    assert_eq!(reopened.header(), unlocked.header());
    Ok(())
}
