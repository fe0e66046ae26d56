use std::fs;

use zeroize::Zeroizing;

use crate::backend::BackupBackend;
use crate::commands::{backup, checksum, delete, list, restore, select_latest};
use crate::crypto::test_params;
use crate::error::StratusError;

use super::helpers::{glacier_fixture, local_time, object_backend};

const FORMAT: &str = "{name}{now:%Y%m%d%H%M%S}";

fn no_password() -> crate::error::Result<Option<Zeroizing<String>>> {
    Ok(None)
}

fn make_source(root: &std::path::Path) -> std::path::PathBuf {
    let src = root.join("www");
    fs::create_dir_all(src.join("img")).unwrap();
    fs::write(src.join("index.html"), b"<h1>hi</h1>").unwrap();
    fs::write(src.join("img/logo.svg"), b"<svg/>").unwrap();
    src
}

#[test]
fn backup_then_restore_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let src = make_source(tmp.path());
    let (_store, backend) = object_backend();

    let outcome = backup::run_with(
        &backend,
        &src,
        FORMAT,
        None,
        test_params(),
        local_time(2013, 1, 2, 3, 4, 5),
    )
    .unwrap();
    assert_eq!(outcome.stored_name, "www20130102030405.tgz");
    assert!(!outcome.encrypted);

    let dest = tmp.path().join("restored");
    match restore::run(&backend, "www", &dest, no_password).unwrap() {
        restore::RestoreOutcome::Restored { name, .. } => {
            assert_eq!(name, "www20130102030405.tgz")
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fs::read(dest.join("www/index.html")).unwrap(), b"<h1>hi</h1>");
    assert_eq!(fs::read(dest.join("www/img/logo.svg")).unwrap(), b"<svg/>");
}

#[test]
fn encrypted_backup_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("dump.sql");
    fs::write(&file, b"INSERT 1;").unwrap();
    let (store, backend) = object_backend();

    let outcome = backup::run_with(
        &backend,
        &file,
        "{name}",
        Some("s3cret"),
        test_params(),
        local_time(2013, 1, 1, 0, 0, 0),
    )
    .unwrap();
    assert_eq!(outcome.stored_name, "dump.sql.tgz.enc");
    assert!(outcome.encrypted);

    // Stored bytes are not a plain gzip stream.
    use stratus_storage::StorageBackend;
    let stored = store.get("dump.sql.tgz.enc").unwrap().unwrap();
    assert_ne!(&stored[..2], &[0x1f_u8, 0x8b][..]);

    let dest = tmp.path().join("out");
    restore::run(&backend, "dump", &dest, || {
        Ok(Some(Zeroizing::new("s3cret".to_string())))
    })
    .unwrap();
    assert_eq!(fs::read(dest.join("dump.sql")).unwrap(), b"INSERT 1;");
}

#[test]
fn encrypted_restore_needs_the_right_password() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("dump.sql");
    fs::write(&file, b"x").unwrap();
    let (_store, backend) = object_backend();
    backup::run_with(
        &backend,
        &file,
        "{name}",
        Some("right"),
        test_params(),
        local_time(2013, 1, 1, 0, 0, 0),
    )
    .unwrap();

    let dest = tmp.path().join("out");
    let err = restore::run(&backend, "dump", &dest, no_password).unwrap_err();
    assert!(matches!(err, StratusError::Config(_)));

    let err = restore::run(&backend, "dump", &dest, || {
        Ok(Some(Zeroizing::new("wrong".to_string())))
    })
    .unwrap_err();
    assert!(matches!(err, StratusError::DecryptionFailed));
}

#[test]
fn plain_restore_never_asks_for_a_password() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("notes.txt");
    fs::write(&file, b"n").unwrap();
    let (_store, backend) = object_backend();
    backup::run_with(
        &backend,
        &file,
        "{name}",
        None,
        test_params(),
        local_time(2013, 1, 1, 0, 0, 0),
    )
    .unwrap();

    restore::run(&backend, "notes", &tmp.path().join("out"), || {
        panic!("password requested for a plain archive")
    })
    .unwrap();
}

#[test]
fn restore_selects_most_recent_match() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("db");
    let (_store, backend) = object_backend();

    fs::write(&file, b"old").unwrap();
    backup::run_with(
        &backend,
        &file,
        FORMAT,
        None,
        test_params(),
        local_time(2012, 11, 29, 8, 0, 0),
    )
    .unwrap();
    fs::write(&file, b"new").unwrap();
    backup::run_with(
        &backend,
        &file,
        FORMAT,
        None,
        test_params(),
        local_time(2012, 11, 30, 8, 0, 0),
    )
    .unwrap();

    assert_eq!(
        select_latest(&backend, "db").unwrap().as_deref(),
        Some("db20121130080000.tgz")
    );

    let dest = tmp.path().join("out");
    restore::run(&backend, "db", &dest, no_password).unwrap();
    assert_eq!(fs::read(dest.join("db")).unwrap(), b"new");

    let dest_old = tmp.path().join("out-old");
    restore::run(&backend, "db20121129", &dest_old, no_password).unwrap();
    assert_eq!(fs::read(dest_old.join("db")).unwrap(), b"old");
}

#[test]
fn no_match_is_not_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (_store, backend) = object_backend();

    assert!(matches!(
        restore::run(&backend, "nothing", tmp.path(), no_password).unwrap(),
        restore::RestoreOutcome::NoMatch
    ));
    assert_eq!(delete::run(&backend, "nothing").unwrap(), None);
    assert_eq!(checksum::run(&backend, "nothing").unwrap(), None);
}

#[test]
fn glacier_restore_is_pending_until_the_job_completes() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("photos");
    fs::write(&file, b"jpeg").unwrap();
    let fx = glacier_fixture();

    let outcome = backup::run_with(
        &fx.backend,
        &file,
        "{name}",
        None,
        test_params(),
        local_time(2013, 1, 1, 0, 0, 0),
    )
    .unwrap();
    assert_eq!(outcome.stored_name, "photos.tgz");

    let dest = tmp.path().join("out");
    match restore::run(&fx.backend, "photos", &dest, no_password).unwrap() {
        restore::RestoreOutcome::Pending { name, job } => {
            assert_eq!(name, "photos.tgz");
            assert_eq!(job.job_id, "J1");
        }
        other => panic!("expected Pending, got {other:?}"),
    }
    assert!(!dest.join("photos").exists());

    fx.cold.complete_job("J1");
    restore::run(&fx.backend, "photos", &dest, no_password).unwrap();
    assert_eq!(fs::read(dest.join("photos")).unwrap(), b"jpeg");
    assert_eq!(fx.cold.initiated(), 1);
}

#[test]
fn empty_prefix_is_refused_without_touching_the_store() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, backend) = object_backend();
    backend.upload("db20240101.tgz", b"1").unwrap();
    backend.upload("web20240101.tgz", b"2").unwrap();

    for prefix in ["", "  "] {
        assert!(matches!(
            delete::run(&backend, prefix),
            Err(StratusError::Config(_))
        ));
        assert!(matches!(
            checksum::run(&backend, prefix),
            Err(StratusError::Config(_))
        ));
        assert!(matches!(
            restore::run(&backend, prefix, tmp.path(), no_password),
            Err(StratusError::Config(_))
        ));
    }
    assert_eq!(
        list::run(&backend).unwrap(),
        vec!["db20240101.tgz", "web20240101.tgz"]
    );
    assert_eq!(store.put_count(), 2);
}

#[test]
fn password_is_resolved_before_any_download() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("vault.sql");
    fs::write(&file, b"secret rows").unwrap();
    let fx = glacier_fixture();
    backup::run_with(
        &fx.backend,
        &file,
        "{name}",
        Some("pw"),
        test_params(),
        local_time(2013, 1, 1, 0, 0, 0),
    )
    .unwrap();

    let err = restore::run(&fx.backend, "vault", tmp.path(), no_password).unwrap_err();
    assert!(matches!(err, StratusError::Config(_)));
    assert_eq!(fx.cold.initiated(), 0);

    let asked = std::cell::Cell::new(false);
    let outcome = restore::run(&fx.backend, "vault", tmp.path(), || {
        asked.set(true);
        assert_eq!(fx.cold.initiated(), 0);
        Ok(Some(Zeroizing::new("pw".to_string())))
    })
    .unwrap();
    assert!(asked.get());
    assert!(matches!(outcome, restore::RestoreOutcome::Pending { .. }));
}

#[test]
fn delete_removes_only_the_latest_match() {
    let (_store, backend) = object_backend();
    backend.upload("db20121129.tgz", b"1").unwrap();
    backend.upload("db20121130.tgz", b"2").unwrap();

    assert_eq!(
        delete::run(&backend, "db").unwrap().as_deref(),
        Some("db20121130.tgz")
    );
    assert_eq!(list::run(&backend).unwrap(), vec!["db20121129.tgz"]);
}

#[test]
fn list_is_sorted() {
    let (_store, backend) = object_backend();
    for name in ["c.tgz", "a.tgz", "b.tgz.enc"] {
        backend.upload(name, b"x").unwrap();
    }
    assert_eq!(
        list::run(&backend).unwrap(),
        vec!["a.tgz", "b.tgz.enc", "c.tgz"]
    );
}

#[test]
fn checksum_reports_latest_match() {
    let (_store, backend) = object_backend();
    backend.upload("db1.tgz", b"1").unwrap();
    backend.upload("db2.tgz", b"22").unwrap();

    let entry = checksum::run(&backend, "db").unwrap().unwrap();
    assert_eq!(entry.name, "db2.tgz");
    assert_eq!(entry.checksum.as_deref(), Some("len-2"));
}

#[test]
fn checksum_on_glacier_is_unsupported() {
    let fx = glacier_fixture();
    fx.backend.upload("db1.tgz", b"1").unwrap();
    assert!(matches!(
        checksum::run(&fx.backend, "db"),
        Err(StratusError::UnsupportedBackend(_))
    ));
}
