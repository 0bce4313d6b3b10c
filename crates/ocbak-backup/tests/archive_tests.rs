//! Integration tests for archive creation, decryption and format safety

mod common;

use common::*;
use ocbak_backup::crypto::{self, HEADER_LEN, TAG_LEN};
use ocbak_backup::{ErrorKind, RestoreOptions};

#[tokio::test]
async fn test_round_trip_reproduces_every_file() {
    let source = InstallFixture::populated();
    let engine = fast_engine();
    let created = engine
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();
    assert_eq!(created.manifest.file_count, 10);
    assert_eq!(created.skipped, 0);

    let target = InstallFixture::empty();
    let result = engine
        .restore(
            &created.path,
            TEST_PASSPHRASE,
            &target.config(),
            RestoreOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.file_count, 10);
    assert!(result.failures.is_empty());
    assert_eq!(
        result.restored_categories,
        vec!["config", "credentials", "wallet", "workspace", "sessions", "cron"]
    );
    assert_eq!(snapshot(target.base()), snapshot(source.base()));
}

#[tokio::test]
async fn test_manifest_totals() {
    let source = InstallFixture::populated();
    let created = fast_engine()
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();

    let expected: u64 = snapshot(source.base())
        .values()
        .map(|content| content.len() as u64)
        .sum();
    assert_eq!(created.manifest.total_bytes, expected);
    assert_eq!(created.manifest.version, "1");
    assert!(!created.manifest.hostname.is_empty());
    assert!(created.manifest.created_at_utc().is_some());
}

#[tokio::test]
async fn test_wrong_passphrase_fails() {
    let source = InstallFixture::populated();
    let engine = fast_engine();
    let created = engine
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();

    let err = engine
        .inspect(&created.path, "correct horse battery stapler")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
}

#[tokio::test]
async fn test_tampered_ciphertext_and_tag_fail() {
    let source = InstallFixture::populated();
    let engine = fast_engine();
    let created = engine
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();
    let original = std::fs::read(&created.path).unwrap();

    let tag_offset = HEADER_LEN - TAG_LEN;
    for index in [tag_offset, HEADER_LEN - 1, HEADER_LEN, original.len() - 1] {
        let mut tampered = original.clone();
        tampered[index] ^= 0x80;
        std::fs::write(&created.path, &tampered).unwrap();

        let err = engine
            .inspect(&created.path, TEST_PASSPHRASE)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed, "byte {}", index);
    }
}

#[tokio::test]
async fn test_bad_magic_fails_before_key_derivation() {
    let source = InstallFixture::populated();
    let (engine, kdf) = counting_engine();
    let created = engine
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();
    assert_eq!(kdf.calls(), 1);

    let mut bytes = std::fs::read(&created.path).unwrap();
    bytes[..6].copy_from_slice(b"NOTOCB");
    std::fs::write(&created.path, &bytes).unwrap();

    let target = InstallFixture::empty();
    let err = engine
        .restore(
            &created.path,
            TEST_PASSPHRASE,
            &target.config(),
            RestoreOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArchive);
    assert_eq!(kdf.calls(), 1);
    assert!(snapshot(target.base()).is_empty());
}

#[tokio::test]
async fn test_truncated_header_is_invalid() {
    let dir = InstallFixture::empty();
    let path = dir.base().join("short.ocbak");
    std::fs::write(&path, b"OCBAK1 but far too short").unwrap();

    let (engine, kdf) = counting_engine();
    let err = engine.inspect(&path, TEST_PASSPHRASE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArchive);
    assert_eq!(kdf.calls(), 0);
}

#[tokio::test]
async fn test_authentic_garbage_is_corrupt() {
    let dir = InstallFixture::empty();
    let path = dir.base().join("garbage.ocbak");
    let kdf = ocbak_backup::Pbkdf2Sha512::with_iterations(TEST_ITERATIONS);
    let sealed = crypto::seal(
        b"sealed correctly but not gzip".to_vec(),
        TEST_PASSPHRASE.as_bytes(),
        &kdf,
    )
    .unwrap();
    std::fs::write(&path, sealed).unwrap();

    let err = fast_engine()
        .inspect(&path, TEST_PASSPHRASE)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptArchive);
}

#[tokio::test]
async fn test_archives_use_fresh_salt_and_nonce() {
    let source = InstallFixture::populated();
    let engine = fast_engine();
    let a = engine
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();
    let b = engine
        .create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();
    assert_ne!(a.path, b.path);

    let header_a = crypto::read_header(&a.path).await.unwrap();
    let header_b = crypto::read_header(&b.path).await.unwrap();
    assert_ne!(header_a.salt, header_b.salt);
    assert_ne!(header_a.nonce, header_b.nonce);
}

#[tokio::test]
async fn test_backup_dir_is_not_archived() {
    let source = InstallFixture::populated();
    let config = source
        .config()
        .with_backup_dir(source.base().join("workspace/.backups"));
    let engine = fast_engine();

    let first = engine.create(TEST_PASSPHRASE, &config).await.unwrap();
    let second = engine.create(TEST_PASSPHRASE, &config).await.unwrap();
    assert!(first.path.starts_with(source.base().join("workspace/.backups")));
    assert_eq!(first.manifest.file_count, second.manifest.file_count);

    let summary = engine.inspect(&second.path, TEST_PASSPHRASE).await.unwrap();
    assert!(summary.entries.iter().all(|e| !e.name.contains(".backups")));
}

#[tokio::test]
async fn test_default_key_derivation_round_trip() {
    let source = InstallFixture::empty().with_file("openclaw.json", "{}");
    let created = ocbak_backup::create(TEST_PASSPHRASE, &source.config())
        .await
        .unwrap();

    let summary = ocbak_backup::inspect(&created.path, TEST_PASSPHRASE)
        .await
        .unwrap();
    assert_eq!(summary.entries.len(), 1);
    assert_eq!(summary.entries[0].name, "config/openclaw.json");
}
