use std::fs;

use fetcher_engine::{HashLedger, LEDGER_FILENAME};
use tempfile::TempDir;

const HASH_A: &str = "5d41402abc4b2a76b9719d911017c592";
const HASH_B: &str = "7d793037a0760186574b0282f2f435e7";

#[test]
fn missing_ledger_loads_empty() {
    let temp = TempDir::new().unwrap();
    let ledger = HashLedger::load_in(temp.path());
    assert!(ledger.is_empty());
    assert!(!temp.path().join(LEDGER_FILENAME).exists());
}

#[test]
fn malformed_lines_are_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(LEDGER_FILENAME);
    fs::write(
        &path,
        format!("{HASH_A}\n\nnot-a-hash\n  {}  \n{HASH_A}\n", HASH_B.to_uppercase()),
    )
    .unwrap();

    let ledger = HashLedger::load(&path);
    assert_eq!(ledger.len(), 2);
    assert!(ledger.contains(HASH_A));
    assert!(ledger.contains(HASH_B));
    assert!(!ledger.contains("not-a-hash"));
}

#[test]
fn append_creates_file_and_records_hash() {
    let temp = TempDir::new().unwrap();
    let mut ledger = HashLedger::load_in(temp.path());

    ledger.append(HASH_A).unwrap();
    assert!(ledger.contains(HASH_A));

    let on_disk = fs::read_to_string(temp.path().join(LEDGER_FILENAME)).unwrap();
    assert_eq!(on_disk, format!("{HASH_A}\n"));

    let reloaded = HashLedger::load_in(temp.path());
    assert!(reloaded.contains(HASH_A));
}

#[test]
fn append_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let mut ledger = HashLedger::load_in(temp.path());
    ledger.append(HASH_A).unwrap();
    ledger.append(HASH_A).unwrap();

    let on_disk = fs::read_to_string(temp.path().join(LEDGER_FILENAME)).unwrap();
    assert_eq!(on_disk.lines().count(), 1);
}

#[test]
fn append_after_truncated_last_line_starts_new_line() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(LEDGER_FILENAME);
    fs::write(&path, HASH_A).unwrap();

    let mut ledger = HashLedger::load(&path);
    assert!(ledger.contains(HASH_A));
    ledger.append(HASH_B).unwrap();

    let on_disk = fs::read_to_string(&path).unwrap();
    assert_eq!(on_disk, format!("{HASH_A}\n{HASH_B}\n"));
}

#[test]
fn failed_append_leaves_memory_untouched() {
    let temp = TempDir::new().unwrap();
    // A directory where the ledger file should be makes every open fail.
    let path = temp.path().join(LEDGER_FILENAME);
    fs::create_dir(&path).unwrap();

    let mut ledger = HashLedger::load(&path);
    assert!(ledger.is_empty());
    assert!(ledger.append(HASH_A).is_err());
    assert!(!ledger.contains(HASH_A));
    assert!(ledger.is_empty());
}
