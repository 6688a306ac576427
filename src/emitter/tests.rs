use super::*;
use crate::client::Client;
use crate::envelope::EnvelopeTracker;
use crate::splitter::{split_transaction, ControlNumberSequence};
use crate::test_support::three_remittances;
use crate::x12;
use std::io::Read;
use tempfile::TempDir;

fn first_unit(seed: u64) -> SplitUnit {
    let text = three_remittances();
    let mut segments = x12::read(&text).unwrap();
    let delimiters = segments.delimiters();
    let mut tracker = EnvelopeTracker::new();
    let completed = loop {
        let segment = segments.next().unwrap().unwrap();
        if let Some(done) = tracker.feed(segment).unwrap() {
            break done;
        }
    };
    let mut sequence = ControlNumberSequence::starting_at(seed);
    split_transaction(completed, delimiters, &mut sequence).unwrap()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_emit_writes_named_file() {
    let dir = TempDir::new().unwrap();
    let emitter = FileEmitter::new(dir.path());
    let unit = first_unit(12);

    let emitted = emitter.emit(&unit, "batch.835").unwrap();

    assert_eq!(emitted.file_name, "835_batch.835_000000012.x12");
    assert_eq!(entries(dir.path()), vec![emitted.file_name.clone()]);
    let content = fs::read(&emitted.path).unwrap();
    assert_eq!(content, emitted.bytes);
    assert!(content.starts_with(b"ISA*00*"));
    assert!(content.ends_with(b"IEA*1*000000012~"));
}

#[test]
fn test_emit_with_line_breaks() {
    let dir = TempDir::new().unwrap();
    let emitter = FileEmitter::new(dir.path()).line_breaks(true);
    let emitted = emitter.emit(&first_unit(1), "batch.835").unwrap();

    let content = String::from_utf8(fs::read(&emitted.path).unwrap()).unwrap();
    assert_eq!(content.lines().count(), 9);
    assert!(content.lines().all(|line| line.ends_with('~')));
}

#[test]
fn test_emit_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let emitter = FileEmitter::new(dir.path());
    let unit = first_unit(3);
    let existing = dir.path().join("835_batch.835_000000003.x12");
    fs::write(&existing, b"keep me").unwrap();

    let result = emitter.emit(&unit, "batch.835");

    assert!(matches!(result, Err(EmitError::AlreadyExists(_))));
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");
    assert_eq!(entries(dir.path()).len(), 1);
}

#[test]
fn test_emit_to_missing_directory_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let emitter = FileEmitter::new(dir.path().join("missing"));

    let result = emitter.emit(&first_unit(1), "batch.835");

    assert!(matches!(result, Err(EmitError::Io { .. })));
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn test_archiver_groups_by_client() {
    let dir = TempDir::new().unwrap();
    let mut archiver = ClientArchiver::new(dir.path());
    let clinic_a = Client {
        id: "1111111111".to_string(),
        name: "CLINIC A".to_string(),
    };
    let clinic_b = Client {
        id: "2222222222".to_string(),
        name: "CLINIC B".to_string(),
    };

    archiver.add(&clinic_a, "batch.835/one.x12", b"ISA*one~").unwrap();
    archiver.add(&clinic_b, "batch.835/two.x12", b"ISA*two~").unwrap();
    archiver.add(&clinic_a, "batch.835/three.x12", b"ISA*three~").unwrap();

    let paths = archiver.finish().unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], dir.path().join(ARCHIVE_DIR).join("1111111111.zip"));

    let mut archive = zip::ZipArchive::new(fs::File::open(&paths[0]).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
    let mut content = String::new();
    archive
        .by_name("batch.835/three.x12")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "ISA*three~");
}

#[test]
fn test_archiver_separates_ids_with_same_file_name() {
    let dir = TempDir::new().unwrap();
    let mut archiver = ClientArchiver::new(dir.path());
    let slashed = Client {
        id: "12/34".to_string(),
        name: "CLINIC".to_string(),
    };
    let underscored = Client {
        id: "12_34".to_string(),
        name: "CLINIC".to_string(),
    };

    archiver.add(&slashed, "a.835/one.x12", b"ISA*one~").unwrap();
    archiver.add(&underscored, "a.835/two.x12", b"ISA*two~").unwrap();
    archiver.add(&slashed, "a.835/three.x12", b"ISA*three~").unwrap();

    let paths = archiver.finish().unwrap();
    let root = dir.path().join(ARCHIVE_DIR);
    assert_eq!(paths, vec![root.join("12_34-2.zip"), root.join("12_34.zip")]);

    let first = zip::ZipArchive::new(fs::File::open(root.join("12_34.zip")).unwrap()).unwrap();
    assert_eq!(first.len(), 2);
    let second = zip::ZipArchive::new(fs::File::open(root.join("12_34-2.zip")).unwrap()).unwrap();
    assert_eq!(second.len(), 1);
}

#[test]
fn test_emit_replaces_stale_scratch_file() {
    let dir = TempDir::new().unwrap();
    let emitter = FileEmitter::new(dir.path());
    let stale = dir
        .path()
        .join(format!(".835_batch.835_000000001.x12{}", PARTIAL_SUFFIX));
    fs::write(&stale, b"stale").unwrap();

    let emitted = emitter.emit(&first_unit(1), "batch.835").unwrap();

    assert_eq!(entries(dir.path()), vec![emitted.file_name.clone()]);
    assert_eq!(fs::read(&emitted.path).unwrap(), emitted.bytes);
}

#[test]
fn test_emit_failure_keeps_existing_scratch_directory() {
    let dir = TempDir::new().unwrap();
    let emitter = FileEmitter::new(dir.path());
    // A directory in place of the scratch file cannot be cleared or written
    let blocked = dir
        .path()
        .join(format!(".835_batch.835_000000001.x12{}", PARTIAL_SUFFIX));
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), b"keep me").unwrap();

    let result = emitter.emit(&first_unit(1), "batch.835");

    assert!(matches!(result, Err(EmitError::Io { .. })));
    assert_eq!(fs::read(blocked.join("keep")).unwrap(), b"keep me");
    assert!(!dir.path().join("835_batch.835_000000001.x12").exists());
}
