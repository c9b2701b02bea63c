mod fixture;

use fixture::{gunzip, gzip, Fixture};
use std::fs;
use std::process::Command;

fn dumper() -> Command {
	let mut command = Command::new(env!("CARGO_BIN_EXE_level-dumper"));
	command.env("RUST_LOG", "off");

	command
}

#[test]
fn test_convert() {
	let dir = tempfile::tempdir().unwrap();
	let source = dir.path().join("level.dat");
	let destination = dir.path().join("level.gz");

	let fixture = Fixture::new(2, 3, 4);
	fs::write(&source, fixture.gzip()).unwrap();

	let output = dumper().arg(&source).arg(&destination).output().unwrap();
	assert!(output.status.success(), "dumper failed: {}", String::from_utf8_lossy(&output.stderr));

	let stdout = String::from_utf8(output.stdout).unwrap();

	assert_eq!(stdout.lines().count(), 1, "expected a single summary line: {:?}", stdout);
	assert!(stdout.starts_with("size = 2x3x4, created="), "unexpected summary: {:?}", stdout);
	assert!(stdout.ends_with(", name=Fixture, creator=tester\n"), "unexpected summary: {:?}", stdout);

	let written = gunzip(&fs::read(&destination).unwrap());

	assert_eq!(&written[..12], &[0x00, 0x02, 0x00, 0x04, 0x00, 0x03, 0x00, 0x30, 0x00, 0x00, 0xFF, 0xF0]);
	assert_eq!(&written[12..], fixture.blocks.as_slice());
}

fn summary_in_zone(tz: &str) -> String {
	let dir = tempfile::tempdir().unwrap();
	let source = dir.path().join("level.dat");

	fs::write(&source, Fixture::new(2, 3, 4).gzip()).unwrap();

	let output = dumper().env("TZ", tz).arg(&source).arg(dir.path().join("level.gz")).output().unwrap();
	assert!(output.status.success(), "dumper failed: {}", String::from_utf8_lossy(&output.stderr));

	String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_summary_zone_abbreviation() {
	assert_eq!(summary_in_zone("UTC"), "size = 2x3x4, created=Tue Jun 16 16:00:00 UTC 2009, name=Fixture, creator=tester\n");
	assert_eq!(summary_in_zone("Europe/Berlin"), "size = 2x3x4, created=Tue Jun 16 18:00:00 CEST 2009, name=Fixture, creator=tester\n");
}

#[test]
fn test_truncated_input_writes_nothing() {
	let dir = tempfile::tempdir().unwrap();
	let source = dir.path().join("level.dat");
	let destination = dir.path().join("level.gz");

	let stream = Fixture::new(2, 3, 4).stream();
	fs::write(&source, gzip(&stream[..stream.len() - 10])).unwrap();

	let output = dumper().arg(&source).arg(&destination).output().unwrap();

	assert!(!output.status.success());
	assert!(output.stdout.is_empty(), "no summary should be printed on failure");
	assert!(!destination.exists(), "no output file should be created on failure");
}

#[test]
fn test_missing_source() {
	let dir = tempfile::tempdir().unwrap();
	let destination = dir.path().join("level.gz");

	let output = dumper().arg(dir.path().join("absent.dat")).arg(&destination).output().unwrap();

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("absent.dat"));
	assert!(!destination.exists());
}

#[test]
fn test_unwritable_destination() {
	let dir = tempfile::tempdir().unwrap();
	let source = dir.path().join("level.dat");
	let destination = dir.path().join("missing-dir").join("level.gz");

	fs::write(&source, Fixture::new(1, 1, 1).gzip()).unwrap();

	let output = dumper().arg(&source).arg(&destination).output().unwrap();

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("failed to write compact level"));
}

#[test]
fn test_requires_two_paths() {
	let output = dumper().arg("only-one").output().unwrap();

	assert!(!output.status.success());
}
