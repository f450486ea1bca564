use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rkhash::{compute_hashes, seeded_bytes, Header, Properties, RollingHasher};

fn rkhash_exe() -> &'static str {
    env!("CARGO_BIN_EXE_rkhash")
}

fn run(args: &[&str]) -> Output {
    Command::new(rkhash_exe())
        .args(args)
        .env_remove("RKHASH_WINDOW")
        .env_remove("RKHASH_SEGMENT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run rkhash")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_hash_all_matches_library() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input.bin");
    let data = seeded_bytes(300, 1);
    fs::write(&input, &data).unwrap();

    let output = run(&["hash", "--window", "8", "--all", "--segment", "16", path_arg(&input)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "rkhash hash failed:\nstdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );

    let hasher = RollingHasher::<u64>::new(8usize).unwrap();
    let expected = compute_hashes(&hasher, &data);

    let lines: Vec<&str> = stdout.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(lines.len(), expected.len());
    for (line, hash) in lines.iter().zip(expected.iter()) {
        let (_, hex) = line.split_once('\t').unwrap();
        assert_eq!(u64::from_str_radix(hex, 16).unwrap(), *hash);
    }
}

#[test]
fn test_hash_summary_multiple_files() {
    let temp = tempfile::tempdir().unwrap();
    let long = temp.path().join("long.txt");
    let short = temp.path().join("short.txt");
    fs::write(&long, b"abcde").unwrap();
    fs::write(&short, b"ab").unwrap();

    let output = run(&["hash", path_arg(&long), path_arg(&short)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let hasher = RollingHasher::<u64>::new(4usize).unwrap();
    let first = format!("{:016x}", hasher.direct_hash(b"abcd"));
    let last = format!("{:016x}", hasher.direct_hash(b"bcde"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("2 windows"), "{}", lines[0]);
    assert!(lines[0].contains(&first) && lines[0].contains(&last), "{}", lines[0]);
    assert!(lines[1].contains("0 windows"), "{}", lines[1]);
}

#[test]
fn test_hash_narrow_width_and_custom_base() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input.bin");
    fs::write(&input, b"\x01\x02\x03").unwrap();

    let output = run(&[
        "hash", "--window", "3", "--width", "32", "--base", "0x100", "--all", path_arg(&input),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0\t00010203"), "{}", stdout);
}

#[test]
fn test_rejects_bad_window() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input.bin");
    fs::write(&input, b"data").unwrap();

    for window in ["0", "-3"] {
        let output = run(&["hash", "--window", window, path_arg(&input)]);
        assert!(!output.status.success(), "window {} should be rejected", window);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid window length"), "{}", stderr);
    }
}

#[test]
fn test_rejects_base_too_wide() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input.bin");
    fs::write(&input, b"data").unwrap();

    let output = run(&["hash", "--width", "32", "--base", "0x100000000", path_arg(&input)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not fit"));
}

#[test]
fn test_verify_seeded_buffer() {
    let output = run(&["verify"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("4092 windows OK"), "{}", stdout);
    assert!(stdout.contains("0 of 1000"), "{}", stdout);
}

#[test]
fn test_verify_window_larger_than_input() {
    let output = run(&["verify", "--window", "9223372036854775807"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "verify with a huge window failed:\nstdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("0 windows OK"), "{}", stdout);
    assert!(stdout.contains("Sensitivity: skipped"), "{}", stdout);
}

#[test]
fn test_verify_files_sampled() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input.bin");
    fs::write(&input, seeded_bytes(5000, 8)).unwrap();

    let output = run(&[
        "verify", "--window", "32", "--width", "128", "--samples", "100", path_arg(&input),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("100 windows OK"), "{}", stdout);
}

#[test]
fn test_header_command() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("stream.lzma");
    let header = Header {
        properties: Properties::default(),
        dict_cap: 1 << 16,
        size: None,
    };
    let mut bytes = header.encode().unwrap().to_vec();
    bytes.extend_from_slice(b"compressed payload");
    fs::write(&input, &bytes).unwrap();

    let output = run(&["header", path_arg(&input)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("lc=3 lp=0 pb=2"), "{}", stdout);
    assert!(stdout.contains("65536 bytes"), "{}", stdout);
    assert!(stdout.contains("unknown"), "{}", stdout);
}

#[test]
fn test_header_too_short() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("short.lzma");
    fs::write(&input, b"\x5d\x00").unwrap();

    let output = run(&["header", path_arg(&input)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("too short"));
}

#[test]
fn test_missing_file_reports_path() {
    let output = run(&["hash", "/nonexistent/rkhash/missing.bin"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.bin"));
}
