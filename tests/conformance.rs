// ABOUTME: Table-driven conformance tests for the flat CBOR decoder.
// ABOUTME: Loads JSON vector files and checks flattened output or error kind per case.

use cbor_flat::{decode_with_config, ByteOrder, DecoderConfig, Error};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type names a vector may expect.
const KNOWN_ERROR_TYPES: &[&str] = &[
    "malformed",
    "output_exhausted",
    "overrun",
    "excessive",
    "unsupported",
];

#[derive(Debug, Deserialize)]
struct TestFile {
    version: u32,
    #[allow(dead_code)]
    description: String,
    tests: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestCase {
    name: String,
    /// Hex-encoded message, whitespace ignored.
    input: String,
    /// Hex-encoded expected output; its length is the output capacity.
    #[serde(default)]
    output: Option<String>,
    /// Output capacity for error cases.
    #[serde(default)]
    capacity: Option<usize>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    options: TestOptions,
}

/// Overrides applied on top of a little-endian default configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestOptions {
    byte_order: Option<ByteOrder>,
    max_depth: Option<usize>,
    map_pairs: Option<bool>,
    validate_utf8: Option<bool>,
}

impl TestOptions {
    fn config(&self) -> DecoderConfig {
        let mut config = DecoderConfig::default().with_byte_order(ByteOrder::Little);
        if let Some(byte_order) = self.byte_order {
            config = config.with_byte_order(byte_order);
        }
        if let Some(max_depth) = self.max_depth {
            config = config.with_max_depth(max_depth);
        }
        if let Some(map_pairs) = self.map_pairs {
            config = config.with_map_pairs(map_pairs);
        }
        if let Some(validate_utf8) = self.validate_utf8 {
            config = config.with_validate_utf8(validate_utf8);
        }
        config
    }
}

/// Convert a hex string (with optional spaces) to bytes.
fn hex_to_bytes(s: &str) -> Result<Vec<u8>, String> {
    let hex: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() % 2 != 0 {
        return Err(format!("odd-length hex string {s:?}"));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad hex {s:?}: {e}"))
        })
        .collect()
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn vectors_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("vectors")
}

fn run_test(test: &TestCase) -> Result<(), String> {
    let input = hex_to_bytes(&test.input)?;
    let config = test.options.config();

    match (&test.output, &test.error) {
        (Some(expected), None) => {
            let expected = hex_to_bytes(expected)?;
            let capacity = test.capacity.unwrap_or(expected.len());
            let mut output = vec![0u8; capacity];
            decode_with_config(&input, &mut output, config)
                .map_err(|e| format!("expected success, got {}", e.error_type()))?;
            if output != expected {
                return Err(format!(
                    "output mismatch: expected {}, got {}",
                    bytes_to_hex(&expected),
                    bytes_to_hex(&output)
                ));
            }
            Ok(())
        }
        (None, Some(expected)) => {
            if !KNOWN_ERROR_TYPES.contains(&expected.as_str()) {
                return Err(format!("unknown error type {expected:?}"));
            }
            let capacity = test
                .capacity
                .ok_or_else(|| "error case without capacity".to_string())?;
            let mut output = vec![0u8; capacity];
            match decode_with_config(&input, &mut output, config) {
                Ok(()) => Err(format!("expected {expected}, got success")),
                Err(err) if err.error_type() == expected => Ok(()),
                Err(err) => Err(format!("expected {expected}, got {}", err.error_type())),
            }
        }
        _ => Err("test must have exactly one of output or error".to_string()),
    }
}

/// Run every case in a vector file and return (passed, failures).
fn run_test_file(name: &str) -> (usize, Vec<String>) {
    let path = vectors_dir().join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    let file: TestFile = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()));
    assert_eq!(file.version, 1, "{name}: unsupported vector file version");

    let mut seen = HashSet::new();
    let mut passed = 0;
    let mut failures = Vec::new();

    for test in &file.tests {
        if !seen.insert(test.name.as_str()) {
            failures.push(format!("{}: duplicate test name", test.name));
            continue;
        }
        match run_test(test) {
            Ok(()) => passed += 1,
            Err(msg) => failures.push(format!("{}: {msg}", test.name)),
        }
    }

    (passed, failures)
}

fn assert_file_passes(name: &str) {
    let (passed, failures) = run_test_file(name);
    assert!(
        failures.is_empty(),
        "{name}: {} passed, {} failed:\n  {}",
        passed,
        failures.len(),
        failures.join("\n  ")
    );
    assert!(passed > 0, "{name}: no tests ran");
}

#[test]
fn test_conformance_rfc8949() {
    assert_file_passes("rfc8949.json");
}

#[test]
fn test_conformance_decoding() {
    assert_file_passes("decoding.json");
}

#[test]
fn test_conformance_errors() {
    assert_file_passes("errors.json");
}

#[test]
fn test_runner_rejects_wrong_expectation() {
    let test = TestCase {
        name: "wrong".to_string(),
        input: "01".to_string(),
        output: Some("02".to_string()),
        capacity: None,
        error: None,
        options: TestOptions::default(),
    };
    assert!(run_test(&test).is_err());

    let test = TestCase {
        name: "wrong_error".to_string(),
        input: "1c".to_string(),
        output: None,
        capacity: Some(1),
        error: Some("overrun".to_string()),
        options: TestOptions::default(),
    };
    assert!(run_test(&test).is_err());
}

#[test]
fn test_same_input_same_error() {
    let input = [0x83, 0x01, 0x1c, 0x02];
    let config = DecoderConfig::default();
    let mut output = [0u8; 3];
    let first = decode_with_config(&input, &mut output, config);
    let second = decode_with_config(&input, &mut output, config);
    assert_eq!(first, Err(Error::Malformed));
    assert_eq!(first, second);
}

#[test]
fn test_small_negative_integers() {
    // -1 - n for every one-byte n: widened exactly when n >= 128.
    for n in 0u16..=255 {
        let input = [0x38, n as u8];
        let expected = -1 - i32::from(n);
        let width = if n >= 128 { 2 } else { 1 };
        let mut output = vec![0u8; width];
        let config = DecoderConfig::default().with_byte_order(ByteOrder::Little);
        decode_with_config(&input, &mut output, config).unwrap();
        let value = if width == 1 {
            i32::from(output[0] as i8)
        } else {
            i32::from(i16::from_le_bytes([output[0], output[1]]))
        };
        assert_eq!(value, expected, "n = {n}");
    }
}

#[test]
fn test_output_never_overwritten_past_capacity() {
    // The guard byte after the caller's slice must survive every failure.
    let inputs: &[&[u8]] = &[
        &[0x1b, 0, 0, 0, 0, 0, 0, 0, 1],
        &[0x38, 0x80],
        &[0x44, 1, 2, 3, 4],
        &[0x5f, 0x42, 1, 2, 0x42, 3, 4, 0xff],
        &[0x83, 0x01, 0x02, 0x03],
    ];
    for input in inputs {
        let mut buf = [0u8; 4];
        let (output, guard) = buf.split_at_mut(1);
        guard.fill(0xaa);
        assert_eq!(
            decode_with_config(input, output, DecoderConfig::default()),
            Err(Error::OutputExhausted),
            "{input:02x?}"
        );
        assert_eq!(guard, [0xaa; 3]);
    }
}
