//! End-to-end scenarios (spec §8): drive the real file-I/O + driver +
//! invariant path through `runner::run`, not just the in-process driver
//! tests that build a `CrackerContext` directly.
//!
//! Every test uses a cipher text of all the same letter, which makes every
//! grille decrypt to the identical candidate buffer regardless of its
//! punch pattern — this isn't testing the rotation geometry (that's
//! `grille::tests::is_hole_totality_for_small_grille` and the proptest
//! suite's job) but it gives a small, fast, deterministic fixture for
//! exercising the full file-to-exit-code path for every variant.
//!
//! All tests here mutate the process's current directory (the crate reads
//! its inputs from fixed relative paths, matching the ground truth), so
//! they share one process-wide lock and run strictly one at a time.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use grillecrack::cli::Variant;
use grillecrack::constants::{DECRYPTED_MSG_PATH, ENCRYPTED_MSG_PATH, WORDS_FILE_PATH};
use grillecrack::runner;

fn cwd_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Creates a scratch directory with the three input files, chdirs into it,
/// runs `body`, then restores the original directory. Serialized against
/// every other test in this file via `cwd_lock`.
fn with_fixture(cipher_text: &str, clear_text: &str, words: &[&str], body: impl FnOnce()) {
    let _guard = cwd_lock().lock().unwrap_or_else(|e| e.into_inner());

    let original_dir = std::env::current_dir().expect("current dir");
    let scratch: PathBuf = std::env::temp_dir().join(format!(
        "grillecrack-e2e-{}-{}",
        std::process::id(),
        cipher_text.len()
    ));
    fs::create_dir_all(&scratch).expect("create scratch dir");

    fs::write(scratch.join(ENCRYPTED_MSG_PATH), format!("{cipher_text}\n")).expect("write cipher text");
    fs::write(scratch.join(DECRYPTED_MSG_PATH), format!("{clear_text}\n")).expect("write clear text");
    fs::write(scratch.join(WORDS_FILE_PATH), words.join("\n")).expect("write words file");

    std::env::set_current_dir(&scratch).expect("chdir into scratch dir");
    body();
    std::env::set_current_dir(&original_dir).expect("restore original dir");

    let _ = fs::remove_dir_all(&scratch);
}

/// A 16-character, uniform cipher text: every grille's 4-rotation buffer
/// (and its reversal) is 16 identical letters, regardless of punch
/// pattern. Paired with "AAA"/"AAAA" in the dictionary this clears
/// `MIN_DETECTED_WORD_COUNT` (17) on every single grille: 14 overlapping
/// 3-letter matches plus 13 overlapping 4-letter matches.
const UNIFORM_CIPHER_TEXT: &str = "AAAAAAAAAAAAAAAA";
const WORDS: &[&str] = &["AAA", "AAAA"];

#[test]
fn tiny_determinism_conserves_every_grille_for_every_driver() {
    for variant in [Variant::Syncless, Variant::Serial, Variant::Textbook, Variant::SyncBounded] {
        with_fixture(UNIFORM_CIPHER_TEXT, UNIFORM_CIPHER_TEXT, WORDS, || {
            let result = runner::run(variant, true);
            assert!(result.is_ok(), "{variant:?} failed: {result:?}");
        });
    }
}

#[test]
fn graceful_shutdown_exits_with_error_when_clear_text_is_absent() {
    with_fixture(UNIFORM_CIPHER_TEXT, "BBBBBBBBBBBBBBBB", WORDS, || {
        let result = runner::run(Variant::Syncless, true);
        assert!(result.is_err());
    });
}

#[test]
fn producer_consumer_variant_completes_and_finds_the_clear_text() {
    with_fixture(UNIFORM_CIPHER_TEXT, UNIFORM_CIPHER_TEXT, WORDS, || {
        let result = runner::run(Variant::Concurrent, true);
        assert!(result.is_ok(), "{result:?}");
    });
}

#[test]
fn malformed_cipher_text_is_a_configuration_error() {
    // 9 letters -> side length 3, which is odd, violating the "even side"
    // invariant (spec §7: configuration errors fail early).
    with_fixture("ABCDEFGHI", "ABCDEFGHI", WORDS, || {
        let result = runner::run(Variant::Serial, true);
        assert!(result.is_err());
    });
}
