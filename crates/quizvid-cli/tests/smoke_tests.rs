//! Smoke tests for the quizvid CLI
//!
//! Nothing here needs FFmpeg installed: rendering is exercised through
//! `--dry-run` and the tool checks are pointed at missing binaries.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ENV_OVERRIDES: [&str; 10] = [
    "QUIZVID_CONFIG",
    "QUIZVID_LOG",
    "VIDEO_QUALITY",
    "OUTPUT_DIR",
    "FFMPEG_PATH",
    "FFPROBE_PATH",
    "TEMPLATES_DIR",
    "MAX_WORKERS",
    "TTS_COMMAND",
    "BACKGROUND_MUSIC",
];

const CAPITALS: &str = r#"{
  "metadata": {"title": "World Capitals", "description": "Warm-up round"},
  "questions": [
    {"question": "Capital of France?", "type": "multiple_choice",
     "options": ["Berlin", "Paris", "Rome", "Madrid"], "correct_answer": "Paris",
     "explanation": "Paris has been the capital since 987.", "difficulty": "easy"},
    {"question": "Canberra is the capital of Australia.", "type": "true_false",
     "correct_answer": "True", "points": 20}
  ]
}"#;

const NO_ANSWER: &str = r#"{
  "metadata": {"title": "Broken"},
  "questions": [
    {"question": "Capital of Peru?", "type": "multiple_choice", "options": ["Lima", "Quito"]}
  ]
}"#;

const CROWDED: &str = r#"[
  {"question": "Which is a prime?", "type": "multiple_choice",
   "options": ["4", "6", "8", "9", "10", "12", "13"], "correct_answer": 6}
]"#;

/// Get a command for the quizvid binary, run in `dir` with a clean environment
fn quizvid(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quizvid").expect("quizvid binary should exist");
    cmd.current_dir(dir).arg("--color").arg("never");
    for key in ENV_OVERRIDES {
        cmd.env_remove(key);
    }
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("capitals.json"), CAPITALS).unwrap();
    fs::write(dir.path().join("broken.json"), NO_ANSWER).unwrap();
    fs::write(dir.path().join("crowded.json"), CROWDED).unwrap();
    dir
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_no_args_fails() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path()).assert().failure();
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_templates_list() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* default"))
        .stdout(predicate::str::contains("dark"));
}

#[test]
fn test_templates_show_json() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .args(["templates", "show", "dark", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "dark""#));
}

#[test]
fn test_templates_show_unknown() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .args(["templates", "show", "sepia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found: sepia"));
}

#[test]
fn test_custom_template_dir() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(
        templates.join("forest.yaml"),
        "description: Deep greens\n\
         background_color: \"#0b2e13\"\n\
         text_color: \"#f0fff0\"\n\
         accent_color: \"#2e8b57\"\n\
         correct_color: \"#7cfc00\"\n\
         font_family: Georgia\n\
         font_size: 26\n",
    )
    .unwrap();
    quizvid(dir.path())
        .env("TEMPLATES_DIR", &templates)
        .args(["templates", "show", "forest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Font: Georgia 26pt"));
}

// ============================================================================
// Validate / Export / Stats
// ============================================================================

#[test]
fn test_validate_valid_quiz() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["validate", "capitals.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All 2 questions validated successfully"));
}

#[test]
fn test_validate_reports_errors() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["validate", "capitals.json", "broken.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Question 1: Missing correct answer"))
        .stderr(predicate::str::contains("1 of 2 files did not pass"));
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["validate", "--quiz-file", "crowded.json"])
        .assert()
        .success();
    quizvid(dir.path())
        .args(["validate", "--quiz-file", "crowded.json", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_validate_json_output() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["validate", "capitals.json", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""question_count": 2"#));
}

#[test]
fn test_validate_without_files() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no quiz files given"));
}

#[test]
fn test_export_csv_to_stdout() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["export", "-i", "capitals.json", "--to", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("question,option_a,option_b"))
        .stdout(predicate::str::contains("Capital of France?"));
}

#[test]
fn test_export_json_to_file() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["export", "-i", "capitals.json", "--output", "out/copy.json"])
        .assert()
        .success();
    let text = fs::read_to_string(dir.path().join("out/copy.json")).unwrap();
    assert!(text.contains("World Capitals"));
}

#[test]
fn test_stats_text() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["stats", "-i", "capitals.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Questions: 2"))
        .stdout(predicate::str::contains("Total points: 30"));
}

#[test]
fn test_stats_json() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["stats", "-i", "capitals.json", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""with_explanations": 1"#));
}

// ============================================================================
// Create
// ============================================================================

#[test]
fn test_create_blank_quiz_in_default_dir() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .args(["create", "--title", "Science Week"])
        .assert()
        .success();
    let files: Vec<_> = fs::read_dir(dir.path().join("quiz_data"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("Science_Week_"));
    assert!(files[0].ends_with(".json"));
}

#[test]
fn test_create_imports_csv() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("rows.csv"),
        "question,option_a,option_b,option_c,option_d,correct_answer,difficulty\n\
         Largest planet?,Mars,Jupiter,Venus,Earth,B,easy\n",
    )
    .unwrap();
    quizvid(dir.path())
        .args(["create", "--input", "rows.csv", "--title", "Planets", "-o", "planets.json"])
        .assert()
        .success();
    let text = fs::read_to_string(dir.path().join("planets.json")).unwrap();
    assert!(text.contains("Largest planet?"));
    assert!(text.contains("Planets"));

    quizvid(dir.path())
        .args(["validate", "planets.json"])
        .assert()
        .success();
}

#[test]
fn test_create_requires_title_or_input() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .arg("create")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--title is required"));
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_saved_quizzes() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("quiz_data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("capitals.json"), CAPITALS).unwrap();
    fs::write(data.join("garbled.json"), "{not json").unwrap();

    quizvid(dir.path())
        .args(["list", "--questions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("World Capitals (capitals.json)"))
        .stdout(predicate::str::contains("Questions: 2"))
        .stdout(predicate::str::contains("Q1: "))
        .stdout(predicate::str::contains("garbled.json\n  error:"));
}

#[test]
fn test_list_without_quiz_dir() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("No saved quizzes in quiz_data"));
}

// ============================================================================
// Generate (dry run)
// ============================================================================

#[test]
fn test_generate_dry_run_prints_ffmpeg_command() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["generate", "--quiz-file", "capitals.json", "--dry-run", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"))
        .stdout(predicate::str::contains("-filter_complex"))
        .stdout(predicate::str::contains("drawtext"))
        .stdout(predicate::str::contains("subtitles.srt"))
        .stdout(predicate::str::contains("World_Capitals_"))
        .stderr(predicate::str::contains("Text overlays and subtitles written to"));
}

#[test]
fn test_generate_dry_run_respects_overrides() {
    let dir = workspace();
    quizvid(dir.path())
        .args([
            "generate",
            "--input",
            "capitals.json",
            "--dry-run",
            "--format",
            "webm",
            "--resolution",
            "720p",
            "--no-subtitles",
            "--output",
            "renders/capitals",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("libvpx-vp9"))
        .stdout(predicate::str::contains("1280x720"))
        .stdout(predicate::str::contains("renders/capitals.webm"))
        .stdout(predicate::str::contains("subtitles.srt").not());
}

#[test]
fn test_generate_rejects_invalid_quiz() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["generate", "-i", "broken.json", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quiz validation failed"))
        .stderr(predicate::str::contains("Missing correct answer"));
}

#[test]
fn test_generate_rejects_unknown_template() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["generate", "-i", "capitals.json", "--template", "sepia", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found"));
}

#[test]
fn test_generate_rejects_out_of_range_fps() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["generate", "-i", "capitals.json", "--fps", "120", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fps must be 24-60"));
}

#[test]
fn test_generate_missing_ffmpeg() {
    let dir = workspace();
    quizvid(dir.path())
        .env("FFMPEG_PATH", dir.path().join("no-such-ffmpeg"))
        .args(["generate", "-i", "capitals.json", "--no-tts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn test_batch_dry_run_lists_outputs() {
    let dir = workspace();
    quizvid(dir.path())
        .args(["batch", "--input-dir", ".", "--pattern", "capitals.*", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capitals.json -> "))
        .stdout(predicate::str::contains(".mp4"));
}

#[test]
fn test_batch_empty_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    quizvid(dir.path())
        .args(["batch", "--input-dir", "empty"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No quiz files found"));
}

#[test]
fn test_batch_missing_directory() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .args(["batch", "--input-dir", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("input directory not found"));
}

// ============================================================================
// Config / History / Doctor
// ============================================================================

#[test]
fn test_config_defaults() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .args(["config", "--defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"))
        .stdout(predicate::str::contains("max_workers: 4"));
}

#[test]
fn test_config_file_and_env() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("quizvid.yaml"), "max_workers: 9\nquality: high\n").unwrap();
    quizvid(dir.path())
        .env("OUTPUT_DIR", "videos")
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_workers: 9"))
        .stdout(predicate::str::contains("quality: high"))
        .stdout(predicate::str::contains("output_dir: videos"));
}

#[test]
fn test_config_invalid_env() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .env("MAX_WORKERS", "many")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MAX_WORKERS: invalid value 'many'"));
}

#[test]
fn test_history_empty() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .arg("history")
        .assert()
        .success()
        .stderr(predicate::str::contains("No generation history"));
}

#[test]
fn test_history_lists_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("output").join("history.jsonl");
    for n in 0..3 {
        let record = quizvid::HistoryRecord::completed(
            format!("Quiz {n}"),
            n + 1,
            quizvid::VideoSettings::default(),
            format!("output/quiz_{n}.mp4"),
        );
        quizvid::append_history(&path, &record).unwrap();
    }
    quizvid(dir.path())
        .args(["history", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz 0").not())
        .stdout(predicate::str::contains("Quiz 1 (2 questions)"))
        .stdout(predicate::str::contains("Quiz 2 (3 questions)"));
}

#[test]
fn test_doctor_reports_missing_ffmpeg() {
    let dir = TempDir::new().unwrap();
    quizvid(dir.path())
        .env("FFMPEG_PATH", dir.path().join("no-such-ffmpeg"))
        .env("FFPROBE_PATH", dir.path().join("no-such-ffprobe"))
        .arg("doctor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ffmpeg: not found"))
        .stderr(predicate::str::contains("ffprobe: not found"));
}
