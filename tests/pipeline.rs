mod common;

use common::{Reply, ScriptedModel};
use pdf_categorizer::config::{ModelConfig, Settings};
use pdf_categorizer::error::CategorizerError;
use pdf_categorizer::{process_pdf, process_pdf_with_model, results_path};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use setup::create_six_hundred_word_pdf;

#[test]
fn test_six_hundred_words_make_two_records() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = create_six_hundred_word_pdf(dir.path()).unwrap();
    let mut model = ScriptedModel::new(vec![
        Reply::Text(r#"{"name": "Alice", "grade": "A"}"#),
        Reply::Text("not json"),
    ]);

    let records = process_pdf_with_model(&pdf_path, &mut model, 512).unwrap();
    assert_eq!(records.len(), 2);

    let chunks = model.chunks_seen();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].split_whitespace().count(), 512);
    assert_eq!(chunks[1].split_whitespace().count(), 88);
    assert!(chunks[0].starts_with("w0 "));
    assert!(chunks[1].ends_with(" w599"));

    let output_path = dir.path().join("transcript_results.json");
    assert_eq!(results_path(&pdf_path), output_path);
    let written = std::fs::read_to_string(&output_path).unwrap();
    let parsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        parsed,
        json!([{"name": "Alice", "grade": "A"}, {"text": "not json"}])
    );
    // 2-space indentation
    assert!(written.starts_with("[\n  {\n    \""));
}

#[test]
fn test_extraction_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("broken.pdf");
    std::fs::write(&pdf_path, "not a pdf").unwrap();
    let mut model = ScriptedModel::default();

    let result = process_pdf_with_model(&pdf_path, &mut model, 512);

    assert!(matches!(result, Err(CategorizerError::Extraction(_))));
    assert!(model.requests.is_empty());
    assert!(!results_path(&pdf_path).exists());
}

#[test]
fn test_missing_model_path_fails_before_extraction() {
    let dir = tempfile::tempdir().unwrap();
    // Unreadable on purpose: reaching extraction would give an extraction error
    let pdf_path = dir.path().join("transcript.pdf");
    std::fs::write(&pdf_path, "not a pdf").unwrap();

    let settings = Settings {
        pdf_path: pdf_path.clone(),
        model: ModelConfig {
            model_path: None,
            ..Default::default()
        },
        ..Default::default()
    };

    let result = process_pdf(&settings);

    assert!(matches!(result, Err(CategorizerError::Config(_))));
    assert!(!results_path(&pdf_path).exists());
}

#[test]
fn test_missing_model_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = create_six_hundred_word_pdf(dir.path()).unwrap();

    let settings = Settings {
        pdf_path: pdf_path.clone(),
        model: ModelConfig {
            model_path: Some(dir.path().join("model.gguf").display().to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let result = process_pdf(&settings);

    assert!(matches!(
        result,
        Err(CategorizerError::NotFound { what: "Model file", .. })
    ));
    assert!(!results_path(&pdf_path).exists());
}
