//! Whole-pipeline tests: `Solver` driven with fake capabilities.

mod common;

use common::*;
use edgequake_qpsolve::{
    Artifact, CapabilityError, ErrorKind, ProcessTextRequest, SolveError, SolverConfig, Stage,
};
use std::sync::Arc;

fn artifact(bytes: &[u8], content_type: &str, filename: &str) -> Option<Artifact> {
    Some(Artifact::new(bytes.to_vec(), content_type, filename))
}

// ── ProcessText ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn typed_question_is_solved() {
    let h = Harness::new(SolverConfig::default());

    let env = h
        .solver
        .process_text(ProcessTextRequest::new("2+2=?"))
        .await
        .unwrap();

    assert!(env.success);
    assert_eq!(env.extracted_text, "2+2=?");
    assert_eq!(env.filename, "Manual Input");
    assert!(env.file_type.is_none());
    assert!(!env.solutions.trim().is_empty());
    assert_eq!(h.model.calls(), 1);
    assert!(h.model.prompts.lock().unwrap()[0].contains("2+2=?"));
}

#[tokio::test]
async fn typed_question_keeps_given_filename() {
    let h = Harness::new(SolverConfig::default());
    let env = h
        .solver
        .process_text(ProcessTextRequest::new("x+1=2").with_filename("hw3.txt"))
        .await
        .unwrap();
    assert_eq!(env.filename, "hw3.txt");
}

#[tokio::test]
async fn empty_text_fails_validation_before_generator() {
    let h = Harness::new(SolverConfig::default());

    let err = h
        .solver
        .process_text(ProcessTextRequest::new(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.field_errors().unwrap()[0].path, vec!["text".to_string()]);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn whitespace_text_is_invalid_input() {
    let h = Harness::new(SolverConfig::default());
    let err = h
        .solver
        .process_text(ProcessTextRequest::new(" \n\t "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn model_failure_is_generation_failure() {
    let h = Harness::with_fakes(
        SolverConfig::default(),
        FakeModel::with(Err(CapabilityError::Failed("quota exceeded".into()))),
        FakeExtractor::returning("unused"),
        FakeExtractor::returning("unused"),
    );
    let err = h
        .solver
        .process_text(ProcessTextRequest::new("2+2=?"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to generate solutions: quota exceeded");
    assert_eq!(err.status_code(), 500);
}

// ── ProcessFile ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_is_rejected() {
    let h = Harness::new(SolverConfig::default());
    let err = h.solver.process_file(None).await.unwrap_err();
    assert!(matches!(err, SolveError::MissingFile));
    assert_eq!(err.to_string(), "No file uploaded");
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn pdf_with_text_is_solved() {
    let h = Harness::new(SolverConfig::default());

    let env = h
        .solver
        .process_file(artifact(MINIMAL_PDF, "application/pdf", "midterm.pdf"))
        .await
        .unwrap();

    assert!(env.success);
    assert_eq!(env.file_type.as_deref(), Some("application/pdf"));
    assert_eq!(env.filename, "midterm.pdf");
    assert_eq!(env.extracted_text, "Q1. What is 2+2?");
    assert!(!env.solutions.is_empty());
    assert_eq!(h.pdf.calls(), 1);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn corrupt_pdf_is_invalid_document() {
    let h = Harness::new(SolverConfig::default());

    for bytes in [&b""[..], &b"PK\x03\x04 zip"[..]] {
        let err = h
            .solver
            .process_file(artifact(bytes, "application/pdf", "broken.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDocument, "got: {err}");
    }
    assert_eq!(h.pdf.calls(), 0);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn pdf_engine_failure_is_extraction_failure() {
    let h = Harness::with_fakes(
        SolverConfig::default(),
        FakeModel::replying(SOLUTION),
        FakeExtractor::returning("unused"),
        FakeExtractor::with(Err(CapabilityError::Failed("corrupt xref table".into()))),
    );
    let err = h
        .solver
        .process_file(artifact(MINIMAL_PDF, "application/pdf", "x.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExtractionFailure);
    assert!(err.to_string().contains("corrupt xref table"));
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn unsupported_type_runs_no_extractor() {
    let h = Harness::new(SolverConfig::default());

    for content_type in ["application/zip", "image/gif", "application/octet-stream", ""] {
        let err = h
            .solver
            .process_file(artifact(b"whatever", content_type, "a.bin"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        let msg = err.to_string();
        for ext in ["PDF", "PNG", "JPG", "TXT"] {
            assert!(msg.contains(ext), "missing {ext} in: {msg}");
        }
    }
    assert_eq!(h.extractor_calls(), 0);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn whitespace_text_file_is_empty_extraction() {
    let h = Harness::new(SolverConfig::default());
    let err = h
        .solver
        .process_file(artifact(b"  \n\t \r\n ", "text/plain", "blank.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, SolveError::EmptyExtraction));
    assert_eq!(err.status_code(), 400);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn blank_ocr_result_is_empty_extraction() {
    let h = Harness::with_fakes(
        SolverConfig::default(),
        FakeModel::replying(SOLUTION),
        FakeExtractor::returning("   \n"),
        FakeExtractor::returning("unused"),
    );
    let err = h
        .solver
        .process_file(artifact(&png_bytes(8, 8), "image/png", "photo.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyExtraction);
    assert_eq!(h.ocr.calls(), 1);
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn text_file_is_solved_without_capabilities() {
    let h = Harness::new(SolverConfig::default());
    let env = h
        .solver
        .process_file(artifact("Q1. ∫ x dx\n".as_bytes(), "text/plain; charset=utf-8", "q.txt"))
        .await
        .unwrap();
    assert_eq!(env.extracted_text, "Q1. ∫ x dx\n");
    assert_eq!(env.file_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(h.extractor_calls(), 0);
    assert_eq!(h.model.calls(), 1);
}

#[tokio::test]
async fn text_file_matches_typed_text_byte_for_byte() {
    let paper = "Q1. क्\u{200D}ष  \n\n\n\n\nQ2. می\u{200C}خواهم\n";
    let h = Harness::new(SolverConfig::default());

    let from_file = h
        .solver
        .process_file(artifact(paper.as_bytes(), "text/plain", "paper.txt"))
        .await
        .unwrap();
    let from_text = h
        .solver
        .process_text(ProcessTextRequest::new(paper))
        .await
        .unwrap();

    assert_eq!(from_file.extracted_text, paper);
    assert_eq!(from_file.extracted_text, from_text.extracted_text);
    let prompts = h.model.prompts.lock().unwrap();
    assert!(prompts[0].contains(paper));
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn every_accepted_label_runs_exactly_one_extractor() {
    let cases: Vec<(Vec<u8>, &str, usize, usize)> = vec![
        (MINIMAL_PDF.to_vec(), "application/pdf", 0, 1),
        (png_bytes(4, 4), "image/png", 1, 0),
        (jpeg_bytes(4, 4), "image/jpeg", 1, 0),
        (jpeg_bytes(4, 4), "image/jpg", 1, 0),
        (b"Q1".to_vec(), "text/plain", 0, 0),
    ];

    for (bytes, content_type, ocr_calls, pdf_calls) in cases {
        let h = Harness::new(SolverConfig::default());
        h.solver
            .process_file(artifact(&bytes, content_type, "paper"))
            .await
            .unwrap_or_else(|e| panic!("{content_type}: {e}"));
        assert_eq!(h.ocr.calls(), ocr_calls, "{content_type}");
        assert_eq!(h.pdf.calls(), pdf_calls, "{content_type}");
        assert!(h.extractor_calls() <= 1);
    }
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_extraction() {
    let config = SolverConfig::builder().max_upload_bytes(64).build().unwrap();
    let h = Harness::new(config);

    for content_type in ["application/pdf", "image/png", "text/plain", "application/zip"] {
        let mut bytes = MINIMAL_PDF.to_vec();
        bytes.resize(65, b' ');
        let err = h
            .solver
            .process_file(artifact(&bytes, content_type, "big"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, SolveError::PayloadTooLarge { size: 65, limit: 64 }),
            "{content_type}: {err:?}"
        );
        assert_eq!(err.status_code(), 413);
    }
    assert_eq!(h.extractor_calls(), 0);
}

#[tokio::test]
async fn upload_at_exact_limit_is_accepted() {
    let config = SolverConfig::builder().max_upload_bytes(64).build().unwrap();
    let h = Harness::new(config);

    let mut bytes = b"Q1. 2+2=?".to_vec();
    bytes.resize(64, b' ');
    let env = h
        .solver
        .process_file(artifact(&bytes, "text/plain", "edge.txt"))
        .await
        .unwrap();
    assert_eq!(env.extracted_text.len(), 64);
    assert_eq!(h.model.calls(), 1);

    let mut pdf = MINIMAL_PDF.to_vec();
    pdf.resize(64, b' ');
    h.solver
        .process_file(artifact(&pdf, "application/pdf", "edge.pdf"))
        .await
        .unwrap();
    assert_eq!(h.pdf.calls(), 1);
}

#[tokio::test]
async fn mislabelled_image_is_invalid_document() {
    let h = Harness::new(SolverConfig::default());
    let err = h
        .solver
        .process_file(artifact(b"definitely not a png", "image/png", "x.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDocument);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn panicking_capability_is_internal_error() {
    let model = FakeModel::replying(SOLUTION);
    let solver = edgequake_qpsolve::Solver::new(
        SolverConfig::default(),
        edgequake_qpsolve::Capabilities {
            model: model.clone(),
            ocr: Arc::new(PanickingOcr),
            pdf: FakeExtractor::returning("unused"),
        },
    );

    let err = solver
        .process_file(artifact(&png_bytes(4, 4), "image/png", "p.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("ocr backend exploded"));

    // The solver keeps serving afterwards.
    let env = solver
        .process_text(ProcessTextRequest::new("2+2=?"))
        .await
        .unwrap();
    assert!(env.success);
}

// ── Stages ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stages_are_reported_in_order() {
    let log = Arc::new(StageLog::default());
    let config = SolverConfig::builder()
        .stage_callback(log.clone())
        .build()
        .unwrap();
    let h = Harness::new(config);

    h.solver
        .process_file(artifact(MINIMAL_PDF, "application/pdf", "a.pdf"))
        .await
        .unwrap();
    assert_eq!(
        *log.stages.lock().unwrap(),
        vec![
            Stage::Received,
            Stage::Validated,
            Stage::Extracted,
            Stage::Generated,
            Stage::Responded
        ]
    );
    assert_eq!(*log.extracted.lock().unwrap(), vec!["Q1. What is 2+2?".len()]);

    log.stages.lock().unwrap().clear();
    h.solver
        .process_file(artifact(b" ", "text/plain", "blank.txt"))
        .await
        .unwrap_err();
    assert_eq!(
        *log.stages.lock().unwrap(),
        vec![
            Stage::Received,
            Stage::Validated,
            Stage::Failed(ErrorKind::EmptyExtraction)
        ]
    );
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_model_reachability() {
    let up = Harness::new(SolverConfig::default());
    let report = up.solver.health().await;
    assert_eq!(report.status, "ok");
    assert!(report.llm_connected);

    let down = Harness::with_fakes(
        SolverConfig::default(),
        FakeModel::with(Err(CapabilityError::Unavailable("no API key".into()))),
        FakeExtractor::returning(""),
        FakeExtractor::returning(""),
    );
    let report = down.solver.health().await;
    assert_eq!(report.status, "ok");
    assert!(!report.llm_connected);
}

#[tokio::test]
async fn job_status_is_always_complete() {
    let h = Harness::new(SolverConfig::default());
    let status = h.solver.job_status("job-42");
    assert_eq!(status.job_id, "job-42");
    assert_eq!(status.status, "completed");
    assert_eq!(status.progress, 100);
}
