//! Fake capabilities shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_qpsolve::{
    Capabilities, CapabilityError, LanguageModel, OcrEngine, PdfTextEngine, Solver, SolverConfig,
    Stage, StageCallback,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SOLUTION: &str = "## Question 1\n\n2 + 2 = **4**";

/// Language model with a canned reply that records every prompt.
pub struct FakeModel {
    reply: Result<Option<String>, CapabilityError>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Ok(Some(text.to_string())))
    }

    pub fn with(reply: Result<Option<String>, CapabilityError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, CapabilityError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

/// Extractor fake usable as both OCR and PDF engine.
pub struct FakeExtractor {
    reply: Result<String, CapabilityError>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn returning(text: &str) -> Arc<Self> {
        Self::with(Ok(text.to_string()))
    }

    pub fn with(reply: Result<String, CapabilityError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeExtractor {
    async fn recognize(&self, _image: &[u8], _mime: &str) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

#[async_trait]
impl PdfTextEngine for FakeExtractor {
    async fn extract_text(&self, _pdf: &[u8]) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

/// OCR engine with a bug.
pub struct PanickingOcr;

#[async_trait]
impl OcrEngine for PanickingOcr {
    async fn recognize(&self, _image: &[u8], _mime: &str) -> Result<String, CapabilityError> {
        panic!("ocr backend exploded");
    }
}

/// Records every stage the solver reports.
#[derive(Default)]
pub struct StageLog {
    pub stages: Mutex<Vec<Stage>>,
    pub extracted: Mutex<Vec<usize>>,
}

impl StageCallback for StageLog {
    fn on_stage(&self, stage: Stage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_extracted(&self, chars: usize) {
        self.extracted.lock().unwrap().push(chars);
    }
}

/// A solver plus handles on its fakes.
pub struct Harness {
    pub solver: Solver,
    pub model: Arc<FakeModel>,
    pub ocr: Arc<FakeExtractor>,
    pub pdf: Arc<FakeExtractor>,
}

impl Harness {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_fakes(
            config,
            FakeModel::replying(SOLUTION),
            FakeExtractor::returning("Q1. What is 2+2?"),
            FakeExtractor::returning("Q1. What is 2+2?"),
        )
    }

    pub fn with_fakes(
        config: SolverConfig,
        model: Arc<FakeModel>,
        ocr: Arc<FakeExtractor>,
        pdf: Arc<FakeExtractor>,
    ) -> Self {
        let solver = Solver::new(
            config,
            Capabilities {
                model: model.clone(),
                ocr: ocr.clone(),
                pdf: pdf.clone(),
            },
        );
        Self {
            solver,
            model,
            ocr,
            pdf,
        }
    }

    pub fn extractor_calls(&self) -> usize {
        self.ocr.calls() + self.pdf.calls()
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])));
    let mut buf = Vec::new();
    img.to_rgb8()
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";
