//! Shared fixtures for integration tests: in-memory PDFs, fake OCR plugins
//! and a scripted browser session.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, GrayImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use seidoc::ocr::TesseractConfig;
use seidoc::plugins::{OcrBackend, PageRasterizer, Plugin};
use seidoc::retrieval::{BrowserSession, DriverResult, RetrievalFailure, Selector};
use seidoc::{Result, SeidocError, SourceDocument};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Build a PDF whose pages carry the given text, one line per text object.
/// An empty string produces a page with no text layer.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_text in pages {
        let mut operations = Vec::new();
        for (idx, line) in page_text.lines().filter(|l| !l.is_empty()).enumerate() {
            let y = 800 - (idx as i64) * 16;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
            operations.push(Operation::new("Td", vec![40.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Rasterizer that renders blank pages without touching the PDF.
pub struct FakeRasterizer {
    pub pages: usize,
    pub rendered: AtomicUsize,
}

impl FakeRasterizer {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            rendered: AtomicUsize::new(0),
        }
    }
}

impl Plugin for FakeRasterizer {
    fn name(&self) -> &str {
        "fake-rasterizer"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PageRasterizer for FakeRasterizer {
    async fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize> {
        Ok(self.pages)
    }

    async fn render_page(&self, _pdf_bytes: &[u8], page_number: usize, _dpi: u32) -> Result<DynamicImage> {
        if page_number == 0 || page_number > self.pages {
            return Err(SeidocError::validation(format!("no page {}", page_number)));
        }
        self.rendered.fetch_add(1, Ordering::SeqCst);
        Ok(DynamicImage::ImageLuma8(GrayImage::from_pixel(24, 24, image::Luma([255]))))
    }
}

/// OCR backend that returns scripted page texts in call order.
pub struct ScriptedOcr {
    pages: Mutex<VecDeque<std::result::Result<String, String>>>,
    pub calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedOcr {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: Mutex::new(pages.iter().map(|p| Ok(p.to_string())).collect()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Pages whose entry is `Err` fail recognition.
    pub fn with_results(results: Vec<std::result::Result<&str, &str>>) -> Self {
        Self {
            pages: Mutex::new(
                results
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn slow(pages: &[&str], delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(pages)
        }
    }
}

impl Plugin for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted-ocr"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl OcrBackend for ScriptedOcr {
    async fn process_file(&self, _path: &Path, _config: &TesseractConfig) -> Result<String> {
        Err(SeidocError::ocr("scripted backend only takes images"))
    }

    async fn process_image(&self, _image: GrayImage, _config: &TesseractConfig) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.pages.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(SeidocError::ocr(message)),
            None => Ok(String::new()),
        }
    }
}

/// Browser operations a scripted session can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Goto,
    Fill,
    PressEnter,
    Click,
    NetworkIdle,
    EnterFrame,
    Download,
}

/// A browser session that records every call and follows a script.
pub struct ScriptedSession {
    pub calls: Vec<String>,
    pub dialogs: VecDeque<String>,
    pub accepted_dialogs: Vec<String>,
    pub closed: bool,
    failure: Option<(Op, Option<String>, RetrievalFailure)>,
    hang_on: Option<Op>,
    download: SourceDocument,
}

impl ScriptedSession {
    pub fn new(download: SourceDocument) -> Self {
        Self {
            calls: Vec::new(),
            dialogs: VecDeque::new(),
            accepted_dialogs: Vec::new(),
            closed: false,
            failure: None,
            hang_on: None,
            download,
        }
    }

    /// Fail the first call of `op` (restricted to `selector` when given).
    pub fn failing(mut self, op: Op, selector: Option<&str>, failure: RetrievalFailure) -> Self {
        self.failure = Some((op, selector.map(str::to_string), failure));
        self
    }

    /// Never complete calls of `op`.
    pub fn hanging(mut self, op: Op) -> Self {
        self.hang_on = Some(op);
        self
    }

    pub fn with_dialog(mut self, text: &str) -> Self {
        self.dialogs.push_back(text.to_string());
        self
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls.iter().any(|c| c == call)
    }

    async fn script(&mut self, op: Op, selector: Option<&Selector>) -> DriverResult<()> {
        if self.hang_on == Some(op) {
            std::future::pending::<()>().await;
        }
        let matches = match &self.failure {
            Some((failing_op, wanted, _)) => {
                *failing_op == op
                    && wanted
                        .as_deref()
                        .is_none_or(|w| selector.map(Selector::value) == Some(w))
            }
            None => false,
        };
        if matches && let Some((_, _, failure)) = self.failure.take() {
            return Err(failure);
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> DriverResult<()> {
        self.calls.push(format!("goto {}", url));
        self.script(Op::Goto, None).await
    }

    async fn fill(&mut self, selector: &Selector, value: &str, _timeout: Duration) -> DriverResult<()> {
        self.calls.push(format!("fill {}={}", selector, value));
        self.script(Op::Fill, Some(selector)).await
    }

    async fn press_enter(&mut self, selector: &Selector, _timeout: Duration) -> DriverResult<()> {
        self.calls.push(format!("enter {}", selector));
        self.script(Op::PressEnter, Some(selector)).await
    }

    async fn click(&mut self, selector: &Selector, _timeout: Duration) -> DriverResult<()> {
        self.calls.push(format!("click {}", selector));
        self.script(Op::Click, Some(selector)).await
    }

    async fn wait_for_network_idle(&mut self, _timeout: Duration) -> DriverResult<()> {
        self.calls.push("idle".to_string());
        self.script(Op::NetworkIdle, None).await
    }

    async fn enter_frame(&mut self, selector: &Selector, _timeout: Duration) -> DriverResult<()> {
        self.calls.push(format!("frame {}", selector));
        self.script(Op::EnterFrame, Some(selector)).await
    }

    async fn leave_frame(&mut self) -> DriverResult<()> {
        self.calls.push("leave-frame".to_string());
        Ok(())
    }

    async fn click_and_download(&mut self, selector: &Selector, _timeout: Duration) -> DriverResult<SourceDocument> {
        self.calls.push(format!("download {}", selector));
        self.script(Op::Download, Some(selector)).await?;
        Ok(self.download.clone())
    }

    async fn accept_dialog(&mut self) -> DriverResult<Option<String>> {
        let dialog = self.dialogs.pop_front();
        if let Some(text) = &dialog {
            self.accepted_dialogs.push(text.clone());
        }
        Ok(dialog)
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        Ok(())
    }
}
