//! Test helpers: run the real router on an ephemeral port.

use translator::routes::router;
use translator::state::AppState;

use translate_core::error::OcrError;
use translate_core::ocr::{OcrEngine, Recognition};
use translate_core::upstream::{UpstreamClient, UpstreamOptions};

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "sk-test-key-12345";
pub const DEFAULT_IMAGE_LIMIT: usize = 1024 * 1024;

/// Test helper: upstream client without browser headers and a short timeout.
pub fn upstream() -> UpstreamClient {
    UpstreamClient::new(UpstreamOptions {
        browser_headers: false,
        request_timeout: Duration::from_secs(5),
        ..UpstreamOptions::default()
    })
    .expect("Failed to build upstream client")
}

/// Test helper: serve `state` on 127.0.0.1 and return its base URL.
pub async fn spawn_service(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, router(Arc::new(state)))
            .await
            .expect("Test server failed");
    });

    format!("http://{addr}")
}

/// Test helper: service with OCR disabled.
pub async fn spawn_without_ocr() -> String {
    spawn_service(AppState::new(upstream(), None, "eng", DEFAULT_IMAGE_LIMIT)).await
}

/// OCR engine returning a canned result and recording what it was asked.
pub struct StubOcr {
    recognition: Recognition,
    calls: Mutex<Vec<(Vec<u8>, String)>>,
}

impl StubOcr {
    pub fn new(text: &str, confidence: u8) -> Arc<Self> {
        Arc::new(Self {
            recognition: Recognition {
                text: text.to_string(),
                confidence,
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Vec<u8>, String)> {
        self.calls.lock().expect("stub lock").clone()
    }
}

impl OcrEngine for StubOcr {
    fn recognize<'a>(
        &'a self,
        image: &'a [u8],
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Recognition, OcrError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .expect("stub lock")
                .push((image.to_vec(), language.to_string()));
            Ok(self.recognition.clone())
        })
    }
}

/// OCR engine that always fails the way a missing binary does.
pub struct FailingOcr;

impl OcrEngine for FailingOcr {
    fn recognize<'a>(
        &'a self,
        _image: &'a [u8],
        _language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Recognition, OcrError>> + Send + 'a>> {
        Box::pin(async { Err(OcrError::engine("OCR processing failed (exit status: 1)")) })
    }
}
