use translate_core::error::OcrError;
use translate_core::ocr::{OcrEngine, TesseractCli};

/// **VALUE**: Verifies that a missing engine binary is an error, not a panic.
///
/// **WHY THIS MATTERS**: Tesseract is an optional system package. Servers without it must
/// keep translating and answer OCR requests with a clear message.
///
/// **ENVIRONMENT-INDEPENDENT**: The binary name is made up, so this never finds a real engine.
#[tokio::test]
async fn given_missing_binary_when_recognizing_then_spawn_error() {
    // GIVEN: An engine pointing at a binary that does not exist
    let engine = TesseractCli::new("definitely-not-an-installed-ocr-engine");

    // WHEN: Recognizing
    let result = engine.recognize(b"not really an image", "eng").await;

    // THEN: Spawn error mentioning the binary
    match result {
        Err(OcrError::Spawn { message, .. }) => {
            assert!(message.contains("definitely-not-an-installed-ocr-engine"))
        }
        other => panic!("Expected Spawn error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_invalid_language_when_recognizing_then_rejected_before_spawn() {
    let engine = TesseractCli::new("definitely-not-an-installed-ocr-engine");

    let result = engine.recognize(b"image", "-c tessedit").await;

    assert!(matches!(result, Err(OcrError::InvalidLanguage { .. })));
}
