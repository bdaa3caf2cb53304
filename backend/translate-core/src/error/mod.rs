pub mod ocr;
pub mod upstream;

pub use ocr::OcrError;
pub use upstream::UpstreamError;
