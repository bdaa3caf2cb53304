mod helpers;
mod models;
mod ocr;
mod service;
mod translate;
