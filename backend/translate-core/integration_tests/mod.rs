mod helpers;
mod models;
mod ocr;
mod translation;
