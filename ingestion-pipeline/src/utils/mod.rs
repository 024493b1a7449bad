pub mod audio_transcription;
pub mod image_ocr;
pub mod pdf_extraction;
