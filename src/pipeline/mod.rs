//! Pipeline stages shared by both conversion directions.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the JPEG codec) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! PDF → JPEG:  input ──▶ (engine::raster) ──▶ encode
//!              (gate)      (pdfium pages)      (JPEG bytes)
//!
//! JPEG → PDF:  input ──▶ decode ──▶ layout ──▶ (engine::compose)
//!              (gate)    (bitmap)   (fit+centre)  (printpdf pages)
//! ```
//!
//! 1. [`input`]  — wrap the user's bytes and gate them on magic numbers
//! 2. [`decode`] — decompress a selected JPEG into an RGB bitmap
//! 3. [`layout`] — pure page geometry: aspect-fit scaling and centring
//! 4. [`encode`] — JPEG-encode one rendered page at the configured quality
//!
//! The engines the stages feed live in [`crate::engine`]; they run under
//! `spawn_blocking` because pdfium and printpdf are not async-safe.

pub mod decode;
pub mod encode;
pub mod input;
pub mod layout;
