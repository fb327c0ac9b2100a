//! Core library for the event-registration redemption tooling
//!
//! This crate provides everything the batch binaries share: redemption code
//! generation with the guessability filter, pool persistence, keyed QR
//! payload signatures, and QR image rendering with logo composition.

pub mod code;
pub mod pool;
pub mod qr;
pub mod signature;

pub use code::Code;
pub use pool::{CodeStatus, PoolEntry};
pub use qr::QrStyle;
pub use signature::SigningKey;

use std::path::PathBuf;

/// Errors produced by pool generation, signing and QR rendering
#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
    #[error("invalid code {text:?}: {reason}")]
    InvalidCode { text: String, reason: &'static str },

    #[error("code space exhausted after {attempts} draws: wanted {wanted} codes, accepted {got}")]
    PoolExhausted {
        wanted: usize,
        got: usize,
        attempts: u64,
    },

    #[error("malformed pool row {record}: {reason}")]
    MalformedRow { record: u64, reason: String },

    #[error("signing key must not be empty")]
    EmptyKey,

    #[error("logo file not found: {0}")]
    LogoMissing(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("QR encoding error: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

pub type Result<T> = std::result::Result<T, RedeemError>;
