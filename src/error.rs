//! Unified error types for the relay module firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! travel through the register map and the service without allocation.
//!
//! The pipeline cycle itself never fails; errors only arise at the
//! configuration boundary and during peripheral setup.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A register access was refused.
    Register(RegisterError),
    /// A configuration aggregate failed validation.
    Config(ConfigError),
    /// A GPIO bank could not be read or written.
    Io(IoError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(e) => write!(f, "register: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Register access errors
// ---------------------------------------------------------------------------

/// Refusals of the register map.  Each maps onto a Modbus exception code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// No field is published at this address.
    IllegalAddress,
    /// The field exists but the value is outside its accepted range.
    IllegalValue,
    /// The field exists but cannot be written.
    ReadOnly,
}

impl RegisterError {
    /// Modbus exception code reported by the transport.
    pub const fn exception_code(self) -> u8 {
        match self {
            Self::IllegalAddress => 0x02,
            Self::IllegalValue => 0x03,
            Self::ReadOnly => 0x04,
        }
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalAddress => write!(f, "illegal data address"),
            Self::IllegalValue => write!(f, "illegal data value"),
            Self::ReadOnly => write!(f, "read-only field"),
        }
    }
}

impl From<RegisterError> for Error {
    fn from(e: RegisterError) -> Self {
        Self::Register(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.  The string names the field.
    ValidationFailed(&'static str),
    /// A serialized config could not be decoded.
    Corrupted,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Corrupted => write!(f, "config corrupted"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ConfigError> for RegisterError {
    fn from(_: ConfigError) -> Self {
        Self::IllegalValue
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    InputReadFailed,
    OutputWriteFailed,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputReadFailed => write!(f, "input read failed"),
            Self::OutputWriteFailed => write!(f, "output write failed"),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
