//! Exit codes for the wx-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//! They are stable.

use wx_common::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// The safety gate halted automation
    SafetyHalt = 4,

    /// Configuration error
    ConfigError = 10,

    /// Unknown brand/state/metro or invalid argument
    InputError = 11,

    /// I/O error, including unreadable registry snapshots
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::InputError,
            32 | 60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping() {
        assert_eq!(
            ExitCode::from(&Error::Config("x".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from(&Error::UnknownBrand("acme".into())),
            ExitCode::InputError
        );
        assert_eq!(
            ExitCode::from(&Error::SnapshotIncompatible("v2".into())),
            ExitCode::IoError
        );
        assert_eq!(
            ExitCode::from(&Error::NumericalInstability("nan".into())),
            ExitCode::InternalError
        );
    }

    #[test]
    fn classification() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::SafetyHalt.is_error());
        assert!(ExitCode::IoError.is_error());
        assert_eq!(i32::from(ExitCode::SafetyHalt), 4);
    }
}
