// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process exit codes following Unix conventions (BSD sysexits.h).

use std::fmt;

/// Exit codes the server binary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful termination (0)
    #[default]
    Success = 0,
    /// General error (1)
    Error = 1,
    /// Command line usage error (64)
    UsageError = 64,
    /// Data format error (65) — malformed configuration
    DataError = 65,
    /// Cannot open input (66) — config file missing or unreadable
    NoInput = 66,
    /// Service unavailable (69) — cannot bind or reach the database
    Unavailable = 69,
    /// Internal software error (70)
    Software = 70,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sysexits() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::UsageError.code(), 64);
        assert_eq!(ExitCode::DataError.code(), 65);
        assert_eq!(ExitCode::NoInput.code(), 66);
        assert_eq!(ExitCode::Unavailable.code(), 69);
        assert_eq!(ExitCode::Software.code(), 70);
    }
}
