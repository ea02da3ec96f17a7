//! Result tokens and exit codes

use ddns_core::ReconcileStatus;
use std::process::ExitCode;

/// Exit codes for the process
///
/// - 0: Every planned record was updated
/// - 1: Anything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdnsExitCode {
    Success = 0,
    Failure = 1,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// The single line printed on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Good,
    BadAuth,
    BadParam,
    /// Provider or partial update failure
    ServerError,
}

impl Output {
    pub fn token(&self) -> &'static str {
        match self {
            Output::Good => "good",
            Output::BadAuth => "badauth",
            Output::BadParam => "badparam",
            Output::ServerError => "911",
        }
    }

    pub fn exit_code(&self) -> DdnsExitCode {
        match self {
            Output::Good => DdnsExitCode::Success,
            _ => DdnsExitCode::Failure,
        }
    }

    /// Print the token and return the matching exit code
    pub fn emit(self) -> ExitCode {
        println!("{}", self.token());
        self.exit_code().into()
    }
}

impl From<ReconcileStatus> for Output {
    fn from(status: ReconcileStatus) -> Self {
        match status {
            ReconcileStatus::Succeeded => Output::Good,
            ReconcileStatus::AuthFailure => Output::BadAuth,
            ReconcileStatus::BadParameter | ReconcileStatus::InvalidAddress => Output::BadParam,
            ReconcileStatus::ProviderError | ReconcileStatus::PartiallyFailed => {
                Output::ServerError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tokens() {
        let cases = [
            (ReconcileStatus::Succeeded, "good"),
            (ReconcileStatus::AuthFailure, "badauth"),
            (ReconcileStatus::BadParameter, "badparam"),
            (ReconcileStatus::InvalidAddress, "badparam"),
            (ReconcileStatus::ProviderError, "911"),
            (ReconcileStatus::PartiallyFailed, "911"),
        ];

        for (status, token) in cases {
            assert_eq!(Output::from(status).token(), token, "{status:?}");
        }
    }

    #[test]
    fn test_only_good_exits_zero() {
        assert_eq!(Output::Good.exit_code(), DdnsExitCode::Success);
        assert_eq!(Output::BadAuth.exit_code(), DdnsExitCode::Failure);
        assert_eq!(Output::BadParam.exit_code(), DdnsExitCode::Failure);
        assert_eq!(Output::ServerError.exit_code(), DdnsExitCode::Failure);
    }
}
