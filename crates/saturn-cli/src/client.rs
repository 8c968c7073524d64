//! Shared context, error types, and result settling for command handlers.

use std::fmt::{self, Display, Formatter};

use saturn_ajax::{Ajax, AjaxError, AjaxResponse, AjaxResult, ClientContext, Signal};

use crate::cli::OutputFormat;

/// Exit code of a command interrupted with Ctrl-C.
pub(crate) const EXIT_CANCELLED: i32 = 130;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Cancelled,
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Cancelled => EXIT_CANCELLED,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::Cancelled => "cancelled".to_string(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) client: ClientContext,
    pub(crate) signal: Signal,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Facades bound to the command's signal.
    pub(crate) fn ajax(&self) -> Ajax {
        Ajax::new(&self.client, &self.signal)
    }
}

/// Unwrap a facade result; a fired signal becomes [`CliError::Cancelled`].
pub(crate) fn settle<T>(result: AjaxResult<T>) -> CliResult<T> {
    match result {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(CliError::Cancelled),
        Err(err) => Err(classify(err)),
    }
}

/// Client errors (4xx, missing credentials) are the caller's to fix; the rest
/// are operational failures.
pub(crate) fn classify(err: AjaxError) -> CliError {
    match err {
        AjaxError::MissingSession => {
            CliError::validation("a bearer token is required (pass --token or set SATURN_TOKEN)")
        }
        AjaxError::Status { ref response } if (400..500).contains(&response.status) => {
            CliError::validation(rejection_message(response))
        }
        other => CliError::failure(other),
    }
}

fn rejection_message(response: &AjaxResponse) -> String {
    let body = response.text();
    let body = body.trim();
    if body.is_empty() {
        format!("request rejected with status {}", response.status)
    } else {
        format!("request rejected with status {}: {body}", response.status)
    }
}

#[cfg(test)]
pub(crate) fn test_context(base_url: &str, output: OutputFormat) -> anyhow::Result<AppContext> {
    use std::sync::Arc;

    use saturn_ajax::{MockSwitch, Session};

    let client = ClientContext::builder(saturn_test_support::config_for(base_url))
        .mock(Arc::new(MockSwitch::new()))
        .session(Session::signed_in("cli-token"))
        .build()?;
    Ok(AppContext {
        client,
        signal: Signal::new(),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturn_ajax::TransportError;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow::anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::Cancelled.exit_code(), 130);
    }

    #[test]
    fn client_errors_are_validation_failures() {
        let rejected = AjaxError::Status {
            response: Box::new(AjaxResponse::synthetic("http://sam.test", 404, "no such group\n")),
        };
        assert!(matches!(
            classify(rejected),
            CliError::Validation(message) if message == "request rejected with status 404: no such group"
        ));

        let server = AjaxError::Status {
            response: Box::new(AjaxResponse::synthetic("http://sam.test", 503, "")),
        };
        assert_eq!(classify(server).exit_code(), 3);

        let network = AjaxError::Network {
            url: "http://sam.test".to_string(),
            source: TransportError::SimulatedNoConnection,
        };
        assert_eq!(classify(network).exit_code(), 3);
        assert_eq!(classify(AjaxError::MissingSession).exit_code(), 2);
    }

    #[test]
    fn settle_maps_cancellation() {
        let cancelled: AjaxResult<u8> = Ok(None);
        assert!(matches!(settle(cancelled), Err(CliError::Cancelled)));
        let done: AjaxResult<u8> = Ok(Some(7));
        assert!(matches!(settle(done), Ok(7)));
    }
}
