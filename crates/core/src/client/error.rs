use thiserror::Error;

/// Which exchange with the service failed; selects the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    Recommend,
    History,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::Register => "register",
            Operation::Recommend => "recommend",
            Operation::History => "history",
        }
    }

    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Register => "Registration failed",
            Operation::Recommend => "Failed to fetch recommendations. Ensure backend is running.",
            Operation::History => "Failed to fetch history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Validation,
    Server,
    Network,
}

/// Normalized failure of a single service call. `Display` is the
/// user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{message}")]
    Auth { operation: Operation, message: String },

    #[error("{message}")]
    Validation { operation: Operation, message: String },

    #[error("{message}")]
    Server { operation: Operation, message: String },

    #[error("{message}")]
    Network { operation: Operation, message: String },
}

impl ClientError {
    pub fn new(kind: ErrorKind, operation: Operation, server_message: Option<String>) -> Self {
        let message = server_message.unwrap_or_else(|| operation.fallback_message().to_string());
        match kind {
            ErrorKind::Auth => ClientError::Auth { operation, message },
            ErrorKind::Validation => ClientError::Validation { operation, message },
            ErrorKind::Server => ClientError::Server { operation, message },
            ErrorKind::Network => ClientError::Network { operation, message },
        }
    }

    /// No response was received at all.
    pub fn network(operation: Operation) -> Self {
        Self::new(ErrorKind::Network, operation, None)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Auth { .. } => ErrorKind::Auth,
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::Network { .. } => ErrorKind::Network,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Auth { operation, .. }
            | ClientError::Validation { operation, .. }
            | ClientError::Server { operation, .. }
            | ClientError::Network { operation, .. } => *operation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Auth { message, .. }
            | ClientError::Validation { message, .. }
            | ClientError::Server { message, .. }
            | ClientError::Network { message, .. } => message,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}
