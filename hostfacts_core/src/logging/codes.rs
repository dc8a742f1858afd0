//! Event codes for broker diagnostics
//!
//! Single source of truth for the codes attached to warning and error log
//! lines, with a short description per code.

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Stable code attached to a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// Registry and graph construction codes
pub mod graph {
    use super::Code;

    pub const DUPLICATE_IDENTITY: Code = Code::new("HF001");
    pub const DEPENDENCY_CYCLE: Code = Code::new("HF002");
    pub const UNKNOWN_REFERENCE: Code = Code::new("HF003");
    pub const EMPTY_PROVIDER_GROUP: Code = Code::new("HF004");
}

/// Pass execution codes
pub mod execution {
    use super::Code;

    pub const COMPONENT_FAILED: Code = Code::new("HF010");
    pub const COMPONENT_PANICKED: Code = Code::new("HF011");
    pub const DUPLICATE_WRITE: Code = Code::new("HF012");
    pub const PASS_CANCELLED: Code = Code::new("HF013");
    pub const OBSERVER_PANICKED: Code = Code::new("HF014");
    pub const WORKER_PANICKED: Code = Code::new("HF015");
}

/// Configuration codes
pub mod config {
    use super::Code;

    pub const INVALID_VALUE: Code = Code::new("HF020");
    pub const UNREADABLE_FILE: Code = Code::new("HF021");
}

/// Short description for a code string
pub fn get_description(code: &str) -> &'static str {
    match code {
        "HF001" => "Component identity registered twice",
        "HF002" => "Dependency cycle between components",
        "HF003" => "Dependency references an identity that is not registered",
        "HF004" => "Alternative group has no providers",
        "HF010" => "Component returned an error",
        "HF011" => "Component panicked during invocation",
        "HF012" => "Outcome written twice for one identity",
        "HF013" => "Pass cancelled before all components were dispatched",
        "HF014" => "Observer panicked while handling an outcome",
        "HF015" => "Worker thread panicked outside component isolation",
        "HF020" => "Configuration value out of range",
        "HF021" => "Configuration file could not be read",
        _ => "Unknown code",
    }
}
