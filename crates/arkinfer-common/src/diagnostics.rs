use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const MEMBER_LOOKUP_ON_NON_CLASS: u32 = 9001;
    pub const UNRESOLVED_INVOKE: u32 = 9002;
    pub const RECURSION_LIMIT_REACHED: u32 = 9003;
    pub const STATEMENT_INFERENCE_FAILED: u32 = 9004;
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const MEMBER_LOOKUP_ON_NON_CLASS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::MEMBER_LOOKUP_ON_NON_CLASS,
        category: DiagnosticCategory::Warning,
        message: "Cannot look up member '{0}' on type '{1}': not a class or namespace.",
    };
    pub const UNRESOLVED_INVOKE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_INVOKE,
        category: DiagnosticCategory::Warning,
        message: "Cannot resolve call target '{0}'.",
    };
    pub const RECURSION_LIMIT_REACHED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::RECURSION_LIMIT_REACHED,
        category: DiagnosticCategory::Warning,
        message: "Recursion limit reached while resolving '{0}'.",
    };
    pub const STATEMENT_INFERENCE_FAILED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::STATEMENT_INFERENCE_FAILED,
        category: DiagnosticCategory::Warning,
        message: "Type inference failed for statement '{0}' in method '{1}'.",
    };

    pub const ALL: &[DiagnosticMessage] = &[
        MEMBER_LOOKUP_ON_NON_CLASS,
        UNRESOLVED_INVOKE,
        RECURSION_LIMIT_REACHED,
        STATEMENT_INFERENCE_FAILED,
    ];
}

/// A non-fatal finding produced while inferring types.
///
/// `line` and `column` are 1-based; zero means the position is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn warning(file: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            code,
            file: file.into(),
            line: 0,
            column: 0,
            message_text: message.into(),
        }
    }

    /// Build a diagnostic from a message template and its `{N}` arguments.
    pub fn from_message(
        file: impl Into<String>,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            category: message.category,
            code: message.code,
            file: file.into(),
            line: 0,
            column: 0,
            message_text: format_message(message.message, args),
        }
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    diagnostic_messages::ALL
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
