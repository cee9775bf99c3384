use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SlabResult<T> = Result<T, SlabError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlabErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl SlabErrorCategory {
    pub const fn exit_class(self) -> ExitClass {
        match self {
            Self::Success => ExitClass {
                exit_code: 0,
                category_name: "Success",
            },
            Self::InputValidationError => ExitClass {
                exit_code: 2,
                category_name: "InputValidationError",
            },
            Self::IoSystemError => ExitClass {
                exit_code: 3,
                category_name: "IoSystemError",
            },
            Self::ComputationError => ExitClass {
                exit_code: 4,
                category_name: "ComputationError",
            },
            Self::InternalError => ExitClass {
                exit_code: 5,
                category_name: "InternalError",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_class().exit_code
    }

    pub const fn category_name(self) -> &'static str {
        self.exit_class().category_name
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitClass {
    pub exit_code: i32,
    pub category_name: &'static str,
}

/// Run-fatal error carried from the solver core up to the process boundary.
///
/// The `code` is a stable machine-readable identifier (`INPUT.GUIDANCE`,
/// `IO.SINK_WRITE`, ...); the message is the human-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlabError {
    category: SlabErrorCategory,
    code: &'static str,
    message: String,
}

impl SlabError {
    pub fn new(
        category: SlabErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SlabErrorCategory::InputValidationError, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SlabErrorCategory::IoSystemError, code, message)
    }

    pub fn computation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SlabErrorCategory::ComputationError, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SlabErrorCategory::InternalError, code, message)
    }

    pub const fn category(&self) -> SlabErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for SlabError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.category_name(),
            self.code,
            self.message
        )
    }
}

impl Error for SlabError {}

#[cfg(test)]
mod tests {
    use super::{SlabError, SlabErrorCategory};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (SlabErrorCategory::Success, 0, "Success"),
            (SlabErrorCategory::InputValidationError, 2, "InputValidationError"),
            (SlabErrorCategory::IoSystemError, 3, "IoSystemError"),
            (SlabErrorCategory::ComputationError, 4, "ComputationError"),
            (SlabErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, category_name) in cases {
            let class = category.exit_class();
            assert_eq!(class.exit_code, exit_code);
            assert_eq!(class.category_name, category_name);
        }
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = SlabError::input_validation(
            "INPUT.GUIDANCE",
            "core index 1.45 does not exceed substrate index 1.46",
        );

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.GUIDANCE] core index 1.45 does not exceed substrate index 1.46"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 2")
        );
    }
}
