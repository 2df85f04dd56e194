use std::fmt;

/// Problems recorded by the instruction builder.
///
/// These never abort a call chain. They accumulate on the builder in the
/// order they were detected and are inspected before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionError {
    /// The environment name is neither `development` nor `production`.
    UnknownEnvironment(String),
    /// Key is not 40 characters or token is not 32 characters.
    InvalidCredential,
    /// No credential was configured before an authenticated call.
    MissingCredential,
    /// Validation mode other than `Basic` or `Identification`.
    InvalidValidationMode(String),
    /// Payment method token outside the supported set.
    UnknownPaymentMethod(String),
    /// Transaction amount is blank or zero.
    MissingValue,
    /// Surcharge or deduction requested before the amount was set.
    ValuesNotSet(&'static str),
    /// Commission value is not a number.
    NonNumericCommission(String),
    /// Minimum installment count is not numeric or above 12.
    MinimumInstallmentsOutOfRange(String),
    /// Maximum installment count is not numeric or above 12.
    MaximumInstallmentsOutOfRange(String),
    /// Interest rate is not a number.
    NonNumericRate(String),
    /// Credential, reason or unique id is missing.
    MissingRequiredFields,
    /// Payer fields required under `Identification` mode are missing.
    MissingPayerFields(Vec<&'static str>),
}

impl fmt::Display for InstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionError::UnknownEnvironment(name) => write!(
                f,
                "Environment '{}' not found, type [development] or [production]",
                name
            ),
            InstructionError::InvalidCredential => write!(f, "Error: credential invalid"),
            InstructionError::MissingCredential => write!(
                f,
                "You must specify the credentials (token / key) and environment"
            ),
            InstructionError::InvalidValidationMode(mode) => write!(
                f,
                "Error: The validation mode must be 'Basic' or 'Identification', got '{}'",
                mode
            ),
            InstructionError::UnknownPaymentMethod(method) => {
                write!(f, "Error: Payment method '{}' unavailable", method)
            }
            InstructionError::MissingValue => {
                write!(f, "Error: The transaction amount must be specified.")
            }
            InstructionError::ValuesNotSet(field) => {
                write!(f, "Error: [setValue] must be called before [{}]", field)
            }
            InstructionError::NonNumericCommission(value) => {
                write!(f, "Error: Commission value '{}' must be numeric.", value)
            }
            InstructionError::MinimumInstallmentsOutOfRange(min) => write!(
                f,
                "Error: Minimum parcel '{}' must be numeric and can not be greater than 12.",
                min
            ),
            InstructionError::MaximumInstallmentsOutOfRange(max) => write!(
                f,
                "Error: Maximum parcel '{}' must be numeric and can not be greater than 12.",
                max
            ),
            InstructionError::NonNumericRate(rate) => {
                write!(f, "Error: Rate '{}' must be numeric", rate)
            }
            InstructionError::MissingRequiredFields => write!(
                f,
                "[setCredential], [setReason] and [setUniqueID] are required"
            ),
            InstructionError::MissingPayerFields(fields) => {
                let listed: Vec<String> = fields.iter().map(|field| format!("[{}]", field)).collect();
                write!(
                    f,
                    "Error: The following data required were not informed: {}.",
                    listed.join(" ")
                )
            }
        }
    }
}

impl std::error::Error for InstructionError {}

/// Errors returned by operations that leave the builder: rendering,
/// transport and response parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkError {
    /// Transport-level failure. Displays the collaborator's message verbatim.
    Transport(String),
    /// Gateway reply could not be parsed.
    Parse(String),
    /// Instruction carries recorded errors and was not sent.
    Validation(Vec<InstructionError>),
    /// Invalid client configuration.
    Configuration(String),
    /// XML document could not be written.
    Render(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<SdkError>,
        /// Additional context message.
        context: String,
    },
}

impl SdkError {
    /// Errors recorded on the instruction, when this is a validation refusal.
    pub fn validation_errors(&self) -> &[InstructionError] {
        match self {
            SdkError::Validation(errors) => errors,
            SdkError::WithContext { source, .. } => source.validation_errors(),
            _ => &[],
        }
    }
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::Transport(msg) => write!(f, "{}", msg),
            SdkError::Parse(msg) => write!(f, "Response parse error: {}", msg),
            SdkError::Validation(errors) => {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "Instruction is invalid: {}", messages.join("; "))
            }
            SdkError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            SdkError::Render(msg) => write!(f, "XML render error: {}", msg),
            SdkError::WithContext { source, context } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for SdkError {}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Transport(err.to_string())
    }
}

impl From<quick_xml::DeError> for SdkError {
    fn from(err: quick_xml::DeError) -> Self {
        SdkError::Parse(err.to_string())
    }
}

impl From<quick_xml::Error> for SdkError {
    fn from(err: quick_xml::Error) -> Self {
        SdkError::Render(err.to_string())
    }
}

impl From<url::ParseError> for SdkError {
    fn from(err: url::ParseError) -> Self {
        SdkError::Configuration(format!("invalid URL: {}", err))
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `SdkError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, SdkError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, SdkError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, SdkError> {
    fn context(self, context: impl Into<String>) -> Result<T, SdkError> {
        self.map_err(|e| SdkError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, SdkError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SdkError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
