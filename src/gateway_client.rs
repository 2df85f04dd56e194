use crate::config::Config;
use crate::errors::{InstructionError, ResultExt, SdkError};
use crate::instruction::InstructionBuilder;
use crate::models::{InstallmentQuery, InstallmentQuote, InstructionResult};
use crate::response;
use crate::transport::{HttpTransport, Transport};
use crate::validator;
use std::time::Duration;
use url::Url;

/// Path of the single-instruction endpoint.
pub const INSTRUCTION_PATH: &str = "/ws/alpha/EnviarInstrucao/Unica";
/// Path segments of the installment simulation endpoint.
pub const INSTALLMENT_SEGMENTS: [&str; 3] = ["ws", "alpha", "ChecarValoresParcelamento"];

/// Client for submitting instructions to Moip.
///
/// Environment and credential come from the instruction itself; the client
/// only owns the transport.
#[derive(Clone)]
pub struct GatewayClient<T = HttpTransport> {
    transport: T,
    base_url_override: Option<String>,
}

impl GatewayClient<HttpTransport> {
    /// Creates a client backed by reqwest.
    pub fn new(timeout: Duration) -> Result<Self, SdkError> {
        Ok(Self::with_transport(HttpTransport::new(timeout)?))
    }

    pub fn from_config(config: &Config) -> Result<Self, SdkError> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

impl<T: Transport> GatewayClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url_override: None,
        }
    }

    /// Sends requests to `base_url` instead of the instruction's environment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn base_url<'a>(&'a self, instruction: &InstructionBuilder) -> &'a str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| instruction.environment().base_url())
    }

    /// Sends an instruction.
    ///
    /// Instructions with recorded errors, or failing the checks of their
    /// validation mode, are refused without contacting the gateway.
    pub async fn send(
        &self,
        instruction: &InstructionBuilder,
    ) -> Result<InstructionResult, SdkError> {
        let mut errors = instruction.errors().to_vec();
        errors.extend(validator::check(instruction, instruction.mode()));
        let credential = match instruction.credential() {
            Some(credential) if errors.is_empty() => credential,
            _ => {
                tracing::warn!(
                    "Refusing to send instruction with {} error(s)",
                    errors.len()
                );
                return Err(SdkError::Validation(errors));
            }
        };

        let xml = instruction.render().context("Failed to render instruction")?;
        let base_url = self.base_url(instruction);
        let url = format!("{}{}", base_url, INSTRUCTION_PATH);
        tracing::info!(
            "Sending instruction to Moip {}: {}",
            instruction.environment().display_name(),
            url
        );

        let outcome = self
            .transport
            .post(&credential.authorization(), &url, &xml)
            .await;
        let result = response::interpret_instruction(&outcome, base_url)?;

        if result.success {
            tracing::info!("✓ Instruction accepted by Moip");
        } else {
            tracing::warn!(
                "Moip rejected instruction: {}",
                result.error.as_deref().unwrap_or("no error message")
            );
        }
        Ok(result)
    }

    /// Simulates installments for a receiving account.
    pub async fn query_installments(
        &self,
        instruction: &InstructionBuilder,
        query: &InstallmentQuery,
    ) -> Result<InstallmentQuote, SdkError> {
        let credential = instruction
            .credential()
            .ok_or_else(|| SdkError::Validation(vec![InstructionError::MissingCredential]))?;

        let url = self
            .installment_url(instruction, query)
            .with_context(|| format!("Invalid installment query for {}", query.login))?;
        tracing::info!("Querying Moip installments for {}", query.login);

        let outcome = self.transport.get(&credential.authorization(), url.as_str()).await;
        let quote = response::interpret_installments(&outcome)?;

        tracing::info!("Received {} installment option(s)", quote.installments.len());
        Ok(quote)
    }

    fn installment_url(
        &self,
        instruction: &InstructionBuilder,
        query: &InstallmentQuery,
    ) -> Result<Url, SdkError> {
        let mut url = Url::parse(self.base_url(instruction))?;
        let max_installments = query.max_installments.to_string();
        url.path_segments_mut()
            .map_err(|_| SdkError::Configuration("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(INSTALLMENT_SEGMENTS)
            .extend([
                query.login.as_str(),
                max_installments.as_str(),
                query.rate.as_str(),
                query.simulated_value.as_str(),
            ]);
        Ok(url)
    }
}
