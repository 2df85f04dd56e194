//! Interpretation of the gateway's XML replies.

use crate::errors::SdkError;
use crate::models::{InstallmentQuote, InstallmentRow, InstructionResult};
use crate::transport::TransportOutcome;
use serde::Deserialize;

/// `Status` value the gateway uses for accepted requests.
pub const STATUS_SUCCESS: &str = "Sucesso";
/// Path appended to the environment base URL to build the checkout link.
pub const PAYMENT_PATH: &str = "/Instrucao.do?token=";

// The root element differs per call (and carries a namespace prefix), so only
// its `Resposta` child is modelled.
#[derive(Debug, Deserialize)]
struct ReplyDocument {
    #[serde(rename = "Resposta")]
    reply: Reply,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Erro", default)]
    errors: Vec<ErrorNode>,
    #[serde(rename = "Token", default)]
    token: Option<String>,
    #[serde(rename = "ValorDaParcela", default)]
    installments: Vec<InstallmentNode>,
}

#[derive(Debug, Deserialize)]
struct ErrorNode {
    #[serde(rename = "@Codigo", default)]
    code: Option<String>,
    #[serde(rename = "$text", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct InstallmentNode {
    #[serde(rename = "@Total", default)]
    total: String,
    #[serde(rename = "@Juros", default)]
    rate: String,
    #[serde(rename = "@Valor", default)]
    value: String,
}

fn parse_reply(body: &str) -> Result<Reply, SdkError> {
    let document: ReplyDocument = quick_xml::de::from_str(body)?;
    Ok(document.reply)
}

/// Interprets the outcome of posting an instruction.
///
/// A transport failure is returned as [`SdkError::Transport`] carrying the
/// collaborator's message unchanged; the body is not looked at.
pub fn interpret_instruction(
    outcome: &TransportOutcome,
    base_url: &str,
) -> Result<InstructionResult, SdkError> {
    if !outcome.success {
        return Err(SdkError::Transport(outcome.error.clone()));
    }
    parse_instruction_response(&outcome.body, base_url)
}

/// Parses an `EnviarInstrucaoUnicaResponse` body.
pub fn parse_instruction_response(
    body: &str,
    base_url: &str,
) -> Result<InstructionResult, SdkError> {
    let reply = parse_reply(body)?;
    let success = reply.status.trim() == STATUS_SUCCESS;
    let token = reply
        .token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let first_error = reply.errors.into_iter().next();

    let (error, error_code) = match (success, first_error) {
        (false, Some(node)) => (Some(node.message.trim().to_string()), node.code),
        _ => (None, None),
    };
    let payment_url = match (&token, success) {
        (Some(token), true) => Some(format!("{}{}{}", base_url, PAYMENT_PATH, token)),
        _ => None,
    };

    Ok(InstructionResult {
        success,
        error,
        error_code,
        token,
        payment_url,
        raw_xml: body.to_string(),
    })
}

/// Interprets the outcome of an installment simulation.
pub fn interpret_installments(outcome: &TransportOutcome) -> Result<InstallmentQuote, SdkError> {
    if !outcome.success {
        return Err(SdkError::Transport(outcome.error.clone()));
    }
    parse_installment_response(&outcome.body)
}

/// Parses a `ChecarValoresParcelamentoResponse` body. Rows keep document
/// order and are numbered from 1.
pub fn parse_installment_response(body: &str) -> Result<InstallmentQuote, SdkError> {
    let reply = parse_reply(body)?;
    let installments = reply
        .installments
        .into_iter()
        .enumerate()
        .map(|(index, node)| InstallmentRow {
            position: index + 1,
            total: node.total,
            rate: node.rate,
            value: node.value,
        })
        .collect();

    Ok(InstallmentQuote {
        success: reply.status.trim() == STATUS_SUCCESS,
        installments,
    })
}
