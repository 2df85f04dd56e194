use crate::credential::Credential;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency every monetary element is tagged with.
pub const CURRENCY: &str = "BRL";

/// Parses a loosely formatted number the way the gateway accepts it
/// (surrounding whitespace, sign and exponent allowed).
pub(crate) fn parse_number(input: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(input.trim()).ok()
}

// ============ Instruction Models ============

/// Payment methods offered to the payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Billet,
    Financing,
    Debit,
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Billet,
        PaymentMethod::Financing,
        PaymentMethod::Debit,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
    ];

    /// Resolves the caller-facing token (`billet`, `creditCard`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.token() == token)
    }

    pub fn token(&self) -> &'static str {
        match self {
            PaymentMethod::Billet => "billet",
            PaymentMethod::Financing => "financing",
            PaymentMethod::Debit => "debit",
            PaymentMethod::CreditCard => "creditCard",
            PaymentMethod::DebitCard => "debitCard",
        }
    }

    /// Value written inside `FormaPagamento`.
    pub fn element_value(&self) -> &'static str {
        match self {
            PaymentMethod::Billet => "BoletoBancario",
            PaymentMethod::Financing => "FinanciamentoBancario",
            PaymentMethod::Debit => "DebitoBancario",
            PaymentMethod::CreditCard => "CartaoCredito",
            PaymentMethod::DebitCard => "CartaoDebito",
        }
    }
}

/// How much payer data the gateway should expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Payer fills in their own data on the Moip checkout.
    #[default]
    Basic,
    /// Payer data is sent up front ("transparent" checkout).
    Identification,
}

impl ValidationMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Basic" => Some(ValidationMode::Basic),
            "Identification" => Some(ValidationMode::Identification),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Basic => write!(f, "Basic"),
            ValidationMode::Identification => write!(f, "Identification"),
        }
    }
}

/// Payer contact data. Every field is optional; `Identification` mode
/// requires most of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payer {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Merchant-side payer identifier.
    pub payer_id: Option<String>,
    /// National identity document (CPF).
    pub identity: Option<String>,
    /// Mobile phone.
    pub phone: Option<String>,
    pub billing_address: Option<BillingAddress>,
}

impl Payer {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.payer_id.is_none()
            && self.identity.is_none()
            && self.phone.is_none()
            && self.billing_address.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    #[serde(alias = "address")]
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    /// Landline phone.
    pub phone: Option<String>,
}

/// Billet due date, either relative or absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BilletExpiration {
    Days { count: String, working_days: bool },
    DueDate(String),
}

impl BilletExpiration {
    /// Numeric input is a day count; anything else is kept as a due date.
    pub fn from_input(expiration: &str, working_days: bool) -> Self {
        if parse_number(expiration).is_some() {
            BilletExpiration::Days {
                count: expiration.trim().to_string(),
                working_days,
            }
        } else {
            BilletExpiration::DueDate(expiration.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BilletTerms {
    pub expiration: BilletExpiration,
    pub instructions: Vec<String>,
    pub logo_url: Option<String>,
}

/// A share of the payment routed to a secondary receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionSplit {
    pub reason: String,
    pub receiver_login: String,
    pub value: String,
    pub is_percentage: bool,
    pub payer_pays_fee: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallmentInterest {
    None,
    Rate(String),
    TransferToPayer,
}

/// Installment plan offered for a range of parcel counts. Bounds that failed
/// validation are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentRule {
    pub min: Option<String>,
    pub max: Option<String>,
    pub interest: InstallmentInterest,
}

// ============ Response Models ============

/// Outcome of sending an instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstructionResult {
    pub success: bool,
    pub error: Option<String>,
    /// Gateway error code (`Codigo` attribute), when reported.
    pub error_code: Option<String>,
    pub token: Option<String>,
    /// Checkout URL the payer is redirected to. Only set on success.
    pub payment_url: Option<String>,
    /// Raw reply, for debugging.
    #[serde(skip)]
    pub raw_xml: String,
}

/// Parameters of an installment simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentQuery {
    /// Moip login of the receiving account.
    pub login: String,
    pub max_installments: u32,
    pub rate: String,
    pub simulated_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallmentRow {
    /// 1-based position in the reply.
    pub position: usize,
    pub total: String,
    pub rate: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallmentQuote {
    pub success: bool,
    pub installments: Vec<InstallmentRow>,
}

impl InstallmentQuote {
    /// Row at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&InstallmentRow> {
        self.installments.iter().find(|row| row.position == position)
    }
}

// ============ Request File Models ============

/// JSON scalar accepted where the gateway takes free-form numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => write!(f, "{}", text),
            Scalar::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Instruction described as JSON, one field per builder setter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructionRequest {
    pub environment: Option<String>,
    pub credential: Option<Credential>,
    pub validation_mode: Option<String>,
    pub unique_id: Option<String>,
    pub reason: Option<String>,
    pub payment_methods: Vec<String>,
    pub billet: Option<BilletRequest>,
    pub payer: Option<Payer>,
    pub value: Option<Scalar>,
    pub surcharge: Option<Scalar>,
    pub deduction: Option<Scalar>,
    pub messages: Vec<String>,
    pub return_url: Option<String>,
    pub notification_url: Option<String>,
    pub commissions: Vec<CommissionRequest>,
    pub installments: Vec<InstallmentRuleRequest>,
    pub receiver: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilletRequest {
    pub expiration: Scalar,
    #[serde(default)]
    pub working_days: bool,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRequest {
    pub reason: String,
    pub receiver: String,
    pub value: Scalar,
    #[serde(default)]
    pub percentage: bool,
    #[serde(default)]
    pub payer_pays_fee: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentRuleRequest {
    pub min: Scalar,
    pub max: Scalar,
    pub rate: Option<Scalar>,
    #[serde(default)]
    pub transfer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_tokens_round_trip_to_elements() {
        assert_eq!(
            PaymentMethod::from_token("creditCard").map(|m| m.element_value()),
            Some("CartaoCredito")
        );
        assert_eq!(PaymentMethod::from_token("billet"), Some(PaymentMethod::Billet));
        assert_eq!(PaymentMethod::from_token("cash"), None);
        assert_eq!(PaymentMethod::from_token("CreditCard"), None);
    }

    #[test]
    fn billet_expiration_detects_day_counts() {
        assert_eq!(
            BilletExpiration::from_input("5", true),
            BilletExpiration::Days {
                count: "5".to_string(),
                working_days: true
            }
        );
        assert_eq!(
            BilletExpiration::from_input("2026-12-01", false),
            BilletExpiration::DueDate("2026-12-01".to_string())
        );
    }

    #[test]
    fn payer_deserializes_original_keys() {
        let payer: Payer = serde_json::from_value(serde_json::json!({
            "name": "Maria",
            "payerId": "42",
            "billingAddress": { "address": "Rua A", "zipCode": "01000-000" }
        }))
        .unwrap();

        assert_eq!(payer.payer_id.as_deref(), Some("42"));
        let address = payer.billing_address.unwrap();
        assert_eq!(address.street.as_deref(), Some("Rua A"));
        assert_eq!(address.zip_code.as_deref(), Some("01000-000"));
    }

    #[test]
    fn scalar_accepts_numbers_and_strings() {
        let request: InstructionRequest =
            serde_json::from_str(r#"{"value": 100.5, "surcharge": "10.00"}"#).unwrap();
        assert_eq!(request.value.unwrap().to_string(), "100.5");
        assert_eq!(request.surcharge.unwrap().to_string(), "10.00");
    }

    #[test]
    fn parse_number_is_lenient_like_the_gateway() {
        assert!(parse_number(" 12 ").is_some());
        assert!(parse_number("2.5").is_some());
        assert!(parse_number("1e3").is_some());
        assert!(parse_number("").is_none());
        assert!(parse_number("abc").is_none());
    }
}
