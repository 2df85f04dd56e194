//! Builder for the `EnviarInstrucao/InstrucaoUnica` document.
//!
//! Setters only record field values (and any input problems). The document is
//! written once, by [`InstructionBuilder::render`], in the order the gateway
//! schema expects regardless of the order the setters were called in.

use crate::credential::Credential;
use crate::environment::Environment;
use crate::errors::{InstructionError, SdkError};
use crate::models::{
    parse_number, BilletExpiration, BilletTerms, CommissionSplit, InstallmentInterest,
    InstallmentRule, InstructionRequest, Payer, PaymentMethod, ValidationMode, CURRENCY,
};
use crate::validator;
use crate::xml_document::XmlDocument;
use bigdecimal::BigDecimal;
use std::fmt::Display;

/// Highest parcel count the gateway accepts in an installment rule.
pub const MAX_INSTALLMENTS: u32 = 12;

type XmlResult = Result<(), quick_xml::Error>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Values {
    amount: String,
    surcharges: Vec<String>,
    deductions: Vec<String>,
}

/// Accumulates a single payment instruction.
///
/// Invalid input never aborts a chain of calls: the problem is recorded in
/// [`errors`](Self::errors) and the call returns normally. Check
/// [`has_errors`](Self::has_errors) before trusting the rendered document.
#[derive(Debug, Clone, Default)]
pub struct InstructionBuilder {
    environment: Environment,
    credential: Option<Credential>,
    mode: ValidationMode,
    unique_ids: Vec<String>,
    reasons: Vec<String>,
    payment_methods: Vec<PaymentMethod>,
    billet: Option<BilletTerms>,
    payer: Option<Payer>,
    values: Vec<Values>,
    messages: Vec<String>,
    return_url: Option<String>,
    notification_url: Option<String>,
    commissions: Vec<CommissionSplit>,
    installments: Vec<InstallmentRule>,
    receiver: Option<String>,
    errors: Vec<InstructionError>,
}

impl InstructionBuilder {
    /// Creates an empty instruction targeting the sandbox in `Basic` mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an instruction from a JSON request description.
    pub fn from_request(request: &InstructionRequest) -> Self {
        let mut builder = Self::new();
        builder.apply_request(request);
        builder
    }

    fn record(&mut self, error: InstructionError) {
        tracing::warn!("Instruction error recorded: {}", error);
        self.errors.push(error);
    }

    pub fn set_environment(&mut self, name: &str) -> &mut Self {
        match name.parse::<Environment>() {
            Ok(environment) => self.environment = environment,
            Err(e) => self.record(e),
        }
        self
    }

    /// Stores the credential even when its shape is wrong.
    pub fn set_credential(&mut self, key: &str, token: &str) -> &mut Self {
        let credential = Credential::new(key, token);
        if !credential.is_well_formed() {
            self.record(InstructionError::InvalidCredential);
        }
        self.credential = Some(credential);
        self
    }

    /// Accepts `Basic` or `Identification`; anything else leaves the mode unchanged.
    pub fn set_validation_mode(&mut self, mode: &str) -> &mut Self {
        match ValidationMode::from_name(mode) {
            Some(mode) => self.mode = mode,
            None => self.record(InstructionError::InvalidValidationMode(mode.to_string())),
        }
        self
    }

    pub fn set_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Each call adds another `IdProprio`.
    pub fn set_unique_id(&mut self, id: impl Display) -> &mut Self {
        self.unique_ids.push(id.to_string());
        self
    }

    /// Each call adds another `Razao`.
    pub fn set_reason(&mut self, reason: impl Display) -> &mut Self {
        self.reasons.push(reason.to_string());
        self
    }

    pub fn add_payment_method(&mut self, method: &str) -> &mut Self {
        match PaymentMethod::from_token(method) {
            Some(method) => self.payment_methods.push(method),
            None => self.record(InstructionError::UnknownPaymentMethod(method.to_string())),
        }
        self
    }

    /// Billet configuration. Only the first call has any effect.
    ///
    /// A numeric `expiration` is a day count (working or calendar days per
    /// `count_working_days`); anything else is sent verbatim as the due date.
    pub fn set_billet_terms<I>(
        &mut self,
        expiration: impl Display,
        count_working_days: bool,
        instructions: I,
        logo_url: Option<&str>,
    ) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.billet.is_some() {
            tracing::debug!("Billet terms already set, ignoring");
            return self;
        }
        self.billet = Some(BilletTerms {
            expiration: BilletExpiration::from_input(&expiration.to_string(), count_working_days),
            instructions: instructions.into_iter().map(Into::into).collect(),
            logo_url: logo_url.map(str::to_string),
        });
        self
    }

    pub fn set_payer(&mut self, payer: Payer) -> &mut Self {
        self.payer = Some(payer);
        self
    }

    /// Transaction amount. Blank or zero is recorded as an error but the
    /// `Valores` block is still written.
    ///
    /// Every call appends its own `Valores` block; earlier amounts are kept.
    pub fn set_value(&mut self, amount: impl Display) -> &mut Self {
        let amount = amount.to_string();
        let missing = amount.trim().is_empty()
            || parse_number(&amount).is_some_and(|n| n == BigDecimal::from(0));
        if missing {
            self.record(InstructionError::MissingValue);
        }
        self.values.push(Values {
            amount,
            ..Values::default()
        });
        self
    }

    /// Extra charge (fees, shipping). Requires [`set_value`](Self::set_value) first.
    ///
    /// Surcharges and deductions always attach to the first `Valores` block.
    pub fn set_surcharge(&mut self, amount: impl Display) -> &mut Self {
        match self.values.first_mut() {
            Some(values) => values.surcharges.push(amount.to_string()),
            None => self.record(InstructionError::ValuesNotSet("setSurcharge")),
        }
        self
    }

    /// Discount. Requires [`set_value`](Self::set_value) first.
    pub fn set_deduction(&mut self, amount: impl Display) -> &mut Self {
        match self.values.first_mut() {
            Some(values) => values.deductions.push(amount.to_string()),
            None => self.record(InstructionError::ValuesNotSet("setDeduction")),
        }
        self
    }

    pub fn add_message(&mut self, message: impl Display) -> &mut Self {
        self.messages.push(message.to_string());
        self
    }

    /// First call wins.
    pub fn set_return_url(&mut self, url: &str) -> &mut Self {
        if self.return_url.is_some() {
            tracing::debug!("Return URL already set, ignoring {}", url);
        } else {
            self.return_url = Some(url.to_string());
        }
        self
    }

    /// First call wins.
    pub fn set_notification_url(&mut self, url: &str) -> &mut Self {
        if self.notification_url.is_some() {
            tracing::debug!("Notification URL already set, ignoring {}", url);
        } else {
            self.notification_url = Some(url.to_string());
        }
        self
    }

    /// Routes part of the payment to `receiver_login`, as a fixed amount or
    /// a percentage. With `payer_pays_fee` the receiver also pays the Moip fee.
    pub fn add_commission_split(
        &mut self,
        reason: &str,
        receiver_login: &str,
        value: impl Display,
        is_percentage: bool,
        payer_pays_fee: bool,
    ) -> &mut Self {
        let value = value.to_string();
        if parse_number(&value).is_none() {
            self.record(InstructionError::NonNumericCommission(value));
            return self;
        }
        self.commissions.push(CommissionSplit {
            reason: reason.to_string(),
            receiver_login: receiver_login.to_string(),
            value: value.trim().to_string(),
            is_percentage,
            payer_pays_fee,
        });
        self
    }

    /// Adds an installment rule. Out-of-range bounds are recorded and left
    /// out, but the rule itself is always added.
    ///
    /// With `transfer_interest_to_payer` the payer bears Moip's interest and
    /// `rate` is ignored.
    pub fn add_installment_rule(
        &mut self,
        min: impl Display,
        max: impl Display,
        rate: Option<&str>,
        transfer_interest_to_payer: bool,
    ) -> &mut Self {
        let (min, max) = (min.to_string(), max.to_string());
        let limit = BigDecimal::from(MAX_INSTALLMENTS);
        let within_limit = |bound: &str| parse_number(bound).is_some_and(|n| n <= limit);

        let min = if within_limit(&min) {
            Some(min.trim().to_string())
        } else {
            self.record(InstructionError::MinimumInstallmentsOutOfRange(min));
            None
        };
        let max = if within_limit(&max) {
            Some(max.trim().to_string())
        } else {
            self.record(InstructionError::MaximumInstallmentsOutOfRange(max));
            None
        };

        let interest = match (transfer_interest_to_payer, rate) {
            (true, _) => InstallmentInterest::TransferToPayer,
            (false, None) => InstallmentInterest::None,
            (false, Some(rate)) if parse_number(rate).is_some() => {
                InstallmentInterest::Rate(rate.trim().to_string())
            }
            (false, Some(rate)) => {
                self.record(InstructionError::NonNumericRate(rate.to_string()));
                InstallmentInterest::None
            }
        };

        self.installments.push(InstallmentRule { min, max, interest });
        self
    }

    /// Primary receiver. First call wins.
    pub fn set_receiver(&mut self, login: &str) -> &mut Self {
        if self.receiver.is_some() {
            tracing::debug!("Receiver already set, ignoring {}", login);
        } else {
            self.receiver = Some(login.to_string());
        }
        self
    }

    /// Switches to `mode` and records any missing required fields.
    pub fn validate(&mut self, mode: ValidationMode) -> &mut Self {
        self.mode = mode;
        for error in validator::check(self, mode) {
            self.record(error);
        }
        self
    }

    /// Applies every field of a request description, in schema order.
    pub fn apply_request(&mut self, request: &InstructionRequest) -> &mut Self {
        if let Some(environment) = &request.environment {
            self.set_environment(environment);
        }
        if let Some(credential) = &request.credential {
            self.set_credential(credential.key(), credential.token());
        }
        if let Some(mode) = &request.validation_mode {
            self.set_validation_mode(mode);
        }
        if let Some(id) = &request.unique_id {
            self.set_unique_id(id);
        }
        if let Some(reason) = &request.reason {
            self.set_reason(reason);
        }
        for method in &request.payment_methods {
            self.add_payment_method(method);
        }
        if let Some(billet) = &request.billet {
            self.set_billet_terms(
                &billet.expiration,
                billet.working_days,
                billet.instructions.iter().cloned(),
                billet.logo_url.as_deref(),
            );
        }
        if let Some(payer) = &request.payer {
            self.set_payer(payer.clone());
        }
        if let Some(value) = &request.value {
            self.set_value(value);
        }
        if let Some(surcharge) = &request.surcharge {
            self.set_surcharge(surcharge);
        }
        if let Some(deduction) = &request.deduction {
            self.set_deduction(deduction);
        }
        for message in &request.messages {
            self.add_message(message);
        }
        if let Some(url) = &request.return_url {
            self.set_return_url(url);
        }
        if let Some(url) = &request.notification_url {
            self.set_notification_url(url);
        }
        for split in &request.commissions {
            self.add_commission_split(
                &split.reason,
                &split.receiver,
                &split.value,
                split.percentage,
                split.payer_pays_fee,
            );
        }
        for rule in &request.installments {
            let rate = rule.rate.as_ref().map(|r| r.to_string());
            self.add_installment_rule(&rule.min, &rule.max, rate.as_deref(), rule.transfer);
        }
        if let Some(receiver) = &request.receiver {
            self.set_receiver(receiver);
        }
        self
    }

    // ============ Accessors ============

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn unique_ids(&self) -> &[String] {
        &self.unique_ids
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn payer(&self) -> Option<&Payer> {
        self.payer.as_ref()
    }

    /// Every recorded problem, oldest first.
    pub fn errors(&self) -> &[InstructionError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn last_error(&self) -> Option<&InstructionError> {
        self.errors.last()
    }

    pub fn take_errors(&mut self) -> Vec<InstructionError> {
        std::mem::take(&mut self.errors)
    }

    // ============ Rendering ============

    /// Serializes the instruction: UTF-8, no newlines, one `InstrucaoUnica`.
    pub fn render(&self) -> Result<String, SdkError> {
        let mut doc = XmlDocument::new()?;
        doc.open("EnviarInstrucao")?;
        match self.mode {
            ValidationMode::Identification => {
                doc.open_with("InstrucaoUnica", &[("TipoValidacao", "Transparente")])?
            }
            ValidationMode::Basic => doc.open("InstrucaoUnica")?,
        }

        for id in &self.unique_ids {
            doc.element("IdProprio", id)?;
        }
        for reason in &self.reasons {
            doc.element("Razao", reason)?;
        }
        self.write_payment_methods(&mut doc)?;
        self.write_billet(&mut doc)?;
        self.write_payer(&mut doc)?;
        self.write_values(&mut doc)?;
        if !self.messages.is_empty() {
            doc.open("Mensagens")?;
            for message in &self.messages {
                doc.element("Mensagem", message)?;
            }
            doc.close("Mensagens")?;
        }
        if let Some(url) = &self.return_url {
            doc.element("URLRetorno", url)?;
        }
        if let Some(url) = &self.notification_url {
            doc.element("URLNotificacao", url)?;
        }
        self.write_commissions(&mut doc)?;
        self.write_installments(&mut doc)?;
        if let Some(login) = &self.receiver {
            doc.open("Recebedor")?;
            doc.element("LoginMoIP", login)?;
            doc.close("Recebedor")?;
        }

        doc.close("InstrucaoUnica")?;
        doc.close("EnviarInstrucao")?;
        let xml = doc.finish()?;
        tracing::debug!("Rendered instruction ({} bytes)", xml.len());
        Ok(xml)
    }

    fn write_payment_methods(&self, doc: &mut XmlDocument) -> XmlResult {
        if self.payment_methods.is_empty() {
            return Ok(());
        }
        doc.open("FormasPagamento")?;
        for method in &self.payment_methods {
            doc.element("FormaPagamento", method.element_value())?;
        }
        doc.close("FormasPagamento")
    }

    fn write_billet(&self, doc: &mut XmlDocument) -> XmlResult {
        let Some(billet) = &self.billet else {
            return Ok(());
        };
        doc.open("Boleto")?;
        match &billet.expiration {
            BilletExpiration::Days {
                count,
                working_days,
            } => {
                let kind = if *working_days { "Uteis" } else { "Corridos" };
                doc.element_with("DiasExpiracao", &[("Tipo", kind)], count)?;
            }
            BilletExpiration::DueDate(date) => doc.element("DataVencimento", date)?,
        }
        for (index, line) in billet.instructions.iter().enumerate() {
            doc.element(&format!("Instrucao{}", index + 1), line)?;
        }
        if let Some(logo) = &billet.logo_url {
            doc.element("URLLogo", logo)?;
        }
        doc.close("Boleto")
    }

    fn write_payer(&self, doc: &mut XmlDocument) -> XmlResult {
        let Some(payer) = self.payer.as_ref().filter(|p| !p.is_empty()) else {
            return Ok(());
        };
        doc.open("Pagador")?;
        write_stripped(doc, "Nome", payer.name.as_deref())?;
        write_stripped(doc, "Email", payer.email.as_deref())?;
        write_stripped(doc, "IdPagador", payer.payer_id.as_deref())?;
        write_stripped(doc, "Identidade", payer.identity.as_deref())?;
        write_stripped(doc, "TelefoneCelular", payer.phone.as_deref())?;

        doc.open("EnderecoCobranca")?;
        if let Some(address) = &payer.billing_address {
            write_stripped(doc, "Logradouro", address.street.as_deref())?;
            write_stripped(doc, "Numero", address.number.as_deref())?;
            write_stripped(doc, "Complemento", address.complement.as_deref())?;
            write_stripped(doc, "Bairro", address.neighborhood.as_deref())?;
            write_stripped(doc, "Cidade", address.city.as_deref())?;
            write_stripped(doc, "Estado", address.state.as_deref())?;
            write_stripped(doc, "Pais", address.country.as_deref())?;
            write_stripped(doc, "CEP", address.zip_code.as_deref())?;
            write_stripped(doc, "TelefoneFixo", address.phone.as_deref())?;
        }
        doc.close("EnderecoCobranca")?;
        doc.close("Pagador")
    }

    fn write_values(&self, doc: &mut XmlDocument) -> XmlResult {
        let currency = [("moeda", CURRENCY)];
        for values in &self.values {
            doc.open("Valores")?;
            doc.element_with("Valor", &currency, &values.amount)?;
            for surcharge in &values.surcharges {
                doc.element_with("Acrescimo", &currency, surcharge)?;
            }
            for deduction in &values.deductions {
                doc.element_with("Deducao", &currency, deduction)?;
            }
            doc.close("Valores")?;
        }
        Ok(())
    }

    fn write_commissions(&self, doc: &mut XmlDocument) -> XmlResult {
        if self.commissions.is_empty() {
            return Ok(());
        }
        doc.open("Comissoes")?;
        for split in &self.commissions {
            doc.open("Comissionamento")?;
            doc.open("Comissionado")?;
            doc.element("LoginMoIP", &split.receiver_login)?;
            doc.close("Comissionado")?;
            doc.element("Razao", &split.reason)?;
            let tag = if split.is_percentage {
                "ValorPercentual"
            } else {
                "ValorFixo"
            };
            doc.element(tag, &split.value)?;
            doc.close("Comissionamento")?;

            if split.payer_pays_fee {
                doc.open("PagadorTaxa")?;
                doc.element("LoginMoIP", &split.receiver_login)?;
                doc.close("PagadorTaxa")?;
            }
        }
        doc.close("Comissoes")
    }

    fn write_installments(&self, doc: &mut XmlDocument) -> XmlResult {
        if self.installments.is_empty() {
            return Ok(());
        }
        doc.open("Parcelamentos")?;
        for rule in &self.installments {
            doc.open("Parcelamento")?;
            if let Some(min) = &rule.min {
                doc.element("MinimoParcelas", min)?;
            }
            if let Some(max) = &rule.max {
                doc.element("MaximoParcelas", max)?;
            }
            doc.element("Recebimento", "AVista")?;
            match &rule.interest {
                InstallmentInterest::None => {}
                InstallmentInterest::Rate(rate) => doc.element("Juros", rate)?,
                // Boolean flag, written the way the gateway expects it.
                InstallmentInterest::TransferToPayer => doc.element("Repassar", "1")?,
            }
            doc.close("Parcelamento")?;
        }
        doc.close("Parcelamentos")
    }
}

/// Removes the characters the gateway rejects in payer data.
pub fn strip_reserved_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '&' | '\'' | '"' | '<' | '>'))
        .collect()
}

fn write_stripped(doc: &mut XmlDocument, name: &str, value: Option<&str>) -> XmlResult {
    match value {
        Some(value) => doc.element(name, &strip_reserved_chars(value)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingAddress;

    const KEY: &str = "ABABABABABABABABABABABABABABABABABABABAB";
    const TOKEN: &str = "01010101010101010101010101010101";
    const ROOT: &str = r#"<?xml version="1.0" encoding="utf-8"?><EnviarInstrucao>"#;

    fn body(xml: &str) -> &str {
        xml.strip_prefix(ROOT)
            .and_then(|rest| rest.strip_suffix("</EnviarInstrucao>"))
            .expect("document wrapper")
    }

    #[test]
    fn empty_instruction_renders_single_root() {
        let xml = InstructionBuilder::new().render().unwrap();
        assert_eq!(body(&xml), "<InstrucaoUnica></InstrucaoUnica>");
    }

    #[test]
    fn unique_id_and_reason_append_siblings() {
        let mut builder = InstructionBuilder::new();
        builder.set_unique_id("A1").set_unique_id("A2").set_reason("Pedido 7");

        let xml = builder.render().unwrap();
        assert!(xml.contains("<IdProprio>A1</IdProprio><IdProprio>A2</IdProprio><Razao>Pedido 7</Razao>"));
    }

    #[test]
    fn payment_methods_keep_call_order() {
        let mut builder = InstructionBuilder::new();
        builder
            .add_payment_method("creditCard")
            .add_payment_method("billet")
            .add_payment_method("creditCard");

        assert!(!builder.has_errors());
        let xml = builder.render().unwrap();
        assert!(xml.contains(
            "<FormasPagamento><FormaPagamento>CartaoCredito</FormaPagamento>\
             <FormaPagamento>BoletoBancario</FormaPagamento>\
             <FormaPagamento>CartaoCredito</FormaPagamento></FormasPagamento>"
        ));
    }

    #[test]
    fn unknown_payment_method_appends_nothing() {
        let mut builder = InstructionBuilder::new();
        builder.add_payment_method("pix");

        assert_eq!(
            builder.errors(),
            &[InstructionError::UnknownPaymentMethod("pix".to_string())]
        );
        assert!(!builder.render().unwrap().contains("FormasPagamento"));
    }

    #[test]
    fn values_block_orders_surcharge_before_deduction() {
        let mut builder = InstructionBuilder::new();
        builder
            .set_value("100.00")
            .set_deduction("5.00")
            .set_surcharge("10.00");

        let xml = builder.render().unwrap();
        assert!(xml.contains(
            r#"<Valores><Valor moeda="BRL">100.00</Valor><Acrescimo moeda="BRL">10.00</Acrescimo><Deducao moeda="BRL">5.00</Deducao></Valores>"#
        ));
    }

    #[test]
    fn blank_or_zero_value_is_an_error_but_still_rendered() {
        let mut blank = InstructionBuilder::new();
        blank.set_value("");
        assert_eq!(blank.errors(), &[InstructionError::MissingValue]);
        assert!(blank
            .render()
            .unwrap()
            .contains(r#"<Valores><Valor moeda="BRL"/></Valores>"#));

        let mut zero = InstructionBuilder::new();
        zero.set_value(0);
        assert_eq!(zero.errors(), &[InstructionError::MissingValue]);
        assert!(zero.render().unwrap().contains(r#"<Valor moeda="BRL">0</Valor>"#));
    }

    #[test]
    fn repeated_value_appends_another_block() {
        let mut builder = InstructionBuilder::new();
        builder
            .set_value("100.00")
            .set_surcharge("1.00")
            .set_value("200.00")
            .set_deduction("3.00");

        assert!(!builder.has_errors());
        let xml = builder.render().unwrap();
        assert_eq!(xml.matches("<Valores>").count(), 2);
        assert!(xml.contains(
            r#"<Valores><Valor moeda="BRL">100.00</Valor><Acrescimo moeda="BRL">1.00</Acrescimo><Deducao moeda="BRL">3.00</Deducao></Valores><Valores><Valor moeda="BRL">200.00</Valor></Valores>"#
        ));
    }

    #[test]
    fn surcharge_without_value_is_rejected() {
        let mut builder = InstructionBuilder::new();
        builder.set_surcharge("1.00").set_deduction("2.00");

        assert_eq!(
            builder.errors(),
            &[
                InstructionError::ValuesNotSet("setSurcharge"),
                InstructionError::ValuesNotSet("setDeduction"),
            ]
        );
        assert!(!builder.render().unwrap().contains("Valores"));
    }

    #[test]
    fn billet_terms_first_call_wins() {
        let mut builder = InstructionBuilder::new();
        builder
            .set_billet_terms(5, true, ["Não receber após vencimento", "Multa de 2%"], Some("https://loja/logo.png"))
            .set_billet_terms("2030-01-01", false, Vec::<String>::new(), None);

        let xml = builder.render().unwrap();
        assert!(xml.contains(
            "<Boleto><DiasExpiracao Tipo=\"Uteis\">5</DiasExpiracao>\
             <Instrucao1>Não receber após vencimento</Instrucao1>\
             <Instrucao2>Multa de 2%</Instrucao2>\
             <URLLogo>https://loja/logo.png</URLLogo></Boleto>"
        ));
        assert!(!xml.contains("DataVencimento"));
    }

    #[test]
    fn billet_due_date_is_kept_verbatim() {
        let mut builder = InstructionBuilder::new();
        builder.set_billet_terms("2030-01-01T00:00:00", false, ["Pagar em dia"], None);

        let xml = builder.render().unwrap();
        assert!(xml.contains(
            "<Boleto><DataVencimento>2030-01-01T00:00:00</DataVencimento><Instrucao1>Pagar em dia</Instrucao1></Boleto>"
        ));
    }

    #[test]
    fn payer_values_are_stripped_of_reserved_chars() {
        let mut builder = InstructionBuilder::new();
        builder.set_payer(Payer {
            name: Some("O'Brien & <Filhos>".to_string()),
            email: Some("obrien@example.com".to_string()),
            billing_address: Some(BillingAddress {
                street: Some("Rua \"Central\"".to_string()),
                zip_code: Some("01000-000".to_string()),
                ..BillingAddress::default()
            }),
            ..Payer::default()
        });

        let xml = builder.render().unwrap();
        assert!(xml.contains(
            "<Pagador><Nome>OBrien  Filhos</Nome><Email>obrien@example.com</Email>\
             <EnderecoCobranca><Logradouro>Rua Central</Logradouro><CEP>01000-000</CEP>\
             </EnderecoCobranca></Pagador>"
        ));
        assert!(!xml.contains("&amp;"));
    }

    #[test]
    fn empty_payer_is_not_rendered() {
        let mut builder = InstructionBuilder::new();
        builder.set_payer(Payer::default());
        assert!(!builder.render().unwrap().contains("Pagador"));
    }

    #[test]
    fn messages_and_urls() {
        let mut builder = InstructionBuilder::new();
        builder
            .add_message("Obrigado")
            .add_message("Volte sempre")
            .set_return_url("https://loja/retorno")
            .set_return_url("https://loja/outro")
            .set_notification_url("https://loja/nasp")
            .set_notification_url("https://loja/outro");

        let xml = builder.render().unwrap();
        assert!(xml.contains(
            "<Mensagens><Mensagem>Obrigado</Mensagem><Mensagem>Volte sempre</Mensagem></Mensagens>\
             <URLRetorno>https://loja/retorno</URLRetorno>\
             <URLNotificacao>https://loja/nasp</URLNotificacao>"
        ));
        assert!(!xml.contains("outro"));
    }

    #[test]
    fn commission_split_variants() {
        let mut builder = InstructionBuilder::new();
        builder
            .add_commission_split("Frete", "transportadora", "12.50", false, false)
            .add_commission_split("Marketplace", "parceiro", 10, true, true);

        let xml = builder.render().unwrap();
        assert!(xml.contains(
            "<Comissoes>\
             <Comissionamento><Comissionado><LoginMoIP>transportadora</LoginMoIP></Comissionado>\
             <Razao>Frete</Razao><ValorFixo>12.50</ValorFixo></Comissionamento>\
             <Comissionamento><Comissionado><LoginMoIP>parceiro</LoginMoIP></Comissionado>\
             <Razao>Marketplace</Razao><ValorPercentual>10</ValorPercentual></Comissionamento>\
             <PagadorTaxa><LoginMoIP>parceiro</LoginMoIP></PagadorTaxa>\
             </Comissoes>"
        ));
    }

    #[test]
    fn non_numeric_commission_appends_nothing() {
        let mut builder = InstructionBuilder::new();
        builder.add_commission_split("Frete", "transportadora", "dez", false, false);

        assert_eq!(
            builder.errors(),
            &[InstructionError::NonNumericCommission("dez".to_string())]
        );
        assert!(!builder.render().unwrap().contains("Comissoes"));
    }

    #[test]
    fn installment_rule_with_rate() {
        let mut builder = InstructionBuilder::new();
        builder.add_installment_rule(2, 6, Some("2.5"), false);

        assert!(!builder.has_errors());
        assert!(builder.render().unwrap().contains(
            "<Parcelamentos><Parcelamento><MinimoParcelas>2</MinimoParcelas>\
             <MaximoParcelas>6</MaximoParcelas><Recebimento>AVista</Recebimento>\
             <Juros>2.5</Juros></Parcelamento></Parcelamentos>"
        ));
    }

    #[test]
    fn installment_rule_with_transfer_never_emits_interest() {
        let mut builder = InstructionBuilder::new();
        builder.add_installment_rule(2, 6, Some("2.5"), true);

        let xml = builder.render().unwrap();
        assert!(xml.contains("<Recebimento>AVista</Recebimento><Repassar>1</Repassar></Parcelamento>"));
        assert!(!xml.contains("Juros"));
    }

    #[test]
    fn installment_bounds_fail_independently() {
        let mut builder = InstructionBuilder::new();
        builder.add_installment_rule(1, 15, None, false);

        assert_eq!(
            builder.errors(),
            &[InstructionError::MaximumInstallmentsOutOfRange("15".to_string())]
        );
        assert!(builder.render().unwrap().contains(
            "<Parcelamento><MinimoParcelas>1</MinimoParcelas><Recebimento>AVista</Recebimento></Parcelamento>"
        ));

        let mut both = InstructionBuilder::new();
        both.add_installment_rule("x", 13, Some("abc"), false);
        assert_eq!(
            both.errors(),
            &[
                InstructionError::MinimumInstallmentsOutOfRange("x".to_string()),
                InstructionError::MaximumInstallmentsOutOfRange("13".to_string()),
                InstructionError::NonNumericRate("abc".to_string()),
            ]
        );
    }

    #[test]
    fn receiver_first_call_wins() {
        let mut builder = InstructionBuilder::new();
        builder.set_receiver("loja").set_receiver("outra");
        let xml = builder.render().unwrap();
        assert!(xml.contains("<Recebedor><LoginMoIP>loja</LoginMoIP></Recebedor></InstrucaoUnica>"));
    }

    #[test]
    fn identification_mode_marks_instruction() {
        let mut builder = InstructionBuilder::new();
        builder.set_validation_mode("Identification");
        assert!(builder
            .render()
            .unwrap()
            .contains(r#"<InstrucaoUnica TipoValidacao="Transparente">"#));

        builder.set_validation_mode("Basic");
        assert!(builder.render().unwrap().contains("<InstrucaoUnica>"));
    }

    #[test]
    fn invalid_mode_is_recorded_and_ignored() {
        let mut builder = InstructionBuilder::new();
        builder.set_mode(ValidationMode::Identification).set_validation_mode("Full");

        assert_eq!(builder.mode(), ValidationMode::Identification);
        assert_eq!(
            builder.last_error(),
            Some(&InstructionError::InvalidValidationMode("Full".to_string()))
        );
    }

    #[test]
    fn environment_and_credential_setters() {
        let mut builder = InstructionBuilder::new();
        builder.set_environment("production").set_environment("staging");
        assert_eq!(builder.environment(), Environment::Production);

        builder.set_credential(KEY, &TOKEN[..31]);
        assert_eq!(builder.last_error(), Some(&InstructionError::InvalidCredential));
        assert_eq!(builder.credential().map(|c| c.token().len()), Some(31));

        assert_eq!(builder.take_errors().len(), 2);
        builder.set_credential(KEY, TOKEN);
        assert!(!builder.has_errors());
    }

    #[test]
    fn render_uses_schema_order_not_call_order() {
        let mut builder = InstructionBuilder::new();
        builder
            .set_receiver("loja")
            .add_message("Oi")
            .set_value("50.00")
            .add_payment_method("debit")
            .set_reason("Pedido")
            .set_unique_id("ID-1");

        let xml = builder.render().unwrap();
        let position = |tag: &str| xml.find(tag).unwrap();
        assert!(position("<IdProprio>") < position("<Razao>"));
        assert!(position("<Razao>") < position("<FormasPagamento>"));
        assert!(position("<FormasPagamento>") < position("<Valores>"));
        assert!(position("<Valores>") < position("<Mensagens>"));
        assert!(position("<Mensagens>") < position("<Recebedor>"));
    }

    #[test]
    fn credential_is_never_rendered() {
        let mut builder = InstructionBuilder::new();
        builder.set_credential(KEY, TOKEN).set_unique_id("1");
        let xml = builder.render().unwrap();
        assert!(!xml.contains(KEY));
        assert!(!xml.contains(TOKEN));
    }
}
