//! Minimum-field checks run before an instruction is sent.

use crate::errors::InstructionError;
use crate::instruction::InstructionBuilder;
use crate::models::{Payer, ValidationMode};

/// Returns the problems that would prevent `instruction` from being accepted
/// under `mode`. Nothing is recorded; the caller decides what to do.
pub fn check(instruction: &InstructionBuilder, mode: ValidationMode) -> Vec<InstructionError> {
    let mut errors = Vec::new();

    if instruction.credential().is_none()
        || instruction.reasons().is_empty()
        || instruction.unique_ids().is_empty()
    {
        errors.push(InstructionError::MissingRequiredFields);
    }

    if mode == ValidationMode::Identification {
        let missing = missing_payer_fields(instruction.payer());
        if !missing.is_empty() {
            errors.push(InstructionError::MissingPayerFields(missing));
        }
    }

    errors
}

/// Names of the payer fields `Identification` mode requires but are absent,
/// in the order the gateway documents them.
pub fn missing_payer_fields(payer: Option<&Payer>) -> Vec<&'static str> {
    let empty = Payer::default();
    let payer = payer.unwrap_or(&empty);
    let address = payer.billing_address.clone().unwrap_or_default();

    let required = [
        ("name", payer.name.is_some()),
        ("email", payer.email.is_some()),
        ("payerId", payer.payer_id.is_some()),
        ("billingAddress", payer.billing_address.is_some()),
        ("address", address.street.is_some()),
        ("number", address.number.is_some()),
        ("complement", address.complement.is_some()),
        ("neighborhood", address.neighborhood.is_some()),
        ("city", address.city.is_some()),
        ("state", address.state.is_some()),
        ("country", address.country.is_some()),
        ("zipCode", address.zip_code.is_some()),
        ("phone", address.phone.is_some()),
    ];

    required
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| field)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingAddress;

    const KEY: &str = "ABABABABABABABABABABABABABABABABABABABAB";
    const TOKEN: &str = "01010101010101010101010101010101";

    fn full_payer() -> Payer {
        Payer {
            name: Some("Maria Souza".to_string()),
            email: Some("maria@example.com".to_string()),
            payer_id: Some("cliente-1".to_string()),
            identity: None,
            phone: None,
            billing_address: Some(BillingAddress {
                street: Some("Av. Paulista".to_string()),
                number: Some("1000".to_string()),
                complement: Some("Sala 1".to_string()),
                neighborhood: Some("Bela Vista".to_string()),
                city: Some("São Paulo".to_string()),
                state: Some("SP".to_string()),
                country: Some("BRA".to_string()),
                zip_code: Some("01310-100".to_string()),
                phone: Some("(11)3333-4444".to_string()),
            }),
        }
    }

    fn basic_instruction() -> InstructionBuilder {
        let mut builder = InstructionBuilder::new();
        builder
            .set_credential(KEY, TOKEN)
            .set_unique_id("pedido-1")
            .set_reason("Compra");
        builder
    }

    #[test]
    fn basic_requires_credential_reason_and_id() {
        assert!(check(&basic_instruction(), ValidationMode::Basic).is_empty());

        let mut builder = InstructionBuilder::new();
        builder.set_reason("Compra");
        assert_eq!(
            check(&builder, ValidationMode::Basic),
            vec![InstructionError::MissingRequiredFields]
        );
    }

    #[test]
    fn basic_ignores_payer() {
        let builder = basic_instruction();
        assert!(builder.payer().is_none());
        assert!(check(&builder, ValidationMode::Basic).is_empty());
    }

    #[test]
    fn identification_lists_every_missing_field() {
        let mut payer = full_payer();
        payer.email = None;
        if let Some(address) = payer.billing_address.as_mut() {
            address.complement = None;
            address.zip_code = None;
        }
        let mut builder = basic_instruction();
        builder.set_payer(payer);

        assert_eq!(
            check(&builder, ValidationMode::Identification),
            vec![InstructionError::MissingPayerFields(vec![
                "email",
                "complement",
                "zipCode"
            ])]
        );
    }

    #[test]
    fn identification_without_payer_reports_all_fields() {
        let missing = missing_payer_fields(None);
        assert_eq!(missing.len(), 13);
        assert_eq!(missing.first(), Some(&"name"));
        assert_eq!(missing.last(), Some(&"phone"));
    }

    #[test]
    fn identification_passes_with_full_payer() {
        let mut builder = basic_instruction();
        builder.set_payer(full_payer());
        assert!(check(&builder, ValidationMode::Identification).is_empty());
    }

    #[test]
    fn validate_records_without_halting() {
        let mut builder = InstructionBuilder::new();
        builder.validate(ValidationMode::Identification).set_value("10.00");

        assert_eq!(builder.mode(), ValidationMode::Identification);
        assert_eq!(builder.errors().len(), 2);
        assert!(builder.render().unwrap().contains("<Valor moeda=\"BRL\">10.00</Valor>"));
    }
}
