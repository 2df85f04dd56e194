//! Moip Single Payment Instruction SDK
//!
//! Builds an `EnviarInstrucao/InstrucaoUnica` document, sends it to the Moip
//! gateway and interprets the XML reply. Also queries installment simulations.
//!
//! # Modules
//!
//! - `core`: Instruction building, validation and reply parsing.
//! - `integrations`: HTTP transport and gateway client.
//! - `config`: Configuration management.
//! - `credential`: API key/token pair.
//! - `environment`: Sandbox and production targets.
//! - `errors`: Error handling types.
//! - `gateway_client`: Moip API client.
//! - `instruction`: Instruction builder and XML rendering.
//! - `models`: Domain, reply and request-file models.
//! - `response`: Reply interpretation.
//! - `transport`: HTTP collaborator trait and reqwest implementation.
//! - `validator`: Required-field checks per validation mode.

pub mod core;
pub mod integrations;

pub mod config;
pub mod credential;
pub mod environment;
pub mod errors;
pub mod gateway_client;
pub mod instruction;
pub mod models;
pub mod response;
pub mod transport;
pub mod validator;
mod xml_document;

pub use errors::{InstructionError, SdkError};
pub use gateway_client::GatewayClient;
pub use instruction::InstructionBuilder;
