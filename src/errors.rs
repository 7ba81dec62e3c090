// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    // Primitive layer
    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Invalid key")]
    KeyDeserializationError,
    #[error("Error during hash to scalar computation")]
    HashToScalarError,
    #[error("Error mapping a message to scalar")]
    MapMessageToScalarError,
    #[error("Not enough Generators")]
    NotEnoughGenerators,
    /// The signature base point degenerated to the identity of G1
    #[error(" A == Identity_G1")]
    G1IdentityError,
    #[error("Error during computation of a Signature: {0}")]
    SignatureGenerationError(String),
    #[error("Error during computation of a Proof of Knowledge of a Signature: {0}")]
    ProofGenError(String),
    #[error("Proof of Knowledge of a Signature verification failed: {0}")]
    PoKSVerificationError(String),
    #[error("Error during computation of a Blind Signature: {0}")]
    BlindSignError(String),
    #[error("Invalid commitment proof")]
    InvalidCommitmentProof,
    #[error("Error during deserialization: {0}")]
    DeserializationError(String),

    // Linked data proofs and credentials
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} is missing")]
    MissingField(String),
    #[error("Unsupported signature representation: {0}")]
    UnsupportedRepresentation(String),
    #[error("Document does not carry any proof")]
    MissingProof,
    #[error("No applicable proof found: {0}")]
    NoApplicableProof(String),
    #[error("Unknown signature suite: {0}")]
    UnknownSuite(String),
    #[error("Operation {operation} is not supported by suite {suite}")]
    WrongSuiteForOperation { suite: String, operation: String },
    #[error("Cannot resolve public key: {0}")]
    ResolutionFailure(String),
    #[error("Signature is not valid: {0}")]
    SignatureMismatch(String),
    #[error("Schema validation failed: {0}")]
    SchemaViolation(String),

    // Blind issuance session
    #[error("Blind signature protocol out of order: {0}")]
    ProtocolState(String),
    #[error("Cannot get blinding factor, pre blind sign was not executed in this session")]
    NoBlindingFactor,

    #[error("Encoding error ({context}): {message}")]
    EncodingError { context: String, message: String },
}

impl Error {
    pub(crate) fn encoding(context: &str, err: impl std::fmt::Display) -> Self {
        Error::EncodingError {
            context: context.to_owned(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::encoding("json", err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::encoding("io", err)
    }
}
