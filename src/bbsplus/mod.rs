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

//! BBS+ signatures over BLS12-381 in the `(A, e, s)` form used by the
//! `BbsBlsSignature2020` linked data suites.
//!
//! Message generators are derived from the signer public key, so a
//! verifier needs nothing but the key and the message count. On top of the
//! plain signature the module offers a zero-knowledge proof of knowledge
//! for selective disclosure and, behind the `bbsplus_blind` feature, a
//! commitment based blind issuance protocol.

#[cfg(feature = "bbsplus_blind")]
/// Module for blind signatures
pub mod blind;
/// Module for ciphersuites
pub mod ciphersuites;
#[cfg(feature = "bbsplus_blind")]
/// Module for commitments
pub mod commitment;
/// Module for generators
pub mod generators;
/// Module for keys
pub mod keys;
/// Module for messages
pub mod message;
/// Module for proofs
pub mod proof;
/// Module for signatures
pub mod signature;
