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

//! Linked data proofs: the proof record, its detached JWS form, the verify
//! data a suite signs and the statement splitting that turns canonical
//! documents into BBS+ messages.

pub mod jws;
pub mod proof;
pub mod statements;
pub mod verify_data;

pub use self::{
    jws::Jws,
    proof::{decode_base64, LinkedDataProofContext, Proof, SignatureRepresentation},
    statements::{split_statements, transform_from_blank_node, transform_to_blank_node},
    verify_data::create_verify_data,
};
