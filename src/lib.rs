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

//! W3C Verifiable Credentials secured with BBS+ linked data proofs:
//! signing, selective disclosure, blind issuance, Status List 2021 and
//! VC JSON Schemas.

#![allow(non_snake_case)]

pub mod errors;
pub mod utils;
pub mod bbsplus;
pub mod processor;
pub mod ldp;
pub mod suites;
pub mod credential;
pub mod presentation;
pub mod status;
pub mod schema;
pub mod resolver;
pub mod builders;
