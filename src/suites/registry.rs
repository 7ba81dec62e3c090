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

use std::{collections::HashMap, fmt, sync::Arc};

#[cfg(feature = "bbsplus_blind")]
use super::Blindable;
use super::{BbsBlsSignature2020, BbsBlsSignatureProof2020, ProofDerivable, SignatureSuite};
use crate::{bbsplus::keys::BBSplusSecretKey, errors::Error};

/// Suites by algorithm identifier. Built once, then only read.
#[derive(Clone, Default)]
pub struct SuiteRegistry {
    suites: HashMap<String, Arc<dyn SignatureSuite>>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both BBS suites, without private key.
    pub fn verify_only() -> Self {
        Self::new()
            .with_suite(BbsBlsSignature2020::new(None, false))
            .with_suite(BbsBlsSignatureProof2020::new(None, false))
    }

    /// Both BBS suites signing with `sk`, proof compaction disabled.
    pub fn with_private_key(sk: BBSplusSecretKey) -> Self {
        Self::new()
            .with_suite(BbsBlsSignature2020::new(Some(sk.clone()), false))
            .with_suite(BbsBlsSignatureProof2020::new(Some(sk), false))
    }

    /// Registers `suite` under its `alg`, replacing any previous one.
    pub fn with_suite(mut self, suite: impl SignatureSuite + 'static) -> Self {
        self.suites.insert(suite.alg().to_owned(), Arc::new(suite));
        self
    }

    pub fn get(&self, alg: &str) -> Result<&dyn SignatureSuite, Error> {
        self.suites
            .get(alg)
            .map(|suite| &**suite)
            .ok_or_else(|| Error::UnknownSuite(alg.to_owned()))
    }

    #[cfg(feature = "bbsplus_blind")]
    pub fn blindable(&self, alg: &str) -> Result<&dyn Blindable, Error> {
        self.get(alg)?.as_blindable().ok_or_else(|| Error::WrongSuiteForOperation {
            suite: alg.to_owned(),
            operation: "blind signature".to_owned(),
        })
    }

    pub fn proof_derivable(&self, alg: &str) -> Result<&dyn ProofDerivable, Error> {
        self.get(alg)?.as_proof_derivable().ok_or_else(|| Error::WrongSuiteForOperation {
            suite: alg.to_owned(),
            operation: "selective disclosure".to_owned(),
        })
    }

    pub fn algs(&self) -> Vec<&str> {
        let mut algs: Vec<&str> = self.suites.keys().map(String::as_str).collect();
        algs.sort_unstable();
        algs
    }
}

impl fmt::Debug for SuiteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRegistry").field("suites", &self.algs()).finish()
    }
}
