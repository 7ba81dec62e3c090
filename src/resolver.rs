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

//! Public key lookup by verification method id.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
    bbsplus::keys::BBSplusPublicKey,
    errors::Error,
    ldp::{decode_base64, SignatureRepresentation},
};

pub const BLS12381_G2_KEY_2020: &str = "Bls12381G2Key2020";
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";
const JWK_CURVE: &str = "BLS12381_G2";
const JWK_KEY_TYPE: &str = "EC";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub key_type: String,
    pub value: Vec<u8>,
    /// Key bytes taken from a JWK, used with JWS proofs.
    pub jwk: Option<Vec<u8>>,
}

impl PublicKey {
    pub fn new(key_type: &str, value: Vec<u8>) -> Self {
        Self { key_type: key_type.to_owned(), value, jwk: None }
    }

    pub fn from_bbs(pk: &BBSplusPublicKey) -> Self {
        Self::new(BLS12381_G2_KEY_2020, pk.to_bytes().to_vec())
    }

    /// Key bytes for a proof in the given representation. JWS proofs prefer
    /// the JWK bytes and fall back to the raw value.
    pub fn bytes_for(&self, representation: SignatureRepresentation) -> &[u8] {
        match (representation, &self.jwk) {
            (SignatureRepresentation::Jws, Some(jwk)) => jwk,
            _ => &self.value,
        }
    }
}

pub trait PublicKeyResolver {
    fn resolve(&self, id: &str) -> Result<PublicKey, Error>;
}

/// Fixed keys: one per verification method id, or a single key answering
/// every id when no per-id key is registered.
#[derive(Clone, Debug, Default)]
pub struct StaticKeyResolver {
    default_key: Option<PublicKey>,
    variants: HashMap<String, PublicKey>,
}

impl StaticKeyResolver {
    pub fn new(default_key: PublicKey) -> Self {
        Self { default_key: Some(default_key), variants: HashMap::new() }
    }

    pub fn with_variant(mut self, id: &str, key: PublicKey) -> Self {
        self.variants.insert(id.to_owned(), key);
        self
    }
}

impl PublicKeyResolver for StaticKeyResolver {
    fn resolve(&self, id: &str) -> Result<PublicKey, Error> {
        let key = if self.variants.is_empty() {
            self.default_key.as_ref()
        } else {
            self.variants.get(id)
        };
        key.cloned().ok_or_else(|| Error::ResolutionFailure(id.to_owned()))
    }
}

/// Resolves verification methods out of DID documents held in memory.
#[derive(Clone, Debug, Default)]
pub struct LocalResolver {
    documents: HashMap<String, Value>,
}

impl LocalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a DID document, keyed by its `id`.
    pub fn with_document(mut self, document: Value) -> Result<Self, Error> {
        let did = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingField("DID document id".to_owned()))?
            .to_owned();
        self.documents.insert(did, document);
        Ok(self)
    }

    fn verification_method<'a>(document: &'a Value, id: &str) -> Option<&'a Value> {
        let methods = document
            .get("verificationMethod")
            .or_else(|| document.get("publicKey"))
            .and_then(Value::as_array)?;
        let fragment = id.find('#').map(|i| &id[i..]);
        match fragment {
            Some(fragment) => methods.iter().find(|method| {
                method
                    .get("id")
                    .and_then(Value::as_str)
                    .map_or(false, |method_id| method_id == id || method_id == fragment)
            }),
            None => methods.first(),
        }
    }
}

impl PublicKeyResolver for LocalResolver {
    fn resolve(&self, id: &str) -> Result<PublicKey, Error> {
        let did = id.split('#').next().unwrap_or(id);
        let document = self
            .documents
            .get(did)
            .ok_or_else(|| Error::ResolutionFailure(format!("unknown DID {}", did)))?;
        let method = Self::verification_method(document, id)
            .ok_or_else(|| Error::ResolutionFailure(format!("no verification method {}", id)))?;
        let key_type = method.get("type").and_then(Value::as_str).unwrap_or_default();

        if let Some(hex_key) = method.get("publicKeyHex").and_then(Value::as_str) {
            let value = hex::decode(hex_key).map_err(|e| Error::encoding("publicKeyHex", e))?;
            return Ok(PublicKey::new(key_type, value));
        }
        if let Some(jwk) = method.get("publicKeyJwk") {
            let field = |name: &str| jwk.get(name).and_then(Value::as_str).unwrap_or_default();
            if field("kty") != JWK_KEY_TYPE || field("crv") != JWK_CURVE {
                return Err(Error::ResolutionFailure(format!("{} is not a BLS12-381 G2 JWK", id)));
            }
            let x = decode_base64(field("x"))?;
            return Ok(PublicKey { key_type: key_type.to_owned(), value: x.clone(), jwk: Some(x) });
        }
        Err(Error::ResolutionFailure(format!("{} carries no supported key material", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use serde_json::json;

    #[test]
    fn static_resolver() {
        let default_key = PublicKey::new(BLS12381_G2_KEY_2020, vec![1]);
        let resolver = StaticKeyResolver::new(default_key.clone());
        assert_eq!(resolver.resolve("did:example:any#key").unwrap(), default_key);

        let other = PublicKey::new(BLS12381_G2_KEY_2020, vec![2]);
        let resolver = resolver.with_variant("did:example:a#key", other.clone());
        assert_eq!(resolver.resolve("did:example:a#key").unwrap(), other);
        assert!(matches!(resolver.resolve("did:example:b#key"), Err(Error::ResolutionFailure(_))));
    }

    #[test]
    fn local_resolver_reads_hex_and_jwk() {
        let pk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap().public_key();
        let document = json!({
            "id": "did:example:issuer",
            "verificationMethod": [
                {"id": "#owner", "type": "Bls12381G2Key2020", "publicKeyHex": pk.encode()},
                {
                    "id": "did:example:issuer#jwk",
                    "type": "JsonWebKey2020",
                    "publicKeyJwk": {"kty": "EC", "crv": "BLS12381_G2", "x": URL_SAFE_NO_PAD.encode(pk.to_bytes())}
                }
            ]
        });
        let resolver = LocalResolver::new().with_document(document).unwrap();

        let hex_key = resolver.resolve("did:example:issuer#owner").unwrap();
        assert_eq!(hex_key.value, pk.to_bytes().to_vec());
        assert_eq!(hex_key.bytes_for(SignatureRepresentation::Jws), hex_key.value.as_slice());

        let jwk_key = resolver.resolve("did:example:issuer#jwk").unwrap();
        assert_eq!(jwk_key.jwk, Some(pk.to_bytes().to_vec()));
        assert_eq!(jwk_key.key_type, JSON_WEB_KEY_2020);

        assert!(resolver.resolve("did:example:issuer#missing").is_err());
        assert!(resolver.resolve("did:example:other#owner").is_err());
    }
}
