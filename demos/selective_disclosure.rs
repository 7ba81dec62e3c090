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

mod selective_disclosure_example {
    use serde_json::json;
    use zkryptium_vc::{
        bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey},
        builders::{BuilderOptions, VCBuilder},
        credential::Credential,
        errors::Error,
        resolver::{PublicKey, StaticKeyResolver},
        utils::util::generate_nonce,
    };

    const ISSUER: &str = "did:example:489398593";

    pub(crate) fn selective_disclosure_main() -> Result<(), Error> {
        log::info!("Issuer key generation");
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>()?;
        let pk = sk.public_key();
        log::info!("PK: {}", pk.encode());
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&pk));

        let issuer = VCBuilder::new(BuilderOptions::new().with_did(ISSUER).with_private_key(sk));
        let holder = VCBuilder::new(BuilderOptions::new());

        let mut credential = Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/bbs/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "id": "https://issuer.oidp.uscis.gov/credentials/83627465",
            "type": ["VerifiableCredential", "PermanentResidentCard"],
            "issuer": ISSUER,
            "identifier": "83627465",
            "name": "Permanent Resident Card",
            "issuanceDate": "2019-12-03T12:19:52Z",
            "credentialSubject": {
                "id": "did:example:b34ca6cd37bbf23",
                "type": ["PermanentResident", "Person"],
                "givenName": "JOHN",
                "familyName": "SMITH",
                "gender": "Male",
                "birthCountry": "Bahamas",
                "birthDate": "1958-07-17"
            }
        }))?;

        log::info!("Signing credential");
        issuer.add_linked_data_proof(&mut credential)?;
        issuer.verify(&credential, &resolver)?;
        log::info!("Signed credential:\n{}", credential);

        let reveal = json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/bbs/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "type": ["VerifiableCredential", "PermanentResidentCard"],
            "credentialSubject": {
                "@explicit": true,
                "type": ["PermanentResident", "Person"],
                "givenName": {},
                "familyName": {}
            }
        });

        let nonce = generate_nonce();
        log::info!("Nonce: {}", hex::encode(&nonce));

        log::info!("Deriving selective disclosure");
        let derived = holder.generate_bbs_selective_disclosure(&credential, &reveal, &resolver, &nonce)?;
        log::info!("Derived credential:\n{}", derived);

        log::info!("Verifying derived credential");
        holder.verify(&derived, &resolver)?;
        log::info!("Derived credential is VALID!");
        Ok(())
    }
}

fn main() {
    use crate::selective_disclosure_example::selective_disclosure_main;

    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = selective_disclosure_main() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
