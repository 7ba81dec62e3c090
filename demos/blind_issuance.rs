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

#[cfg(feature = "bbsplus_blind")]
mod blind_issuance_example {
    use serde_json::json;
    use zkryptium_vc::{
        bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey},
        builders::{BuilderOptions, VCBuilder},
        credential::Credential,
        errors::Error,
        ldp::{proof::now, LinkedDataProofContext},
        resolver::{PublicKey, StaticKeyResolver},
        utils::util::generate_nonce,
    };

    const ISSUER: &str = "did:example:issuer";

    pub(crate) fn blind_issuance_main() -> Result<(), Error> {
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>()?;
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));

        // Holder and issuer must agree on the proof options, `created` included.
        let context = LinkedDataProofContext {
            created: Some(now()),
            ..LinkedDataProofContext::new("BbsBlsSignature2020", &format!("{}#owner", ISSUER))
        };
        let issuer = VCBuilder::new(
            BuilderOptions::new()
                .with_did(ISSUER)
                .with_private_key(sk)
                .with_linked_data_proof_context(context.clone()),
        );
        let holder = VCBuilder::new(BuilderOptions::new().with_linked_data_proof_context(context));

        let credential = Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/bbs/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "id": "https://example.com/credentials/1872",
            "type": ["VerifiableCredential"],
            "issuer": ISSUER,
            "issuanceDate": "2020-01-01T19:23:24Z",
            "credentialSubject": {
                "id": "did:example:holder",
                "degree": "Bachelor of Science",
                "secretNumber": "4242"
            }
        }))?;
        let mut revealed = credential.clone();
        revealed.credential_subject = Some(json!({
            "id": "did:example:holder",
            "degree": "Bachelor of Science"
        }));

        log::info!("Issuer nonce");
        let nonce = generate_nonce();

        log::info!("Holder commits to the hidden statements");
        let (mut session, request) = holder.pre_blind_sign(&credential, &revealed, &resolver, &nonce)?;
        log::info!(
            "{} messages, revealed indexes {:?}",
            request.message_count,
            request.revealed_indexes
        );

        log::info!("Issuer signs the commitment");
        let blind_signature = issuer.blind_sign(&revealed, &request, &nonce)?;

        log::info!("Holder unblinds the signature");
        let mut signed = credential.clone();
        holder.complete_signature(&mut session, &mut signed, blind_signature)?;
        log::info!("Signed credential:\n{}", signed);

        holder.verify(&signed, &resolver)?;
        log::info!("Signature is VALID!");
        Ok(())
    }
}

#[cfg(feature = "bbsplus_blind")]
fn main() {
    use crate::blind_issuance_example::blind_issuance_main;

    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = blind_issuance_main() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "bbsplus_blind"))]
fn main() {}
