// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Groth16 proof verification against the per-hash-family verification
//! keys.

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey};
use pv_emrtd::HashFamily;
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};

use crate::{proof::VerificationKey, Result, ZkIdError, ZkProof};

/// The verification keys of the registration circuits, one per digest
/// family.
///
/// The registration circuit is compiled once per SOD digest, so a proof is
/// checked against the key matching the algorithm of the presented SOD:
/// `SHA1withECDSA` against the SHA-1 key, `SHA256withRSA` and
/// `SHA256withECDSA` against the SHA-256 key.
#[derive(Debug)]
pub struct VerifierKeys {
    sha1: PreparedVerifyingKey<Bn254>,
    sha256: PreparedVerifyingKey<Bn254>,
}

impl VerifierKeys {
    /// Parse and prepare both verification keys from their snark JSON
    /// renderings.
    pub fn from_json(sha1: &str, sha256: &str) -> Result<Self> {
        Ok(Self {
            sha1: parse_key(sha1).ctx(|| "SHA1 verification key")?,
            sha256: parse_key(sha256).ctx(|| "SHA256 verification key")?,
        })
    }

    /// The key a proof for the given hash family is verified against.
    pub fn for_family(&self, family: HashFamily) -> &PreparedVerifyingKey<Bn254> {
        match family {
            HashFamily::Sha1 => &self.sha1,
            HashFamily::Sha256 => &self.sha256,
        }
    }
}

fn parse_key(json: &str) -> Result<PreparedVerifyingKey<Bn254>> {
    let key: VerificationKey =
        serde_json::from_str(json).foreign_err(|| ZkIdError::MalformedVerificationKey)?;
    key.to_prepared()
}

/// Verify a registration proof against a prepared verification key, with
/// the proof's public signals as the public inputs.
pub fn verify_registration_proof(
    proof: &ZkProof,
    key: &PreparedVerifyingKey<Bn254>,
) -> Result<()> {
    let parsed = proof.proof.to_arkworks()?;
    let inputs = proof.public_inputs()?;

    let valid = Groth16::<Bn254>::verify_proof(key, &parsed, &inputs)
        .map_err(|error| Error::root(ZkIdError::VerifierFailure).ctx(error.to_string()))?;

    if !valid {
        return Err(Error::root(ZkIdError::ProofRejected));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ark_bn254::Fr;
    use ark_relations::{
        lc,
        r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable},
    };
    use ark_snark::{CircuitSpecificSetupSNARK as _, SNARK as _};
    use ark_std::rand::{rngs::StdRng, SeedableRng as _};

    use super::*;
    use crate::test_support::{proof_data, verification_key_json};

    /// A circuit that only binds its public inputs, used to produce real
    /// proofs over arbitrary signal vectors.
    #[derive(Clone)]
    struct SignalBinding {
        signals: Option<Vec<Fr>>,
        count: usize,
    }

    impl ConstraintSynthesizer<Fr> for SignalBinding {
        fn generate_constraints(
            self,
            cs: ConstraintSystemRef<Fr>,
        ) -> std::result::Result<(), SynthesisError> {
            for index in 0..self.count {
                let value = self.signals.as_ref().map(|signals| signals[index]);
                let input =
                    cs.new_input_variable(|| value.ok_or(SynthesisError::AssignmentMissing))?;
                cs.enforce_constraint(
                    lc!() + input,
                    lc!() + Variable::One,
                    lc!() + input,
                )?;
            }
            Ok(())
        }
    }

    fn prove(signals: &[u64], seed: u64) -> (String, ZkProof) {
        let values: Vec<Fr> = signals.iter().map(|signal| Fr::from(*signal)).collect();
        let circuit = SignalBinding {
            signals: Some(values),
            count: signals.len(),
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let (proving_key, verifying_key) =
            Groth16::<Bn254>::setup(circuit.clone(), &mut rng).unwrap();
        let proof = Groth16::<Bn254>::prove(&proving_key, circuit, &mut rng).unwrap();

        let proof = ZkProof {
            proof: proof_data(&proof),
            pub_signals: signals.iter().map(u64::to_string).collect(),
        };

        (verification_key_json(&verifying_key), proof)
    }

    #[test]
    fn real_proof_verifies_through_the_json_shapes() {
        let (key_json, proof) = prove(&[3, 1, 4, 1, 5, 9, 2, 6, 5, 35], 7);

        let keys = VerifierKeys::from_json(&key_json, &key_json).unwrap();
        verify_registration_proof(&proof, keys.for_family(HashFamily::Sha256)).unwrap();
    }

    #[test]
    fn tampered_signal_is_rejected() {
        let (key_json, mut proof) = prove(&[3, 1, 4, 1, 5, 9, 2, 6, 5, 35], 7);
        proof.pub_signals[9] = "36".to_owned();

        let keys = VerifierKeys::from_json(&key_json, &key_json).unwrap();
        let error =
            verify_registration_proof(&proof, keys.for_family(HashFamily::Sha256)).unwrap_err();
        assert_eq!(error.error, ZkIdError::ProofRejected);
    }

    #[test]
    fn families_select_distinct_keys() {
        let (sha1_key, sha1_proof) = prove(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 11);
        let (sha256_key, _) = prove(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 13);

        let keys = VerifierKeys::from_json(&sha1_key, &sha256_key).unwrap();

        verify_registration_proof(&sha1_proof, keys.for_family(HashFamily::Sha1)).unwrap();
        let error =
            verify_registration_proof(&sha1_proof, keys.for_family(HashFamily::Sha256))
                .unwrap_err();
        assert_eq!(error.error, ZkIdError::ProofRejected);
    }

    #[test]
    fn malformed_key_json_is_rejected() {
        let error = VerifierKeys::from_json("{}", "{}").unwrap_err();
        assert_eq!(error.error, ZkIdError::MalformedVerificationKey);
    }
}
