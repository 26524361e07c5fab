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

//! Conversion of arkworks proofs and verification keys into the snark JSON
//! shapes, for producing real registration proofs inside tests.
//!
//! Do NOT use this module for production code, but only tests.

use ark_bn254::{Bn254, Fq, G1Affine, G2Affine};
use ark_ff::{BigInteger as _, PrimeField as _};
use ark_groth16::{Proof, VerifyingKey};
use num_bigint::BigUint;

use crate::{ProofData, VerificationKey};

fn decimal(value: Fq) -> String {
    BigUint::from_bytes_be(&value.into_bigint().to_bytes_be()).to_string()
}

fn g1_limbs(point: &G1Affine) -> [String; 3] {
    assert!(!point.infinity, "cannot encode the point at infinity");
    [decimal(point.x), decimal(point.y), "1".to_owned()]
}

fn g2_limbs(point: &G2Affine) -> [[String; 2]; 3] {
    assert!(!point.infinity, "cannot encode the point at infinity");
    [
        [decimal(point.x.c0), decimal(point.x.c1)],
        [decimal(point.y.c0), decimal(point.y.c1)],
        ["1".to_owned(), "0".to_owned()],
    ]
}

/// Render an arkworks proof in the snarkjs projective-string layout.
pub fn proof_data(proof: &Proof<Bn254>) -> ProofData {
    ProofData {
        pi_a: g1_limbs(&proof.a),
        pi_b: g2_limbs(&proof.b),
        pi_c: g1_limbs(&proof.c),
        protocol: "groth16".to_owned(),
    }
}

/// Render an arkworks verification key as snarkjs `verification_key.json`.
pub fn verification_key_json(key: &VerifyingKey<Bn254>) -> String {
    let key = VerificationKey {
        vk_alpha_1: g1_limbs(&key.alpha_g1),
        vk_beta_2: g2_limbs(&key.beta_g2),
        vk_gamma_2: g2_limbs(&key.gamma_g2),
        vk_delta_2: g2_limbs(&key.delta_g2),
        ic: key.gamma_abc_g1.iter().map(g1_limbs).collect(),
    };

    serde_json::to_string(&key).expect("verification key serializes")
}
