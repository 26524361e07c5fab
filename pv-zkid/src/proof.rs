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

//! The snark JSON proof and verification-key shapes, and their conversion
//! into arkworks types over BN254.
//!
//! Provers emit proofs in the snarkjs layout: projective coordinates as
//! decimal (or `0x`-hex) big-integer strings, with the `z` limb pinned to
//! one.  Conversion validates every decoded point.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::PrimeField;
use ark_groth16::{prepare_verifying_key, PreparedVerifyingKey, Proof, VerifyingKey};
use num_bigint::BigUint;
use pverror::{traits::ErrorContext as _, Error};
use serde::{Deserialize, Serialize};

use crate::{Result, ZkIdError};

/// A Groth16 proof together with its public signals, as submitted by a
/// client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZkProof {
    /// The proof points.
    pub proof: ProofData,
    /// The positional public signals, as big-integer strings.
    pub pub_signals: Vec<String>,
}

/// The three proof points in the snarkjs projective-string layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofData {
    /// `π_a`, a G1 point.
    pub pi_a: [String; 3],
    /// `π_b`, a G2 point (coordinate pairs).
    pub pi_b: [[String; 2]; 3],
    /// `π_c`, a G1 point.
    pub pi_c: [String; 3],
    /// The proving protocol; must be `groth16`.
    pub protocol: String,
}

/// A Groth16 verification key in the snarkjs `verification_key.json` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationKey {
    /// `α` in G1.
    pub vk_alpha_1: [String; 3],
    /// `β` in G2.
    pub vk_beta_2: [[String; 2]; 3],
    /// `γ` in G2.
    pub vk_gamma_2: [[String; 2]; 3],
    /// `δ` in G2.
    pub vk_delta_2: [[String; 2]; 3],
    /// The public-input bases in G1.
    #[serde(rename = "IC")]
    pub ic: Vec<[String; 3]>,
}

impl ZkProof {
    /// The public signals as scalar field elements.
    pub fn public_inputs(&self) -> Result<Vec<Fr>> {
        self.pub_signals.iter().map(|signal| fr(signal)).collect()
    }
}

impl ProofData {
    pub(crate) fn to_arkworks(&self) -> Result<Proof<Bn254>> {
        if self.protocol != "groth16" {
            return Err(Error::root(ZkIdError::UnsupportedProtocol(
                self.protocol.clone(),
            )));
        }

        Ok(Proof {
            a: g1(&self.pi_a).ctx(|| "pi_a")?,
            b: g2(&self.pi_b).ctx(|| "pi_b")?,
            c: g1(&self.pi_c).ctx(|| "pi_c")?,
        })
    }
}

impl VerificationKey {
    /// Convert into a prepared arkworks verification key.
    pub fn to_prepared(&self) -> Result<PreparedVerifyingKey<Bn254>> {
        let key = VerifyingKey::<Bn254> {
            alpha_g1: g1(&self.vk_alpha_1).ctx(|| "vk_alpha_1")?,
            beta_g2: g2(&self.vk_beta_2).ctx(|| "vk_beta_2")?,
            gamma_g2: g2(&self.vk_gamma_2).ctx(|| "vk_gamma_2")?,
            delta_g2: g2(&self.vk_delta_2).ctx(|| "vk_delta_2")?,
            gamma_abc_g1: self
                .ic
                .iter()
                .map(g1)
                .collect::<Result<_>>()
                .ctx(|| "IC")?,
        };

        Ok(prepare_verifying_key(&key))
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal big-integer string.
pub(crate) fn parse_big_int(input: &str) -> Result<BigUint> {
    let (digits, radix) = match input.strip_prefix("0x") {
        Some(digits) => (digits, 16),
        None => (input, 10),
    };

    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| Error::root(ZkIdError::InvalidFieldElement).ctx(input.to_owned()))
}

fn fq(input: &str) -> Result<Fq> {
    Ok(Fq::from_be_bytes_mod_order(
        &parse_big_int(input)?.to_bytes_be(),
    ))
}

fn fr(input: &str) -> Result<Fr> {
    Ok(Fr::from_be_bytes_mod_order(
        &parse_big_int(input)?.to_bytes_be(),
    ))
}

fn require_affine(z: &str) -> Result<()> {
    if parse_big_int(z)? != BigUint::from(1u8) {
        return Err(Error::root(ZkIdError::InvalidFieldElement)
            .ctx("projective z limb is not one"));
    }
    Ok(())
}

fn g1(limbs: &[String; 3]) -> Result<G1Affine> {
    require_affine(&limbs[2])?;

    let point = G1Affine::new_unchecked(fq(&limbs[0])?, fq(&limbs[1])?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(Error::root(ZkIdError::PointNotOnCurve));
    }

    Ok(point)
}

fn g2(limbs: &[[String; 2]; 3]) -> Result<G2Affine> {
    require_affine(&limbs[2][0])?;
    if parse_big_int(&limbs[2][1])? != BigUint::from(0u8) {
        return Err(Error::root(ZkIdError::InvalidFieldElement)
            .ctx("projective z limb is not one"));
    }

    let x = Fq2::new(fq(&limbs[0][0])?, fq(&limbs[0][1])?);
    let y = Fq2::new(fq(&limbs[1][0])?, fq(&limbs[1][1])?);

    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(Error::root(ZkIdError::PointNotOnCurve));
    }

    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_int_strings_parse_in_both_radixes() {
        assert_eq!(parse_big_int("255").unwrap(), BigUint::from(255u32));
        assert_eq!(parse_big_int("0xff").unwrap(), BigUint::from(255u32));

        assert!(parse_big_int("").is_err());
        assert!(parse_big_int("0x").is_err());
        assert!(parse_big_int("twelve").is_err());
    }

    #[test]
    fn generator_point_is_accepted() {
        // the BN254 G1 generator
        let point = g1(&["1".to_owned(), "2".to_owned(), "1".to_owned()]).unwrap();
        assert!(point.is_on_curve());
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let error = g1(&["1".to_owned(), "1".to_owned(), "1".to_owned()]).unwrap_err();
        assert_eq!(error.error, ZkIdError::PointNotOnCurve);
    }

    #[test]
    fn non_affine_encoding_is_rejected() {
        let error = g1(&["1".to_owned(), "2".to_owned(), "2".to_owned()]).unwrap_err();
        assert_eq!(error.error, ZkIdError::InvalidFieldElement);
    }

    #[test]
    fn protocol_must_be_groth16() {
        let proof = ProofData {
            pi_a: ["1".to_owned(), "2".to_owned(), "1".to_owned()],
            pi_b: Default::default(),
            pi_c: ["1".to_owned(), "2".to_owned(), "1".to_owned()],
            protocol: "plonk".to_owned(),
        };

        let error = proof.to_arkworks().unwrap_err();
        assert_eq!(
            error.error,
            ZkIdError::UnsupportedProtocol("plonk".to_owned())
        );
    }

    #[test]
    fn proof_json_shape_deserializes() {
        let proof: ZkProof = serde_json::from_value(serde_json::json!({
            "proof": {
                "pi_a": ["1", "2", "1"],
                "pi_b": [["1", "0"], ["2", "0"], ["1", "0"]],
                "pi_c": ["0x1", "0x2", "1"],
                "protocol": "groth16"
            },
            "pub_signals": ["311079412662512021", "18446744073709551616", "42"]
        }))
        .unwrap();

        assert_eq!(proof.proof.protocol, "groth16");
        assert_eq!(proof.pub_signals.len(), 3);
        assert_eq!(proof.public_inputs().unwrap().len(), 3);
    }
}
