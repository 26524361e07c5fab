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

//! Poseidon-based identity hashes over the BN254 scalar field.
//!
//! Three derived values anchor a claim to a passport presentation:
//!
//! * the **document nullifier**, hashed from the DG2 octet string and the
//!   process-wide secret blinder,
//! * the **credential hash**, hashed from the issuing authority and the
//!   nullifier,
//! * the **document fingerprint**, a byte-oriented sponge hash of the
//!   signed attributes and the blinder whose decimal rendering keys the
//!   claim table.
//!
//! The blinder keeps all three values resistant to offline dictionary
//! attacks against public hash values.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher};
use num_bigint::BigUint;
use pverror::traits::ForeignError as _;

use crate::{Result, ZkIdError};

// One byte below the field-element size, so a chunk can never exceed the
// modulus.
const CHUNK_SIZE: usize = 31;

// Width of a sponge frame.  The circom parameter set tops out at twelve
// inputs.
const FRAME_SIZE: usize = 12;

/// The document nullifier over the DG2 octet string and the blinder.
///
/// DG2 is split into its two big-endian halves when it is at least 32 bytes
/// long, and absorbed as a single limb otherwise; the blinder is appended as
/// the final input.
pub fn document_nullifier(dg2: &[u8], blinder: &BigUint) -> Result<BigUint> {
    let mut inputs = Vec::with_capacity(3);

    if dg2.len() >= 32 {
        let (first, second) = dg2.split_at(dg2.len() / 2);
        inputs.push(field_from_bytes(first));
        inputs.push(field_from_bytes(second));
    } else {
        inputs.push(field_from_bytes(dg2));
    }
    inputs.push(field_from_big_int(blinder));

    Ok(big_int_from_field(poseidon(&inputs)?))
}

/// The credential hash over `[1, issuing_authority, document_nullifier]`.
pub fn credential_hash(issuing_authority: i64, nullifier: &BigUint) -> Result<BigUint> {
    let inputs = [
        Fr::from(1u64),
        Fr::from(issuing_authority),
        field_from_big_int(nullifier),
    ];

    Ok(big_int_from_field(poseidon(&inputs)?))
}

/// The document fingerprint over `signed_attributes ∥ blinder` bytes.
///
/// Its decimal rendering is the `document_hash` value claims are keyed by.
pub fn document_fingerprint(signed_attributes: &[u8], blinder: &BigUint) -> Result<BigUint> {
    let mut data = signed_attributes.to_vec();
    data.extend(blinder.to_bytes_be());

    Ok(big_int_from_field(hash_bytes(&data)?))
}

/// Byte-oriented Poseidon sponge.
///
/// The buffer is cut into 31-byte chunks, the trailing chunk zero-padded on
/// the right, and the chunks are absorbed as big-endian field elements into
/// a [`FRAME_SIZE`]-wide frame.  A full frame is hashed and the digest
/// carried into the first slot of the next frame; unused slots stay zero.
fn hash_bytes(data: &[u8]) -> Result<Fr> {
    let mut inputs = [Fr::from(0u64); FRAME_SIZE];
    let mut filled = 0;
    let mut hash = Fr::from(0u64);
    let mut dirty = false;

    let mut chunks = data.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        dirty = true;
        inputs[filled] = field_from_bytes(chunk);
        if filled == FRAME_SIZE - 1 {
            hash = poseidon(&inputs)?;
            dirty = false;
            inputs = [Fr::from(0u64); FRAME_SIZE];
            inputs[0] = hash;
            filled = 1;
        } else {
            filled += 1;
        }
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let mut padded = [0u8; CHUNK_SIZE];
        padded[..remainder.len()].copy_from_slice(remainder);
        inputs[filled] = field_from_bytes(&padded);
        dirty = true;
    }

    if dirty {
        hash = poseidon(&inputs)?;
    }

    Ok(hash)
}

fn poseidon(inputs: &[Fr]) -> Result<Fr> {
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).foreign_err(|| ZkIdError::HashingFailed)?;
    hasher.hash(inputs).foreign_err(|| ZkIdError::HashingFailed)
}

fn field_from_bytes(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

fn field_from_big_int(value: &BigUint) -> Fr {
    Fr::from_be_bytes_mod_order(&value.to_bytes_be())
}

fn big_int_from_field(value: Fr) -> BigUint {
    BigUint::from_bytes_be(&value.into_bigint().to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blinder() -> BigUint {
        BigUint::parse_bytes(b"1234567890123456789012345678901234567890", 10).unwrap()
    }

    #[test]
    fn matches_the_circom_test_vector() {
        // poseidon([1, 2]) from the circomlib reference implementation
        let hash = big_int_from_field(poseidon(&[Fr::from(1u64), Fr::from(2u64)]).unwrap());
        assert_eq!(
            hash.to_string(),
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
        );
    }

    #[test]
    fn long_dg2_is_split_into_halves() {
        let dg2: Vec<u8> = (1..=32).collect();
        let blinder = blinder();

        let expected = big_int_from_field(
            poseidon(&[
                field_from_bytes(&dg2[..16]),
                field_from_bytes(&dg2[16..]),
                field_from_big_int(&blinder),
            ])
            .unwrap(),
        );

        assert_eq!(document_nullifier(&dg2, &blinder).unwrap(), expected);
    }

    #[test]
    fn short_dg2_is_a_single_limb() {
        let dg2: Vec<u8> = (1..=16).collect();
        let blinder = blinder();

        let expected = big_int_from_field(
            poseidon(&[field_from_bytes(&dg2), field_from_big_int(&blinder)]).unwrap(),
        );

        assert_eq!(document_nullifier(&dg2, &blinder).unwrap(), expected);
    }

    #[test]
    fn nullifier_depends_on_the_blinder() {
        let dg2: Vec<u8> = (1..=32).collect();

        let one = document_nullifier(&dg2, &blinder()).unwrap();
        let other = document_nullifier(&dg2, &(blinder() + 1u8)).unwrap();
        assert_ne!(one, other);
    }

    #[test]
    fn credential_hash_is_deterministic() {
        let nullifier = document_nullifier(&[7u8; 32], &blinder()).unwrap();

        let one = credential_hash(4903594, &nullifier).unwrap();
        let two = credential_hash(4903594, &nullifier).unwrap();
        assert_eq!(one, two);

        let other = credential_hash(4903595, &nullifier).unwrap();
        assert_ne!(one, other);
    }

    #[test]
    fn byte_hash_absorbs_one_frame_with_zero_padding() {
        // two full chunks and a right-padded remainder share a single frame
        let data: Vec<u8> = (0..70).collect();
        let mut padded = [0u8; CHUNK_SIZE];
        padded[..8].copy_from_slice(&data[62..]);

        let mut frame = [Fr::from(0u64); FRAME_SIZE];
        frame[0] = field_from_bytes(&data[..31]);
        frame[1] = field_from_bytes(&data[31..62]);
        frame[2] = field_from_bytes(&padded);

        assert_eq!(hash_bytes(&data).unwrap(), poseidon(&frame).unwrap());
    }

    #[test]
    fn byte_hash_carries_the_digest_across_frames() {
        let data = vec![7u8; CHUNK_SIZE * (FRAME_SIZE + 1)];
        let chunk = field_from_bytes(&data[..CHUNK_SIZE]);

        let first = [chunk; FRAME_SIZE];
        let carried = poseidon(&first).unwrap();

        let mut second = [Fr::from(0u64); FRAME_SIZE];
        second[0] = carried;
        second[1] = chunk;

        assert_eq!(hash_bytes(&data).unwrap(), poseidon(&second).unwrap());
    }

    #[test]
    fn byte_hash_of_aligned_input_skips_the_final_permutation() {
        // exactly one full frame: the frame hash is the digest
        let data = vec![9u8; CHUNK_SIZE * FRAME_SIZE];
        let chunk = field_from_bytes(&data[..CHUNK_SIZE]);

        let frame = [chunk; FRAME_SIZE];
        assert_eq!(hash_bytes(&data).unwrap(), poseidon(&frame).unwrap());
    }

    #[test]
    fn fingerprint_distinguishes_documents_and_blinders() {
        let attributes = vec![0xabu8; 100];

        let fingerprint = document_fingerprint(&attributes, &blinder()).unwrap();
        assert_eq!(
            fingerprint,
            document_fingerprint(&attributes, &blinder()).unwrap()
        );

        assert_ne!(
            fingerprint,
            document_fingerprint(&[0xacu8; 100], &blinder()).unwrap()
        );
        assert_ne!(
            fingerprint,
            document_fingerprint(&attributes, &(blinder() + 1u8)).unwrap()
        );
    }

    #[test]
    fn fingerprint_is_sensitive_to_chunk_boundaries() {
        // moving a byte across the limb boundary changes the digest
        let mut data = vec![0u8; 62];
        data[30] = 1;
        let one = document_fingerprint(&data, &blinder()).unwrap();

        let mut data = vec![0u8; 62];
        data[31] = 1;
        let two = document_fingerprint(&data, &blinder()).unwrap();

        assert_ne!(one, two);
    }
}
