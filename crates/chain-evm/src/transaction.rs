//! EVM transaction encoding and signing.
//!
//! Two envelopes are supported:
//! - legacy EIP-155 transactions, which is what the Neon proxy expects from
//!   the emulate signer when it prepares a claim;
//! - EIP-1559 (type 2) transactions for calls sent from the user's own
//!   wallet.

use alloy_rlp::{BufMut, Encodable, Header};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address::parse_address;
use crate::error::EvmError;

/// An unsigned legacy transaction, signed with EIP-155 replay protection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Recipient address as a 0x-prefixed hex string.
    pub to: String,
    pub value: u128,
    pub data: Vec<u8>,
}

/// An unsigned EIP-1559 (type 2) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    /// Recipient address as a 0x-prefixed hex string.
    pub to: String,
    pub value: u128,
    pub data: Vec<u8>,
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// Raw signed bytes (RLP list for legacy, `0x02 || rlp` for EIP-1559).
    pub raw_tx: Vec<u8>,
    /// Transaction hash as a 0x-prefixed hex string.
    pub tx_hash: String,
}

impl SignedEthTransaction {
    fn from_raw(raw_tx: Vec<u8>) -> Self {
        let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));
        Self { raw_tx, tx_hash }
    }
}

/// Builds an unsigned contract call as an EIP-1559 transaction.
#[allow(clippy::too_many_arguments)]
pub fn build_call(
    chain_id: u64,
    nonce: u64,
    to: &str,
    value: u128,
    data: Vec<u8>,
    max_priority_fee: u128,
    max_fee: u128,
    gas_limit: u64,
) -> Result<EthTransaction, EvmError> {
    parse_address(to)?;

    if max_priority_fee > max_fee {
        return Err(EvmError::TransactionBuildError(
            "priority fee exceeds max fee".into(),
        ));
    }

    Ok(EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: max_priority_fee,
        max_fee_per_gas: max_fee,
        gas_limit,
        to: to.to_string(),
        value,
        data,
    })
}

/// Signs a legacy transaction with EIP-155 replay protection.
///
/// The signing payload is `rlp([nonce, gasPrice, gas, to, value, data,
/// chainId, 0, 0])`; the signed form replaces the last three fields with
/// `v = 35 + 2 * chainId + parity`, `r`, `s`.
pub fn sign_legacy_transaction(
    tx: &LegacyTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EvmError> {
    let to = RlpAddress(parse_address(&tx.to)?);
    let data = RlpBytes(&tx.data);

    let unsigned = rlp_list(&[
        &tx.nonce,
        &tx.gas_price,
        &tx.gas_limit,
        &to,
        &tx.value,
        &data,
        &tx.chain_id,
        &0u8,
        &0u8,
    ]);

    let (r, s, parity) = sign_prehash(&Keccak256::digest(&unsigned), private_key)?;
    let v = tx
        .chain_id
        .checked_mul(2)
        .and_then(|c| c.checked_add(35 + parity as u64))
        .ok_or(EvmError::UnsupportedChain(tx.chain_id))?;

    let raw_tx = rlp_list(&[
        &tx.nonce,
        &tx.gas_price,
        &tx.gas_limit,
        &to,
        &tx.value,
        &data,
        &v,
        &RlpU256(r),
        &RlpU256(s),
    ]);

    Ok(SignedEthTransaction::from_raw(raw_tx))
}

/// Signs an EIP-1559 transaction.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EvmError> {
    let unsigned_payload = encode_unsigned_tx(tx)?;
    let (r, s, y_parity) = sign_prehash(&Keccak256::digest(&unsigned_payload), private_key)?;

    let to = RlpAddress(parse_address(&tx.to)?);
    let data = RlpBytes(&tx.data);
    let rlp = rlp_list(&[
        &tx.chain_id,
        &tx.nonce,
        &tx.max_priority_fee_per_gas,
        &tx.max_fee_per_gas,
        &tx.gas_limit,
        &to,
        &tx.value,
        &data,
        &EmptyList,
        &y_parity,
        &RlpU256(r),
        &RlpU256(s),
    ]);

    let mut raw_tx = Vec::with_capacity(1 + rlp.len());
    raw_tx.push(0x02);
    raw_tx.extend_from_slice(&rlp);

    Ok(SignedEthTransaction::from_raw(raw_tx))
}

/// Encodes the unsigned EIP-1559 payload `0x02 || rlp(fields)`.
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Result<Vec<u8>, EvmError> {
    let to = RlpAddress(parse_address(&tx.to)?);
    let data = RlpBytes(&tx.data);
    let rlp = rlp_list(&[
        &tx.chain_id,
        &tx.nonce,
        &tx.max_priority_fee_per_gas,
        &tx.max_fee_per_gas,
        &tx.gas_limit,
        &to,
        &tx.value,
        &data,
        &EmptyList,
    ]);

    let mut payload = Vec::with_capacity(1 + rlp.len());
    payload.push(0x02);
    payload.extend_from_slice(&rlp);
    Ok(payload)
}

/// Signs a 32-byte digest, returning `(r, s, y_parity)`.
fn sign_prehash(digest: &[u8], private_key: &[u8; 32]) -> Result<([u8; 32], [u8; 32], u8), EvmError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EvmError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(digest)
        .map_err(|e| EvmError::SigningError(e.to_string()))?;

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());

    Ok((r, s, recovery_id.is_y_odd() as u8))
}

// ---------------------------------------------------------------------------
// RLP helpers
// ---------------------------------------------------------------------------

fn rlp_list(fields: &[&dyn Encodable]) -> Vec<u8> {
    let payload_length = fields.iter().map(|f| f.length()).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for field in fields {
        field.encode(&mut out);
    }
    out
}

/// A 20-byte address encoded as an RLP string.
struct RlpAddress([u8; 20]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Arbitrary bytes encoded as an RLP string.
struct RlpBytes<'a>(&'a [u8]);

impl Encodable for RlpBytes<'_> {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out);
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

/// A 256-bit big-endian integer with leading zeros stripped.
struct RlpU256([u8; 32]);

impl RlpU256 {
    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}

/// The empty EIP-2930 access list.
struct EmptyList;

impl Encodable for EmptyList {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: 0,
        }
        .encode(out);
    }

    fn length(&self) -> usize {
        1
    }
}
