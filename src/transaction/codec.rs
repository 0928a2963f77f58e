//! Canonical RLP encoding of transactions.
//!
//! Both encodings are a single RLP list with the same leading fields:
//!
//! ```text
//! [kind, nonce, gasPrice, gasLimit, to, value, input, <trailer>]
//!
//! signing hash:  trailer = chainId, 0, 0   → keccak256 is what gets signed
//! wire format:   trailer = v, r, s
//! ```
//!
//! `to` is the empty string (`0x80`) for contract creation.

use alloy::primitives::{keccak256, Address, Bytes, Signature, TxKind, B256, U256};
use alloy::rlp::{BufMut, Decodable, Encodable, Header};

use crate::transaction::signature::recovery_parity;
use crate::transaction::types::{SignatureValues, TransactionError, TransactionResult, TxType};

/// A transaction draft, optionally carrying its signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub kind: TxType,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: U256,
    /// `None` creates a contract from `input`.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub signature: Option<SignatureValues>,
}

enum Trailer<'a> {
    ChainId(u64),
    Signature(&'a SignatureValues),
}

impl Trailer<'_> {
    fn length(&self) -> usize {
        match self {
            Trailer::ChainId(id) => id.length() + 2 * 0u8.length(),
            Trailer::Signature(sig) => sig.v.length() + sig.r.length() + sig.s.length(),
        }
    }

    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Trailer::ChainId(id) => {
                id.encode(out);
                0u8.encode(out);
                0u8.encode(out);
            }
            Trailer::Signature(sig) => {
                sig.v.encode(out);
                sig.r.encode(out);
                sig.s.encode(out);
            }
        }
    }
}

impl Transaction {
    /// A value transfer (or call, when `input` is non-empty) to `to`.
    pub fn new_transfer(
        nonce: u64,
        to: Address,
        value: U256,
        gas_limit: U256,
        gas_price: U256,
        input: Bytes,
    ) -> Self {
        Self {
            nonce,
            to: Some(to),
            value,
            gas_limit,
            gas_price,
            input,
            ..Default::default()
        }
    }

    /// A contract creation carrying init code in `input`.
    pub fn new_contract_creation(
        nonce: u64,
        value: U256,
        gas_limit: U256,
        gas_price: U256,
        input: Bytes,
    ) -> Self {
        Self {
            nonce,
            value,
            gas_limit,
            gas_price,
            input,
            ..Default::default()
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// A copy of this draft carrying `signature`. The draft itself is untouched.
    pub fn with_signature(&self, signature: SignatureValues) -> Self {
        Self {
            signature: Some(signature),
            ..self.clone()
        }
    }

    /// RLP of the signing form, `[..., chainId, 0, 0]`. Any signature is ignored.
    pub fn encode_for_signing(&self, chain_id: u64) -> Vec<u8> {
        self.encode_with(Trailer::ChainId(chain_id))
    }

    /// The 32-byte digest a signer must sign for `chain_id`.
    pub fn unsigned_hash(&self, chain_id: u64) -> B256 {
        keccak256(self.encode_for_signing(chain_id))
    }

    /// Wire-ready RLP `[..., v, r, s]`. Unsigned drafts are never encoded.
    pub fn encode_signed(&self) -> TransactionResult<Bytes> {
        let signature = self.signature.as_ref().ok_or(TransactionError::Unsigned)?;
        Ok(self.encode_with(Trailer::Signature(signature)).into())
    }

    /// Hash of the signed encoding, as reported by nodes.
    pub fn tx_hash(&self) -> TransactionResult<B256> {
        Ok(keccak256(self.encode_signed()?))
    }

    /// Recover the address that signed this transaction for `chain_id`.
    pub fn recover_sender(&self, chain_id: u64) -> TransactionResult<Address> {
        let values = self.signature.as_ref().ok_or(TransactionError::Unsigned)?;
        let parity = recovery_parity(values.v, chain_id)?;
        let signature = Signature::new(values.r, values.s, parity);

        signature
            .recover_address_from_prehash(&self.unsigned_hash(chain_id))
            .map_err(|e| TransactionError::Recovery(e.to_string()))
    }

    /// Decode a wire-format signed transaction.
    pub fn decode_signed(bytes: &[u8]) -> TransactionResult<Self> {
        let buf = &mut &bytes[..];
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy::rlp::Error::UnexpectedString.into());
        }
        let remaining = buf.len();
        if remaining < header.payload_length {
            return Err(alloy::rlp::Error::InputTooShort.into());
        }

        let kind = TxType(u64::decode(buf)?);
        let nonce = u64::decode(buf)?;
        let gas_price = U256::decode(buf)?;
        let gas_limit = U256::decode(buf)?;
        let to = match TxKind::decode(buf)? {
            TxKind::Call(address) => Some(address),
            TxKind::Create => None,
        };
        let value = U256::decode(buf)?;
        let input = Bytes::decode(buf)?;
        let v = U256::decode(buf)?;
        let r = U256::decode(buf)?;
        let s = U256::decode(buf)?;

        let consumed = remaining - buf.len();
        if consumed != header.payload_length {
            return Err(alloy::rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: consumed,
            }
            .into());
        }
        if !buf.is_empty() {
            return Err(alloy::rlp::Error::Custom("trailing bytes after transaction").into());
        }

        Ok(Self {
            kind,
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
            signature: Some(SignatureValues { r, s, v }),
        })
    }

    fn recipient(&self) -> TxKind {
        match self.to {
            Some(address) => TxKind::Call(address),
            None => TxKind::Create,
        }
    }

    fn encode_with(&self, trailer: Trailer<'_>) -> Vec<u8> {
        let recipient = self.recipient();
        let payload_length = self.kind.0.length()
            + self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + recipient.length()
            + self.value.length()
            + self.input.length()
            + trailer.length();

        let mut out = Vec::with_capacity(payload_length + 9);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.kind.0.encode(&mut out);
        self.nonce.encode(&mut out);
        self.gas_price.encode(&mut out);
        self.gas_limit.encode(&mut out);
        recipient.encode(&mut out);
        self.value.encode(&mut out);
        self.input.encode(&mut out);
        trailer.encode(&mut out);
        out
    }
}
