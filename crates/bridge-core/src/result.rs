//! Ecosystem-neutral assembler output and per-ecosystem adapters.
//!
//! Assemblers return a list of [`BridgeInstruction`]s. The adapters below
//! turn that list into the concrete transaction the caller signs: a compiled
//! ledger message, a legacy EVM transaction or an EIP-1559 one.

use chain_evm::transaction::build_call;
use chain_evm::{BridgeCall, ContractAbi, EthTransaction, LegacyTransaction};
use chain_sol::{compile_transaction, serialize_unsigned, Pubkey, SolInstruction, SolTransaction};

use crate::error::BridgeError;

/// A contract call on the EVM side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmCall {
    /// Contract address, 0x-prefixed.
    pub to: String,
    pub abi: ContractAbi,
    /// Native value attached, in wei.
    pub value: u128,
    pub data: Vec<u8>,
}

impl EvmCall {
    pub fn new(to: &str, call: &BridgeCall, value: u128) -> Self {
        Self {
            to: to.to_string(),
            abi: call.contract(),
            value,
            data: call.calldata(),
        }
    }
}

/// One step of a transfer, on either ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeInstruction {
    Ledger(SolInstruction),
    Evm(EvmCall),
}

impl BridgeInstruction {
    pub fn as_ledger(&self) -> Option<&SolInstruction> {
        match self {
            BridgeInstruction::Ledger(ix) => Some(ix),
            BridgeInstruction::Evm(_) => None,
        }
    }

    pub fn as_evm(&self) -> Option<&EvmCall> {
        match self {
            BridgeInstruction::Evm(call) => Some(call),
            BridgeInstruction::Ledger(_) => None,
        }
    }
}

impl From<SolInstruction> for BridgeInstruction {
    fn from(ix: SolInstruction) -> Self {
        BridgeInstruction::Ledger(ix)
    }
}

impl From<EvmCall> for BridgeInstruction {
    fn from(call: EvmCall) -> Self {
        BridgeInstruction::Evm(call)
    }
}

/// The transaction a caller signs and submits.
#[derive(Debug, Clone)]
pub enum TransactionResult {
    Ledger(SolTransaction),
    EvmLegacy(LegacyTransaction),
    EvmEip1559(EthTransaction),
}

impl TransactionResult {
    pub fn as_ledger(&self) -> Option<&SolTransaction> {
        match self {
            TransactionResult::Ledger(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_legacy(&self) -> Option<&LegacyTransaction> {
        match self {
            TransactionResult::EvmLegacy(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_eip1559(&self) -> Option<&EthTransaction> {
        match self {
            TransactionResult::EvmEip1559(tx) => Some(tx),
            _ => None,
        }
    }

    /// Wire bytes of a ledger transaction with empty signature slots, for
    /// wallets that sign externally.
    pub fn unsigned_ledger_wire(&self) -> Result<Vec<u8>, BridgeError> {
        let tx = self
            .as_ledger()
            .ok_or_else(|| BridgeError::Encoding("not a ledger transaction".into()))?;
        Ok(serialize_unsigned(tx)?)
    }
}

/// Fee and ordering parameters for an EVM transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmTxParams {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    pub fee: EvmFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmFee {
    Legacy { gas_price: u128 },
    Eip1559 { max_priority_fee: u128, max_fee: u128 },
}

/// Compiles ledger instructions into one atomic transaction paid by
/// `fee_payer`. Instruction order is kept as given.
pub fn to_ledger_transaction(
    instructions: &[BridgeInstruction],
    fee_payer: &Pubkey,
    recent_blockhash: &[u8; 32],
) -> Result<TransactionResult, BridgeError> {
    let ledger = instructions
        .iter()
        .map(|ix| match ix {
            BridgeInstruction::Ledger(ix) => Ok(ix.clone()),
            BridgeInstruction::Evm(call) => Err(BridgeError::Encoding(format!(
                "EVM call to {} cannot join a ledger transaction",
                call.to
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransactionResult::Ledger(compile_transaction(
        &ledger,
        fee_payer,
        recent_blockhash,
    )?))
}

fn single_evm_call(instructions: &[BridgeInstruction]) -> Result<&EvmCall, BridgeError> {
    match instructions {
        [BridgeInstruction::Evm(call)] => Ok(call),
        _ => Err(BridgeError::Encoding(format!(
            "expected exactly one EVM call, got {} instructions",
            instructions.len()
        ))),
    }
}

pub fn to_legacy_transaction(
    instructions: &[BridgeInstruction],
    params: &EvmTxParams,
) -> Result<TransactionResult, BridgeError> {
    let call = single_evm_call(instructions)?;
    let EvmFee::Legacy { gas_price } = params.fee else {
        return Err(BridgeError::Config("legacy transaction needs a gas price".into()));
    };

    chain_evm::parse_address(&call.to)?;
    Ok(TransactionResult::EvmLegacy(LegacyTransaction {
        chain_id: params.chain_id,
        nonce: params.nonce,
        gas_price,
        gas_limit: params.gas_limit,
        to: call.to.clone(),
        value: call.value,
        data: call.data.clone(),
    }))
}

pub fn to_eip1559_transaction(
    instructions: &[BridgeInstruction],
    params: &EvmTxParams,
) -> Result<TransactionResult, BridgeError> {
    let call = single_evm_call(instructions)?;
    let EvmFee::Eip1559 {
        max_priority_fee,
        max_fee,
    } = params.fee
    else {
        return Err(BridgeError::Config("EIP-1559 transaction needs fee caps".into()));
    };

    Ok(TransactionResult::EvmEip1559(build_call(
        params.chain_id,
        params.nonce,
        &call.to,
        call.value,
        call.data.clone(),
        max_priority_fee,
        max_fee,
        params.gas_limit,
    )?))
}
