//! Call data for the deployed bridge contracts.
//!
//! The set of supported calls is closed: each [`BridgeCall`] variant maps to
//! exactly one function signature of the ERC20-for-SPL contract or one of
//! the two native-token wrappers. Argument widths match the deployed
//! bytecode.

use alloy_primitives::U256;

use crate::abi::{encode_function_call, selector, AbiParam};

/// Contract families the bridge talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractAbi {
    /// ERC20 view of an SPL token: `claimTo`, `approveSolana`,
    /// `transferSolana`.
    Erc20ForSpl,
    /// Native gas-token wrapper: payable `withdraw(bytes32)`.
    NeonWrapper,
    /// WNEON-style ERC20 wrapper: payable `deposit()`, `withdraw(uint256)`.
    WrappedNeon,
}

/// A bridge contract call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    /// Pull `amount` from the SPL token account `from` (which has delegated
    /// to the caller's AUTH account) and credit EVM address `to`.
    ClaimTo {
        from: [u8; 32],
        to: [u8; 20],
        amount: u64,
    },
    /// Approve a ledger account to spend the caller's tokens.
    ApproveSolana { spender: [u8; 32], amount: u64 },
    /// Move the caller's tokens to the SPL token account `to`.
    TransferSolana { to: [u8; 32], amount: u64 },
    /// Send the attached native value to the ledger wallet `destination`.
    Withdraw { destination: [u8; 32] },
    /// Wrap the attached native value into the ERC20 wrapper.
    Deposit,
    /// Unwrap `amount` wei of the ERC20 wrapper back to native value.
    Unwrap { amount: u128 },
}

impl BridgeCall {
    pub fn signature(&self) -> &'static str {
        match self {
            BridgeCall::ClaimTo { .. } => "claimTo(bytes32,address,uint64)",
            BridgeCall::ApproveSolana { .. } => "approveSolana(bytes32,uint64)",
            BridgeCall::TransferSolana { .. } => "transferSolana(bytes32,uint64)",
            BridgeCall::Withdraw { .. } => "withdraw(bytes32)",
            BridgeCall::Deposit => "deposit()",
            BridgeCall::Unwrap { .. } => "withdraw(uint256)",
        }
    }

    pub fn contract(&self) -> ContractAbi {
        match self {
            BridgeCall::Withdraw { .. } => ContractAbi::NeonWrapper,
            BridgeCall::Deposit | BridgeCall::Unwrap { .. } => ContractAbi::WrappedNeon,
            _ => ContractAbi::Erc20ForSpl,
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(self.signature())
    }

    /// Full call data: selector followed by one word per argument.
    pub fn calldata(&self) -> Vec<u8> {
        let params = match self {
            BridgeCall::ClaimTo { from, to, amount } => vec![
                AbiParam::FixedBytes(*from),
                AbiParam::Address(*to),
                AbiParam::from(*amount),
            ],
            BridgeCall::ApproveSolana { spender, amount } => {
                vec![AbiParam::FixedBytes(*spender), AbiParam::from(*amount)]
            }
            BridgeCall::TransferSolana { to, amount } => {
                vec![AbiParam::FixedBytes(*to), AbiParam::from(*amount)]
            }
            BridgeCall::Withdraw { destination } => vec![AbiParam::FixedBytes(*destination)],
            BridgeCall::Deposit => Vec::new(),
            BridgeCall::Unwrap { amount } => vec![AbiParam::Uint(U256::from(*amount))],
        };

        encode_function_call(self.selector(), &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_deployed_contracts() {
        let claim = BridgeCall::ClaimTo {
            from: [0; 32],
            to: [0; 20],
            amount: 0,
        };
        let approve = BridgeCall::ApproveSolana {
            spender: [0; 32],
            amount: 0,
        };
        let transfer = BridgeCall::TransferSolana {
            to: [0; 32],
            amount: 0,
        };
        let withdraw = BridgeCall::Withdraw {
            destination: [0; 32],
        };

        assert_eq!(hex::encode(claim.selector()), "67d1c218");
        assert_eq!(hex::encode(approve.selector()), "93e29346");
        assert_eq!(hex::encode(transfer.selector()), "af554c5b");
        assert_eq!(hex::encode(withdraw.selector()), "8e19899e");
        assert_eq!(hex::encode(BridgeCall::Deposit.selector()), "d0e30db0");
        assert_eq!(hex::encode(BridgeCall::Unwrap { amount: 0 }.selector()), "2e1a7d4d");
    }

    #[test]
    fn claim_to_layout() {
        let call = BridgeCall::ClaimTo {
            from: [0xAB; 32],
            to: [0x12; 20],
            amount: 100_000_000,
        };
        let data = call.calldata();

        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(&data[4..36], &[0xAB; 32]);
        assert_eq!(&data[36..48], &[0u8; 12]);
        assert_eq!(&data[48..68], &[0x12; 20]);
        assert_eq!(&data[92..100], &100_000_000u64.to_be_bytes());
        assert_eq!(call.contract(), ContractAbi::Erc20ForSpl);
    }

    #[test]
    fn withdraw_targets_wrapper() {
        let call = BridgeCall::Withdraw {
            destination: [0x01; 32],
        };
        assert_eq!(call.calldata().len(), 36);
        assert_eq!(call.contract(), ContractAbi::NeonWrapper);
    }

    #[test]
    fn wrapped_neon_layouts() {
        let deposit = BridgeCall::Deposit;
        assert_eq!(deposit.calldata(), vec![0xd0, 0xe3, 0x0d, 0xb0]);
        assert_eq!(deposit.contract(), ContractAbi::WrappedNeon);

        let amount = 1_500_000_000_000_000_000u128;
        let unwrap = BridgeCall::Unwrap { amount };
        let data = unwrap.calldata();
        assert_eq!(data.len(), 36);
        assert_eq!(&data[4..20], &[0u8; 16]);
        assert_eq!(&data[20..], &amount.to_be_bytes());
        assert_eq!(unwrap.contract(), ContractAbi::WrappedNeon);
    }
}
