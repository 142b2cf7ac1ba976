//! Contract bindings and request builders.

use crate::ReadError;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolValue, sol};

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    interface IWETH {
        function deposit() external payable;
    }

    interface IRootChainManager {
        function depositFor(address user, address rootToken, bytes calldata depositData) external;
        function depositEtherFor(address user) external payable;
    }
}

/// `balanceOf(owner)` call on `token`.
pub fn balance_of(token: Address, owner: Address) -> TransactionRequest {
    call(token, IERC20::balanceOfCall { owner }.abi_encode())
}

/// `allowance(owner, spender)` call on `token`.
pub fn allowance(token: Address, owner: Address, spender: Address) -> TransactionRequest {
    call(token, IERC20::allowanceCall { owner, spender }.abi_encode())
}

pub fn decode_balance(output: &Bytes) -> Result<U256, ReadError> {
    IERC20::balanceOfCall::abi_decode_returns(output)
        .map_err(|source| ReadError::Decode { method: "balanceOf", source })
}

pub fn decode_allowance(output: &Bytes) -> Result<U256, ReadError> {
    IERC20::allowanceCall::abi_decode_returns(output)
        .map_err(|source| ReadError::Decode { method: "allowance", source })
}

/// `approve(spender, amount)` sent by `from`.
pub fn approve(
    token: Address,
    from: Address,
    spender: Address,
    amount: U256,
) -> TransactionRequest {
    transaction(from, token, None, IERC20::approveCall { spender, amount }.abi_encode())
}

/// Payable `deposit()` wrapping `value` of native currency.
pub fn deposit(token: Address, from: Address, value: U256) -> TransactionRequest {
    transaction(from, token, Some(value), IWETH::depositCall {}.abi_encode())
}

/// `depositFor(user, rootToken, abi.encode(amount))` on the root chain manager.
pub fn deposit_for(
    root_chain_manager: Address,
    user: Address,
    root_token: Address,
    amount: U256,
) -> TransactionRequest {
    let call = IRootChainManager::depositForCall {
        user,
        rootToken: root_token,
        depositData: amount.abi_encode().into(),
    };
    transaction(user, root_chain_manager, None, call.abi_encode())
}

/// Payable `depositEtherFor(user)` on the root chain manager.
pub fn deposit_ether_for(
    root_chain_manager: Address,
    user: Address,
    value: U256,
) -> TransactionRequest {
    let call = IRootChainManager::depositEtherForCall { user };
    transaction(user, root_chain_manager, Some(value), call.abi_encode())
}

fn call(to: Address, input: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        to: Some(TxKind::Call(to)),
        input: TransactionInput::new(input.into()),
        ..Default::default()
    }
}

fn transaction(
    from: Address,
    to: Address,
    value: Option<U256>,
    input: Vec<u8>,
) -> TransactionRequest {
    TransactionRequest { from: Some(from), value, ..call(to, input) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TOKEN: Address = address!("0x655F2166b0709cd575202630952D71E2bB0d61Af");
    const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const MANAGER: Address = address!("0xBbD7cBFA79faee899Eaf900F13C9065bF03B1A74");

    #[test]
    fn encodes_balance_query() {
        let request = balance_of(TOKEN, ALICE);
        assert_eq!(request.to, Some(TxKind::Call(TOKEN)));
        assert!(request.from.is_none());

        let input = request.input.input().unwrap();
        assert_eq!(input[..4], IERC20::balanceOfCall::SELECTOR);
        assert_eq!(IERC20::balanceOfCall::abi_decode(input).unwrap().owner, ALICE);
    }

    #[test]
    fn decodes_uint_output() {
        let output = Bytes::from(U256::from(1234u64).abi_encode());
        assert_eq!(decode_balance(&output).unwrap(), U256::from(1234u64));
        assert!(matches!(
            decode_allowance(&Bytes::from_static(&[1, 2, 3])),
            Err(ReadError::Decode { method: "allowance", .. })
        ));
    }

    #[test]
    fn bridge_deposit_wraps_amount_as_uint256() {
        let amount = U256::from(1_000_000_000_000_000_000u128);
        let request = deposit_for(MANAGER, ALICE, TOKEN, amount);
        assert_eq!(request.from, Some(ALICE));
        assert!(request.value.is_none());

        let call = IRootChainManager::depositForCall::abi_decode(request.input.input().unwrap())
            .unwrap();
        assert_eq!(call.user, ALICE);
        assert_eq!(call.rootToken, TOKEN);
        assert_eq!(U256::abi_decode(&call.depositData).unwrap(), amount);
    }

    #[test]
    fn ether_deposits_carry_value() {
        let value = U256::from(5u64);
        assert_eq!(deposit(TOKEN, ALICE, value).value, Some(value));
        assert_eq!(deposit_ether_for(MANAGER, ALICE, value).value, Some(value));
    }
}
