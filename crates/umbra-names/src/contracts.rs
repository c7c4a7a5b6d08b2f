//! Contract interfaces read and written by the resolvers
#![allow(missing_docs)]

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use umbra_core::{Error, Result, WalletProvider};

sol! {
    interface IEnsRegistry {
        function owner(bytes32 node) external view returns (address);
        function resolver(bytes32 node) external view returns (address);
    }

    interface IEnsResolver {
        function addr(bytes32 node) external view returns (address);
        function name(bytes32 node) external view returns (string memory);
    }

    interface IStealthKeyResolver {
        function stealthKeys(bytes32 node) external view returns (
            uint256 spendingPubKeyPrefix,
            uint256 spendingPubKey,
            uint256 viewingPubKeyPrefix,
            uint256 viewingPubKey
        );
        function setStealthKeys(
            bytes32 node,
            uint256 spendingPubKeyPrefix,
            uint256 spendingPubKey,
            uint256 viewingPubKeyPrefix,
            uint256 viewingPubKey
        ) external;
    }

    interface ICnsRegistry {
        function ownerOf(uint256 tokenId) external view returns (address);
        function resolverOf(uint256 tokenId) external view returns (address);
    }

    interface ICnsResolver {
        function getMany(string[] calldata keys, uint256 tokenId) external view returns (string[] memory);
        function setMany(string[] calldata keys, string[] calldata values, uint256 tokenId) external;
    }
}

/// Run a view call and decode its return values
pub(crate) async fn read<C: SolCall + Send>(
    provider: &dyn WalletProvider,
    to: Address,
    call: C,
) -> Result<C::Return> {
    let data = Bytes::from(call.abi_encode());
    let raw = provider.call(to, data).await?;
    C::abi_decode_returns(&raw, true).map_err(|e| Error::Abi(e.to_string()))
}
