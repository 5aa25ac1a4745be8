//! The five Ethereum transaction variants ([EIP-2718] legacy, [EIP-2930],
//! [EIP-1559], [EIP-4844], [EIP-7702]) and the [`TxEnvelope`] that wraps
//! a signed instance of any of them behind one type.
//!
//! [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
//! [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930
//! [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
//! [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
//! [EIP-7702]: https://eips.ethereum.org/EIPS/eip-7702

mod error;
pub use error::TransactionError;

mod signed;
pub use signed::Signed;

mod tx_kind;
pub use tx_kind::TxKind;

mod tx_type;
pub use tx_type::TxType;

pub mod transaction;
pub use transaction::{
    SignableTransaction, Transaction, TxEip1559, TxEip2930, TxEip4844, TxEip4844Fields,
    TxEip4844Variant, TxEip4844WithSidecar, TxEip7702, TxEnvelope, TxLegacy,
};
