//! Exception-chain model.
//!
//! The encode side walks a [`FaultGraph`] from the outermost fault towards
//! the root cause. The decode side rebuilds the chain root-first as nested
//! [`RemoteException`]s.

mod fault;
mod frame;
mod remote;

pub use fault::{ChainStop, ChainWalk, Fault, FaultGraph, FaultId};
pub use frame::{CallFrame, NATIVE_LINE};
pub use remote::RemoteException;
