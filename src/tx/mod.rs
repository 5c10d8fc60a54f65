//! Transaction submission: request options, drafting, gas ceiling and broadcast

mod draft;
mod gas;
mod request;
mod sender;

pub use draft::{SignedTransaction, TransactionDraft};
pub use gas::GasCeiling;
pub use request::{DeployRequest, InvokeRequest, PrivateKey};
pub use sender::TransactionPipeline;
