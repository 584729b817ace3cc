pub mod lightning_rpc;
pub mod memory;

pub use lightning_rpc::LightningRpc;
pub use memory::InMemoryNode;
