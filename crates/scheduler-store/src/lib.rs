pub mod document_store;
pub mod generator;
pub mod memory;
pub mod traits;

pub use document_store::DocumentStoreClient;
pub use generator::generate_vehicles;
pub use memory::InMemoryStore;
pub use traits::{VehicleStore, VehicleUpdate};
