// Adapters: concrete implementations of the domain ports (HTTP client, CSV files, credentials)

pub mod csv_storage;
pub mod edgegrid;
pub mod edgerc;

pub use csv_storage::LocalStorage;
pub use edgegrid::EdgeGridClient;
pub use edgerc::EdgeGridCredentials;
