//! Component registry access

pub mod client;
pub mod transport;
pub mod types;

pub use client::Registry;
pub use transport::{transport_for, DirTransport, HttpTransport, RegistryTransport, TransportResponse};
pub use types::{validate_name, Component, ComponentFile, FetchedFiles, SearchFilter};
