//! Memora model factory
//!
//! Produces data-model types bound to a remote resource namespace and a
//! declared field list. Each model type shares one [`RemoteClient`] handle;
//! instances track whether they correspond to a record known to exist
//! remotely and persist themselves through `save`/`remove`.
//!
//! [`RemoteClient`]: memora_client::RemoteClient

pub mod model;

pub use model::{modelize, Model, ModelSchema, ModelType};
