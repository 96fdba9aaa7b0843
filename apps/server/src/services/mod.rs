//! Service layer: business workflows between the HTTP handlers and the
//! repositories.
//!
//! Handlers stay thin (deserialize, call a service, serialize); services
//! own validation ordering, transaction boundaries, and error mapping.

pub mod product;
pub mod register;
pub mod sale;

pub use product::ProductService;
pub use register::RegisterService;
pub use sale::SaleService;
