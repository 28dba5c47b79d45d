//! Payment domain - checkout attempts and their settlement lifecycle.

mod aggregate;
mod errors;
mod product;
mod status;

pub use aggregate::Payment;
pub use errors::PaymentError;
pub use product::{PaymentGateway, ProductType};
pub use status::PaymentStatus;
