pub mod interface;

pub use interface::{PaymentError, PaymentOperations};
