pub mod ip;

pub use ip::{ClientAddressPolicy, SELF_ADDRESS_TOKEN, parse_ip};
