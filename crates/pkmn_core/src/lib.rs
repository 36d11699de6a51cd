pub mod bag;
pub mod bytes;
pub mod checksum;
pub mod core_api;
pub mod error;
pub mod game;
pub mod gb;
pub mod gen1;
pub mod gen2;
pub mod gen3;
pub mod layout;
