pub mod select;
pub mod token;
pub mod wif;
