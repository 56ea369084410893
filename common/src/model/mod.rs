pub mod message;
pub mod place_holder;
