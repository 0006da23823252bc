pub mod bars;
pub mod cocktails;
pub mod ingredients;
pub mod shelf;
