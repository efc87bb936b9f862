pub mod layers;
pub mod loss;
