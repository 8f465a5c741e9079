pub mod pose;
pub mod spatial_vector;
