// Matrix data structures and operations

pub mod builder;
pub mod config;
pub mod csc;
pub mod reference;
pub mod transpose;

pub use builder::CscBuilder;
pub use config::{Backend, SpgemmConfig, SystemParameters};
pub use csc::CscMatrix;
pub use reference::{approx_equal, approx_equal_default, reference_dense_product, reference_spgemm};
