pub mod decision;
pub mod distribution;

pub use decision::AlertDecisionEngine;
pub use distribution::{AlertDistributor, LogDistributor};
