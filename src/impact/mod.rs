pub mod curve_builder;
pub mod interaction;

pub use curve_builder::ImpactCurveBuilder;
pub use interaction::HazardInteractionCombiner;
