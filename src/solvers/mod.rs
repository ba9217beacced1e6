pub mod rhs;
pub mod stepper;

pub use rhs::{BoundaryPolicy, RightHandSide, ShallowWaterRhs, SourceTerms};
pub use stepper::{ForwardEuler, ProblemType, StepReport};
