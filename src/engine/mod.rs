pub mod decision;
pub mod engine;
pub mod noop;
pub mod ports;

pub use decision::{Decision, DecisionError, DecisionErrorKind};
pub use engine::{EligibilityEngine, OVERRIDE_REASON, PRINCIPAL_NOT_FOUND_REASON};
pub use noop::DryRunDeprovisioner;
pub use ports::{DeprovisionError, DeprovisionPort};
