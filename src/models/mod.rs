pub mod actor;
pub mod decision;
pub mod production;
pub mod report_facts;
pub mod report_status;

pub use actor::Actor;
pub use decision::Decision;
pub use production::{MachineCondition, QualityRating};
pub use report_facts::ReportFacts;
pub use report_status::{ReportAction, ReportStatus, TransitionError};
