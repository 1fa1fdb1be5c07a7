pub mod audit;
pub mod clinical;
pub mod contact;
pub mod enums;
pub mod filters;
pub mod insight;
pub mod organization;
pub mod region;
pub mod sales;
pub mod surgery_case;
pub mod team;

pub use audit::*;
pub use clinical::*;
pub use contact::*;
pub use filters::*;
pub use insight::*;
pub use organization::*;
pub use region::*;
pub use sales::*;
pub use surgery_case::*;
pub use team::*;
