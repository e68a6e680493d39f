// Value primitives shared by the eligibility and discount engines

pub mod interval;
pub mod money;

pub use interval::{DateRange, TimeSlot};
pub use money::{Currency, Money};
