// Domain type definitions for the Reservation Rules engine
// Provides enums shared by the entities, the eligibility engine and the discount engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Member in good standing
    Active,

    /// Temporarily blocked (unpaid dues, misconduct)
    Suspended,

    /// Membership lapsed and not renewed
    Expired,

    /// Member left the club
    Withdrawn,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberStatus::Active => write!(f, "active"),
            MemberStatus::Suspended => write!(f, "suspended"),
            MemberStatus::Expired => write!(f, "expired"),
            MemberStatus::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "suspended" => Ok(MemberStatus::Suspended),
            "expired" => Ok(MemberStatus::Expired),
            "withdrawn" => Ok(MemberStatus::Withdrawn),
            _ => Err(format!("Invalid member status: {}", s)),
        }
    }
}

/// Membership tier, used for VIP advance-booking bonuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    Basic,
    Standard,
    Premium,
    Vip,
}

impl MembershipTier {
    /// Premium and VIP members receive bonus advance-booking days
    pub fn is_vip(&self) -> bool {
        matches!(self, MembershipTier::Premium | MembershipTier::Vip)
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipTier::Basic => write!(f, "basic"),
            MembershipTier::Standard => write!(f, "standard"),
            MembershipTier::Premium => write!(f, "premium"),
            MembershipTier::Vip => write!(f, "vip"),
        }
    }
}

impl std::str::FromStr for MembershipTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(MembershipTier::Basic),
            "standard" => Ok(MembershipTier::Standard),
            "premium" => Ok(MembershipTier::Premium),
            "vip" => Ok(MembershipTier::Vip),
            _ => Err(format!("Invalid membership tier: {}", s)),
        }
    }
}

/// Category of a bookable resource; plans grant access per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    StudyRoom,
    MeetingRoom,
    FitnessStudio,
    SportsCourt,
    Lounge,
    Equipment,
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceCategory::StudyRoom => write!(f, "study_room"),
            ResourceCategory::MeetingRoom => write!(f, "meeting_room"),
            ResourceCategory::FitnessStudio => write!(f, "fitness_studio"),
            ResourceCategory::SportsCourt => write!(f, "sports_court"),
            ResourceCategory::Lounge => write!(f, "lounge"),
            ResourceCategory::Equipment => write!(f, "equipment"),
        }
    }
}

impl std::str::FromStr for ResourceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study_room" => Ok(ResourceCategory::StudyRoom),
            "meeting_room" => Ok(ResourceCategory::MeetingRoom),
            "fitness_studio" => Ok(ResourceCategory::FitnessStudio),
            "sports_court" => Ok(ResourceCategory::SportsCourt),
            "lounge" => Ok(ResourceCategory::Lounge),
            "equipment" => Ok(ResourceCategory::Equipment),
            _ => Err(format!("Invalid resource category: {}", s)),
        }
    }
}

/// Status of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Requested, awaiting confirmation or payment
    Pending,

    /// Confirmed and upcoming
    Confirmed,

    /// Member has arrived and is using the resource
    CheckedIn,

    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Statuses that still hold a seat
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending | ReservationStatus::Confirmed | ReservationStatus::CheckedIn
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::CheckedIn => write!(f, "checked_in"),
            ReservationStatus::Completed => write!(f, "completed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
            ReservationStatus::NoShow => write!(f, "no_show"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "checked_in" => Ok(ReservationStatus::CheckedIn),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "no_show" => Ok(ReservationStatus::NoShow),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

/// Strategy for combining multiple discount policies
///
/// When several policies apply to a purchase, this determines how their
/// effects turn into one final price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationStrategy {
    /// Apply every applicable policy in order, each on the previous result
    /// Example: 10% then 1000 off on 10000 = 8000
    Sequential,

    /// Apply each policy to the original price and keep the largest discount
    BestSingle,

    /// Apply only the applicable policy with the lowest priority number
    PriorityFirst,

    /// Stack non-rate/non-amount policies first, then the better of the
    /// best rate discount and the best flat discount
    Smart,
}

impl fmt::Display for CombinationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationStrategy::Sequential => write!(f, "sequential"),
            CombinationStrategy::BestSingle => write!(f, "best_single"),
            CombinationStrategy::PriorityFirst => write!(f, "priority_first"),
            CombinationStrategy::Smart => write!(f, "smart"),
        }
    }
}

impl std::str::FromStr for CombinationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(CombinationStrategy::Sequential),
            "best_single" => Ok(CombinationStrategy::BestSingle),
            "priority_first" => Ok(CombinationStrategy::PriorityFirst),
            "smart" => Ok(CombinationStrategy::Smart),
            _ => Err(format!("Invalid combination strategy: {}", s)),
        }
    }
}

impl Default for CombinationStrategy {
    fn default() -> Self {
        CombinationStrategy::BestSingle
    }
}

/// Named eligibility level expanded to a preset list of rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyLevel {
    Minimal,
    Basic,
    Standard,
    Strict,
    /// Caller supplies the rule list explicitly
    Custom,
}

impl fmt::Display for PolicyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyLevel::Minimal => write!(f, "minimal"),
            PolicyLevel::Basic => write!(f, "basic"),
            PolicyLevel::Standard => write!(f, "standard"),
            PolicyLevel::Strict => write!(f, "strict"),
            PolicyLevel::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for PolicyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal" => Ok(PolicyLevel::Minimal),
            "basic" => Ok(PolicyLevel::Basic),
            "standard" => Ok(PolicyLevel::Standard),
            "strict" => Ok(PolicyLevel::Strict),
            "custom" => Ok(PolicyLevel::Custom),
            _ => Err(format!("Invalid policy level: {}", s)),
        }
    }
}

impl Default for PolicyLevel {
    fn default() -> Self {
        PolicyLevel::Standard
    }
}

/// How the rules of an eligibility policy are chained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMode {
    /// Every rule must hold (AND-chain)
    All,

    /// At least one rule must hold (OR-chain)
    Any,
}

impl Default for CombinationMode {
    fn default() -> Self {
        CombinationMode::All
    }
}
