pub mod availability;
pub mod client;
pub mod forum;
pub mod instructor;
pub mod progress;
pub mod session;
pub mod subscription;
pub mod user;
pub mod video;
pub mod workout;

pub use availability::{SlotAvailability, TimeSlot, WeeklyAvailability};
pub use client::{ClientProfile, ClientSubscription, Demographic, Health, Measurements};
pub use forum::ForumPost;
pub use instructor::{ClientLinkStatus, InstructorClient, InstructorFees, InstructorProfile, InstructorStats};
pub use progress::ProgressRecord;
pub use session::{Session, SessionStatus, SessionWithNames};
pub use subscription::{SubscriptionPeriod, SubscriptionPlan, UserSubscription};
pub use user::{User, UserRole, UserSettings};
pub use video::{Video, VideoListing};
pub use workout::{
    WorkoutExercise, WorkoutGuide, WorkoutPlan, WorkoutPlanDetail, WorkoutPlanReview,
    WorkoutPlanSummary,
};
