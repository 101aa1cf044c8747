pub mod analytics;

pub use analytics::{AnalyticsError, AnalyticsManager, HouseStats, OverviewStats};
