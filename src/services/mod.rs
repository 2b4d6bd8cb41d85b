pub mod contest_service;
pub mod metric_resolver;
pub mod notification_service;
pub mod payout_service;
pub mod prize_allocator;
pub mod ranking;
