pub mod contests;
pub mod events;
pub mod funding;
pub mod notifications;
pub mod payout_accounts;
pub mod payouts;
pub mod users;
pub mod webhooks;
