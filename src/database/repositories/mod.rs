pub mod user_notifications;
