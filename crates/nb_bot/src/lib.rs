pub mod command;
pub mod messages;
pub mod router;
pub mod scheduler;
pub mod telegram;

pub use command::{Command, InboundCommand};
pub use router::CommandRouter;
pub use scheduler::{NotificationScheduler, TickReport};
pub use telegram::{TelegramBot, TelegramClient};
