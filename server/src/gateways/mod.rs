pub mod notifier;
pub mod renderer;
pub mod storage;

pub use notifier::{Destination, LogNotificationGateway, Notification, NotificationGateway};
pub use renderer::{DocumentRenderer, JsonSnapshotRenderer, RenderedDocument};
pub use storage::{LocalObjectStore, ObjectStore};
