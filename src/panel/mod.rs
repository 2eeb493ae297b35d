//! The messaging panel: one topic, the latest message received on it, and a
//! bounded draft to publish.
//!
//! The panel is rendered as a [`PanelView`] and driven by [`PanelCommand`]s
//! and bus events. State transitions are `Unsubscribed -> Subscribed` on
//! subscribe and back on unsubscribe; mounting subscribes once.

pub mod clock;
pub mod command;
pub mod draft;
pub mod engine;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{PanelCommand, UnknownCommand};
pub use draft::Draft;
pub use engine::{Flow, MessagingPanel, ReceivedMessage};
pub use view::{Alert, PanelView};
