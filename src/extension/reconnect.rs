use tracing::{info, warn};

use crate::event::{Event, EventKind};
use crate::session::{event_handler, SessionControl};

use super::{Activation, Extension};

/// Reconnect immediately whenever the connection closes on an error.
///
/// A `close` caused by `disconnect()` is left alone. There is no backoff: a
/// server that keeps refusing will be retried once per failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconnect;

impl Extension for Reconnect {
    fn name(&self) -> &'static str {
        "reconnect"
    }

    fn activate(self: Box<Self>, session: &dyn SessionControl) -> Activation {
        let mut activation = Activation::new(self.name());
        activation.track(session.subscribe(
            EventKind::Close,
            event_handler(|s, event| {
                if let Event::Close { from_error: true } = event {
                    info!("connection lost, reconnecting");
                    if let Err(err) = s.connect() {
                        warn!("reconnect failed: {}", err);
                        return Err(err.into());
                    }
                }
                Ok(())
            }),
        ));
        activation
    }
}
