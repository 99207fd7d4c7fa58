//! Session extensions.
//!
//! An extension is a bundle of subscriptions installed on a session with
//! [`Session::activate`](crate::Session::activate). It only talks to the
//! session through [`SessionControl`], so it owns no connection state of its
//! own and can be tested against a stand-in session.
//!
//! Two extensions ship with the crate:
//!
//! - [`LoginAndJoin`]: identify with services if a password is known, then
//!   join a channel list.
//! - [`Reconnect`]: reconnect whenever the transport closes on an error.

mod login_join;
mod reconnect;

use crate::dispatch::SubscriptionId;
use crate::session::SessionControl;

pub use self::login_join::LoginAndJoin;
pub use self::reconnect::Reconnect;

/// Behavior installed on a session.
pub trait Extension: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Subscribe to `session` and report what was installed.
    fn activate(self: Box<Self>, session: &dyn SessionControl) -> Activation;
}

/// Subscriptions installed by one extension.
#[derive(Debug)]
#[must_use = "dropping an Activation keeps the extension installed; call cancel() to remove it"]
pub struct Activation {
    name: &'static str,
    subscriptions: Vec<SubscriptionId>,
}

impl Activation {
    /// Empty activation for the extension called `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscriptions: Vec::new(),
        }
    }

    /// Record a subscription made during activation.
    pub fn track(&mut self, id: SubscriptionId) {
        self.subscriptions.push(id);
    }

    /// Name of the extension.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Subscriptions still owned by this activation.
    pub fn subscriptions(&self) -> &[SubscriptionId] {
        &self.subscriptions
    }

    /// Remove every subscription still installed. Returns how many were
    /// removed; `once` handlers that already fired are not counted.
    pub fn cancel(self, session: &dyn SessionControl) -> usize {
        self.subscriptions
            .into_iter()
            .filter(|id| session.unsubscribe(*id))
            .count()
    }
}
