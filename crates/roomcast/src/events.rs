//! Observer registration and notification.
//!
//! Observers run synchronously on the inbound delivery task, in
//! server-delivery order. Callbacks must not block; anything slow should
//! hand off to its own task.

use crate::state::Revision;

pub(crate) type WelcomeObserver = Box<dyn FnMut(&str) + Send>;
pub(crate) type RevisionObserver<T> = Box<dyn FnMut(&Revision<T>) + Send>;

/// Registered callbacks for one client.
pub(crate) struct Observers<R, P> {
    welcome: Vec<WelcomeObserver>,
    room: Vec<RevisionObserver<R>>,
    player: Vec<RevisionObserver<P>>,
}

impl<R, P> Default for Observers<R, P> {
    fn default() -> Self {
        Self {
            welcome: Vec::new(),
            room: Vec::new(),
            player: Vec::new(),
        }
    }
}

impl<R, P> Observers<R, P> {
    pub(crate) fn add_welcome(&mut self, f: WelcomeObserver) {
        self.welcome.push(f);
    }

    pub(crate) fn add_room(&mut self, f: RevisionObserver<R>) {
        self.room.push(f);
    }

    pub(crate) fn add_player(&mut self, f: RevisionObserver<P>) {
        self.player.push(f);
    }

    pub(crate) fn notify_welcome(&mut self, id: &str) {
        for f in &mut self.welcome {
            f(id);
        }
    }

    pub(crate) fn notify_room(&mut self, revision: &Revision<R>) {
        for f in &mut self.room {
            f(revision);
        }
    }

    pub(crate) fn notify_player(&mut self, revision: &Revision<P>) {
        for f in &mut self.player {
            f(revision);
        }
    }
}
