use crate::bitmap::BitmapId;

/// Change notifications delivered to subscribers of one bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapEvent {
    /// Pixels changed.
    Modified,
    /// The bitmap was disposed; no further events follow.
    Disposed,
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

pub type ObserverFn = Box<dyn FnMut(BitmapId, BitmapEvent) + Send>;

struct Subscription {
    handle: ObserverHandle,
    bitmap: BitmapId,
    callback: ObserverFn,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next: u64,
    subs: Vec<Subscription>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&mut self, bitmap: BitmapId, callback: ObserverFn) -> ObserverHandle {
        self.next += 1;
        let handle = ObserverHandle(self.next);
        self.subs.push(Subscription {
            handle,
            bitmap,
            callback,
        });
        handle
    }

    pub(crate) fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        let before = self.subs.len();
        self.subs.retain(|s| s.handle != handle);
        self.subs.len() != before
    }

    pub(crate) fn notify(&mut self, bitmap: BitmapId, event: BitmapEvent) {
        for sub in self.subs.iter_mut().filter(|s| s.bitmap == bitmap) {
            (sub.callback)(bitmap, event);
        }
    }

    /// Delivers `Disposed` and drops every subscription of `bitmap`.
    pub(crate) fn retire(&mut self, bitmap: BitmapId) {
        self.notify(bitmap, BitmapEvent::Disposed);
        self.subs.retain(|s| s.bitmap != bitmap);
    }

    pub(crate) fn len(&self) -> usize {
        self.subs.len()
    }
}

#[cfg(test)]
#[path = "../tests/unit/observer.rs"]
mod tests;
