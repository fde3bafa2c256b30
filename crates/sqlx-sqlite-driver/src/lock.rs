//! FIFO lock that hands a single owned resource from one holder to the next
//!
//! ## How it works
//!
//! The lock owns the resource while nobody holds it. `acquire` takes it out and
//! wraps it in a [`LockGuard`]; dropping the guard gives it back. While the
//! resource is out, later acquirers append a oneshot sender to the waiter queue
//! and park on the receiver. Release pops the oldest waiter and *sends the
//! resource itself* through the channel, so a granted waiter never competes
//! with newcomers: the resource does not pass through the idle slot between
//! two holders.
//!
//! ```text
//! acquire ──► idle? ──yes──► guard
//!               │
//!               no ──► queue tx ──► await rx ──► guard
//!
//! release ──► pop oldest tx ──send ok──► done (waiter now holds)
//!               │   └──send failed (waiter gone)──► try next
//!               empty ──► idle = resource
//! ```
//!
//! A waiter whose future is dropped closes its receiver. If the resource had
//! already been sent to it, the drop hands it on to the next waiter.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{trace, warn};

use crate::{Error, Result};

struct LockState<T> {
   /// The resource when no one holds it
   idle: Option<T>,

   /// Pending acquirers in arrival order
   waiters: VecDeque<oneshot::Sender<T>>,

   /// Set by `close`; no further grants happen
   closed: bool,
}

/// Mutual exclusion over a single resource with strict arrival-order grants.
pub struct ConnectionLock<T> {
   state: Mutex<LockState<T>>,
}

impl<T> ConnectionLock<T> {
   pub fn new(resource: T) -> Self {
      Self {
         state: Mutex::new(LockState {
            idle: Some(resource),
            waiters: VecDeque::new(),
            closed: false,
         }),
      }
   }

   /// Suspend until the caller is the sole holder.
   ///
   /// Fails with [`Error::ConnectionClosed`] if the lock is closed before or
   /// while waiting. Cancel-safe: dropping the returned future gives up the
   /// place in the queue without losing the resource.
   pub async fn acquire(&self) -> Result<LockGuard<'_, T>> {
      let rx = {
         let mut state = self.state.lock();
         if state.closed {
            return Err(Error::ConnectionClosed);
         }

         if let Some(resource) = state.idle.take() {
            trace!("connection lock granted immediately");
            return Ok(LockGuard::new(self, resource));
         }

         let (tx, rx) = oneshot::channel();
         state.waiters.push_back(tx);
         trace!(waiters = state.waiters.len(), "queued for connection lock");
         rx
      };

      let mut pending = PendingAcquire { lock: self, rx };
      match (&mut pending.rx).await {
         Ok(resource) => {
            trace!("connection lock handed off");
            Ok(LockGuard::new(self, resource))
         }
         Err(_) => Err(Error::ConnectionClosed),
      }
   }

   /// Return the resource, handing it to the oldest live waiter if any.
   fn release(&self, resource: T) {
      let mut state = self.state.lock();
      if state.closed {
         drop(state);
         trace!("lock closed, dropping released resource");
         drop(resource);
         return;
      }

      let mut resource = resource;
      while let Some(waiter) = state.waiters.pop_front() {
         match waiter.send(resource) {
            Ok(()) => return,
            Err(returned) => {
               trace!("skipping abandoned waiter");
               resource = returned;
            }
         }
      }

      state.idle = Some(resource);
   }

   /// Close the lock: pending and future acquirers fail with
   /// [`Error::ConnectionClosed`].
   ///
   /// Returns the resource if it was idle. If a guard is still outstanding the
   /// resource is dropped when that guard releases. Calling this again
   /// returns `None`.
   pub fn close(&self) -> Option<T> {
      let mut state = self.state.lock();
      state.closed = true;

      if !state.waiters.is_empty() {
         warn!(
            waiters = state.waiters.len(),
            "closing connection lock with pending acquirers"
         );
      }
      state.waiters.clear();

      state.idle.take()
   }

   /// Whether the resource is currently out with a holder.
   pub fn is_held(&self) -> bool {
      let state = self.state.lock();
      !state.closed && state.idle.is_none()
   }

   /// Number of acquirers waiting in the queue.
   pub fn waiting(&self) -> usize {
      self.state.lock().waiters.len()
   }
}

/// Cleanup for an acquire that is dropped while queued.
struct PendingAcquire<'a, T> {
   lock: &'a ConnectionLock<T>,
   rx: oneshot::Receiver<T>,
}

impl<T> Drop for PendingAcquire<'_, T> {
   fn drop(&mut self) {
      // After a completed receive both calls are no-ops
      self.rx.close();
      if let Ok(resource) = self.rx.try_recv() {
         trace!("acquire cancelled after hand-off, passing the resource on");
         self.lock.release(resource);
      }
   }
}

/// RAII guard giving exclusive access to the locked resource.
///
/// Dropping the guard releases the lock on every exit path.
#[must_use = "if unused, the connection is immediately released"]
pub struct LockGuard<'a, T> {
   lock: &'a ConnectionLock<T>,
   resource: Option<T>,
}

impl<'a, T> LockGuard<'a, T> {
   fn new(lock: &'a ConnectionLock<T>, resource: T) -> Self {
      Self {
         lock,
         resource: Some(resource),
      }
   }
}

impl<T> Deref for LockGuard<'_, T> {
   type Target = T;

   fn deref(&self) -> &Self::Target {
      self.resource.as_ref().expect("resource already released")
   }
}

impl<T> DerefMut for LockGuard<'_, T> {
   fn deref_mut(&mut self) -> &mut Self::Target {
      self.resource.as_mut().expect("resource already released")
   }
}

impl<T> Drop for LockGuard<'_, T> {
   fn drop(&mut self) {
      if let Some(resource) = self.resource.take() {
         self.lock.release(resource);
      }
   }
}
