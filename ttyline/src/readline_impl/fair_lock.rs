// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{ops::{Deref, DerefMut},
          sync::{Condvar, MutexGuard, PoisonError}};

use crate::StdMutex;

/// A mutex that hands out access strictly in arrival order (a ticket lock). Every
/// caller takes a ticket and waits on a [`Condvar`] until its number is served.
///
/// Not reentrant: locking it again on the same thread while a guard is alive deadlocks.
/// Poisoning is ignored.
#[derive(Debug)]
pub struct FairLock<T> {
    tickets: StdMutex<Tickets>,
    turn_changed: Condvar,
    data: StdMutex<T>,
}

#[derive(Debug, Default)]
struct Tickets {
    next_ticket: u64,
    now_serving: u64,
}

impl<T> FairLock<T> {
    pub fn new(data: T) -> Self {
        Self {
            tickets: StdMutex::new(Tickets::default()),
            turn_changed: Condvar::new(),
            data: StdMutex::new(data),
        }
    }

    /// Block until every caller that arrived earlier has released the lock.
    pub fn lock(&self) -> FairLockGuard<'_, T> {
        let mut tickets = self
            .tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let my_ticket = tickets.next_ticket;
        tickets.next_ticket += 1;
        while tickets.now_serving != my_ticket {
            tickets = self
                .turn_changed
                .wait(tickets)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(tickets);

        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        FairLockGuard {
            data,
            _turn: Turn { lock: self },
        }
    }

    fn release(&self) {
        let mut tickets = self
            .tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tickets.now_serving += 1;
        drop(tickets);
        self.turn_changed.notify_all();
    }
}

/// Fields drop in declaration order, so the data is unlocked before the turn passes to
/// the next ticket holder.
#[allow(missing_debug_implementations)]
pub struct FairLockGuard<'a, T> {
    data: MutexGuard<'a, T>,
    _turn: Turn<'a, T>,
}

struct Turn<'a, T> {
    lock: &'a FairLock<T>,
}

impl<T> Drop for Turn<'_, T> {
    fn drop(&mut self) { self.lock.release(); }
}

impl<T> Deref for FairLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T { &self.data }
}

impl<T> DerefMut for FairLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T { &mut self.data }
}
