//! Request locks.
//!
//! Request scripts run on spawned tasks. Each service has one lock; a task
//! holds the owned guard for its whole lifetime so two requests for the same
//! service can never overlap, even when two events race past the cooldown.
//!
//! The addon has a single menu, so one engine-wide menu lock is held while a
//! script writes to it. Requests for different services queue on it and
//! their writes never interleave.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::gsx::{PerService, ServiceKind};

/// Held by a request task for its whole lifetime.
pub type ServicePermit = OwnedMutexGuard<()>;

/// Held while a script drives the addon menu.
pub type MenuPermit = OwnedMutexGuard<()>;

#[derive(Debug, Clone, Default)]
pub struct ServiceLocks {
    locks: PerService<Arc<Mutex<()>>>,
    menu: Arc<Mutex<()>>,
}

impl ServiceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `kind` if no request for it is running.
    pub fn try_acquire(&self, kind: ServiceKind) -> Option<ServicePermit> {
        Arc::clone(&self.locks[kind]).try_lock_owned().ok()
    }

    pub fn is_busy(&self, kind: ServiceKind) -> bool {
        self.locks[kind].try_lock().is_err()
    }

    /// Wait until no other script is using the menu.
    pub async fn acquire_menu(&self) -> MenuPermit {
        Arc::clone(&self.menu).lock_owned().await
    }

    pub fn is_menu_busy(&self) -> bool {
        self.menu.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_permit_per_service() {
        let locks = ServiceLocks::new();

        let permit = locks.try_acquire(ServiceKind::Boarding);
        assert!(permit.is_some());
        assert!(locks.is_busy(ServiceKind::Boarding));
        assert!(locks.try_acquire(ServiceKind::Boarding).is_none());

        // Other services are independent
        assert!(!locks.is_busy(ServiceKind::Refueling));
        assert!(locks.try_acquire(ServiceKind::Refueling).is_some());

        drop(permit);
        assert!(!locks.is_busy(ServiceKind::Boarding));
    }

    #[tokio::test]
    async fn test_menu_is_shared_across_services() {
        let locks = ServiceLocks::new();
        let _refueling = locks.try_acquire(ServiceKind::Refueling);
        let _catering = locks.try_acquire(ServiceKind::Catering);

        let menu = locks.acquire_menu().await;
        assert!(locks.is_menu_busy());

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _menu = locks.acquire_menu().await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(menu);
        waiter.await.unwrap();
        assert!(!locks.is_menu_busy());
    }

    #[test]
    fn test_clones_share_locks() {
        let locks = ServiceLocks::new();
        let clone = locks.clone();
        let _permit = locks.try_acquire(ServiceKind::Pushback);
        assert!(clone.is_busy(ServiceKind::Pushback));
    }
}
