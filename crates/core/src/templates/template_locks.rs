//! Per-template critical sections.
//!
//! Every mutation of a template's generations (and every product binding
//! change that a delete could race with) runs while holding the template's
//! guard. Different templates never contend.

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct TemplateLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TemplateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the template. The guard releases on drop.
    pub async fn acquire(&self, template_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(template_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        if lock.try_lock().is_err() {
            debug!("Waiting for template lock {}", template_id);
        }
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_template_is_serialized() {
        let locks = Arc::new(TemplateLocks::new());
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_section = in_section.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("tpl-1").await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_templates_do_not_contend() {
        let locks = TemplateLocks::new();
        let _a = locks.acquire("tpl-a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("tpl-b")).await;
        assert!(b.is_ok());
    }
}
