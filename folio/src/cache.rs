//! Rendered public page cache.
//!
//! Public pages are cheap JSON documents assembled from several collections.
//! They are cached by request path and dropped when content they show
//! changes (see the `*_PAGES` lists in `content`).

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CachedPage {
    body: Arc<Value>,
    rendered_at: Instant,
}

/// Path-keyed cache of rendered pages.
pub struct PageCache {
    pages: RwLock<HashMap<String, CachedPage>>,
    /// Bumped by every invalidation, under the `pages` write lock.
    generation: AtomicU64,
    /// `None` keeps pages until invalidated.
    ttl: Option<Duration>,
}

impl PageCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            ttl,
        }
    }

    fn is_fresh(&self, page: &CachedPage) -> bool {
        match self.ttl {
            Some(ttl) => page.rendered_at.elapsed() < ttl,
            None => true,
        }
    }

    /// Cached page for `path`, if present and not stale.
    pub async fn get(&self, path: &str) -> Option<Arc<Value>> {
        let pages = self.pages.read().await;
        pages
            .get(path)
            .filter(|page| self.is_fresh(page))
            .map(|page| page.body.clone())
    }

    pub async fn insert(&self, path: &str, body: Value) -> Arc<Value> {
        let body = Arc::new(body);
        self.pages.write().await.insert(
            path.to_string(),
            CachedPage {
                body: body.clone(),
                rendered_at: Instant::now(),
            },
        );
        body
    }

    /// Return the cached page or render and cache it.
    ///
    /// Render errors are returned as-is and nothing is cached. A page whose
    /// render overlapped an invalidation is returned but not cached, since it
    /// may show content from before the change.
    pub async fn get_or_render<F, Fut, E>(&self, path: &str, render: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(page) = self.get(path).await {
            return Ok(page);
        }

        let generation = self.generation.load(Ordering::Acquire);
        debug!(path, "Rendering page");
        let body = Arc::new(render().await?);

        let mut pages = self.pages.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            pages.insert(
                path.to_string(),
                CachedPage {
                    body: body.clone(),
                    rendered_at: Instant::now(),
                },
            );
        } else {
            debug!(path, "Content changed during render; not caching");
        }
        Ok(body)
    }

    /// Drop the given paths so the next request re-renders them.
    pub async fn invalidate(&self, paths: &[&str]) {
        let mut pages = self.pages.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        for path in paths {
            pages.remove(*path);
        }
        debug!(?paths, "Invalidated cached pages");
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_renders_once_until_invalidated() {
        let cache = PageCache::new(None);
        let counter = AtomicUsize::new(0);
        let renders = &counter;

        let render = move || async move {
            renders.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(json!({ "page": "skills" }))
        };

        cache.get_or_render("/skills", render).await.unwrap();
        cache.get_or_render("/skills", render).await.unwrap();
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        cache.invalidate(&["/", "/skills"]).await;
        cache.get_or_render("/skills", render).await.unwrap();
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_leaves_other_paths() {
        let cache = PageCache::new(None);
        cache.insert("/", json!(1)).await;
        cache.insert("/about", json!(2)).await;
        cache.insert("/skills", json!(3)).await;

        cache.invalidate(&["/", "/skills"]).await;

        assert!(cache.get("/").await.is_none());
        assert!(cache.get("/skills").await.is_none());
        assert_eq!(*cache.get("/about").await.unwrap(), json!(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_pages_are_rerendered() {
        let cache = PageCache::new(Some(Duration::ZERO));
        cache.insert("/", json!("old")).await;
        assert!(cache.get("/").await.is_none());

        let page = cache
            .get_or_render("/", || async { Ok::<_, ()>(json!("new")) })
            .await
            .unwrap();
        assert_eq!(*page, json!("new"));
    }

    #[tokio::test]
    async fn test_render_racing_invalidation_is_not_cached() {
        let cache = PageCache::new(None);
        let shared = &cache;

        let page = cache
            .get_or_render("/skills", move || async move {
                let body = json!({ "skills": ["old"] });
                // A skill is edited while this render is in flight
                shared.invalidate(&["/skills"]).await;
                Ok::<_, ()>(body)
            })
            .await
            .unwrap();
        assert_eq!(*page, json!({ "skills": ["old"] }));
        assert!(cache.get("/skills").await.is_none());

        let page = cache
            .get_or_render("/skills", || async { Ok::<_, ()>(json!({ "skills": ["new"] })) })
            .await
            .unwrap();
        assert_eq!(*page, json!({ "skills": ["new"] }));
        assert_eq!(*cache.get("/skills").await.unwrap(), json!({ "skills": ["new"] }));
    }

    #[tokio::test]
    async fn test_render_error_is_not_cached() {
        let cache = PageCache::new(None);
        let result = cache
            .get_or_render("/", || async { Err::<Value, _>("boom") })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert!(cache.is_empty().await);
    }
}
