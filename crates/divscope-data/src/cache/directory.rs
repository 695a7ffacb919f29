//! TTL 기반 디렉토리 캐시.
//!
//! DART 기업 디렉토리나 KRX ETF 디렉토리처럼 수천 건 단위의 전체 목록을
//! 조회할 때마다 다시 받지 않도록 메모리에 보관합니다.
//!
//! # 동작 방식
//!
//! - 키별 단일 다운로드: 같은 키를 여러 태스크가 동시에 요청해도
//!   실제 가져오기는 한 번만 실행되고 나머지는 결과를 기다립니다.
//! - TTL이 지난 뒤 첫 요청이 갱신을 수행합니다.
//! - 갱신 실패 시 기존 값은 지우지 않고 `FetchFailure::stale`에 담아
//!   돌려주므로, 만료된 값을 쓸지 여부는 호출부가 명시적으로 결정합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use divscope_data::cache::directory::DirectoryCache;
//!
//! let cache: DirectoryCache<Vec<String>> = DirectoryCache::new();
//! let names = cache
//!     .get_or_fetch("corp", Duration::from_secs(3600), || async {
//!         fetch_names().await
//!     })
//!     .await;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use divscope_core::{FetchError, Result};

/// 키별 단일 다운로드 보장을 위한 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>;

/// 캐시 슬롯 (값 + 적재 시각).
struct CacheSlot<T> {
    value: Arc<T>,
    fetched_at: Instant,
}

/// 갱신 실패 정보.
///
/// 만료된 기존 값이 남아 있으면 `stale`에 함께 담깁니다.
#[derive(Debug)]
pub struct FetchFailure<T> {
    /// 실패 원인.
    pub error: FetchError,
    /// 만료되었지만 보관 중인 기존 값.
    pub stale: Option<Arc<T>>,
}

/// TTL + 키별 단일 다운로드 디렉토리 캐시.
pub struct DirectoryCache<T> {
    slots: RwLock<HashMap<String, CacheSlot<T>>>,
    fetch_locks: FetchLockMap,
}

impl<T> DirectoryCache<T> {
    /// 빈 캐시 생성.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 캐시된 값 반환, 없거나 만료되었으면 `fetch`로 새로 가져오기.
    ///
    /// 같은 키에 대한 동시 호출 중 실제 `fetch`는 한 번만 실행됩니다.
    /// 갱신 실패 시 기존 슬롯은 그대로 두고 `FetchFailure`를 반환합니다.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> std::result::Result<Arc<T>, FetchFailure<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // 1. 빠른 경로: 신선한 값이 있으면 바로 반환
        if let Some(value) = self.get_fresh(key, ttl).await {
            return Ok(value);
        }

        // 2. 키별 Lock 획득 (다른 태스크가 가져오는 중이면 대기)
        let lock = self.get_or_create_lock(key).await;
        let _guard = lock.write().await;

        // 3. 대기하는 동안 다른 태스크가 채웠는지 재확인
        if let Some(value) = self.get_fresh(key, ttl).await {
            debug!(key = key, "대기 중 캐시가 갱신됨");
            return Ok(value);
        }

        // 4. 새로 가져오기
        match fetch().await {
            Ok(value) => {
                let value = Arc::new(value);
                let mut slots = self.slots.write().await;
                slots.insert(
                    key.to_string(),
                    CacheSlot {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(value)
            }
            Err(error) => {
                let stale = self.get_any(key).await;
                if stale.is_some() {
                    warn!(key = key, error = %error, "갱신 실패, 만료된 값 보관 중");
                }
                Err(FetchFailure { error, stale })
            }
        }
    }

    /// 키 무효화. 다음 조회 시 새로 가져옵니다.
    pub async fn invalidate(&self, key: &str) {
        let mut slots = self.slots.write().await;
        slots.remove(key);
    }

    /// TTL 이내의 값 조회.
    async fn get_fresh(&self, key: &str, ttl: Duration) -> Option<Arc<T>> {
        let slots = self.slots.read().await;
        slots
            .get(key)
            .filter(|slot| slot.fetched_at.elapsed() < ttl)
            .map(|slot| slot.value.clone())
    }

    /// 신선도와 무관하게 보관 중인 값 조회.
    async fn get_any(&self, key: &str) -> Option<Arc<T>> {
        let slots = self.slots.read().await;
        slots.get(key).map(|slot| slot.value.clone())
    }

    /// 동시성 제어를 위한 Lock 획득 또는 생성.
    async fn get_or_create_lock(&self, key: &str) -> Arc<RwLock<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}

impl<T> Default for DirectoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_hit_within_ttl_fetches_once() {
        let cache: DirectoryCache<u32> = DirectoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7u32)
                })
                .await
                .unwrap();
            assert_eq!(*value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let cache: DirectoryCache<u32> = DirectoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("k", Duration::ZERO, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1u32)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_key_single_fetch() {
        let cache: Arc<DirectoryCache<u32>> = Arc::new(DirectoryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("k", Duration::from_secs(60), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(42u32)
                    })
                    .await
                    .map(|v| *v)
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_value() {
        let cache: DirectoryCache<u32> = DirectoryCache::new();

        cache
            .get_or_fetch("k", Duration::from_secs(60), || async { Ok(5u32) })
            .await
            .unwrap();

        // TTL 0으로 강제 갱신을 유도하고 실패시킴
        let failure = cache
            .get_or_fetch("k", Duration::ZERO, || async {
                Err(FetchError::Transport("연결 끊김".into()))
            })
            .await
            .unwrap_err();

        assert!(matches!(failure.error, FetchError::Transport(_)));
        assert_eq!(failure.stale.as_deref(), Some(&5));

        // 기존 슬롯은 지워지지 않음
        let kept = cache
            .get_or_fetch("k", Duration::from_secs(60), || async {
                panic!("캐시에 값이 남아 있어야 함")
            })
            .await
            .unwrap();
        assert_eq!(*kept, 5);
    }

    #[tokio::test]
    async fn test_unrelated_keys_fetch_independently() {
        let cache: DirectoryCache<u32> = DirectoryCache::new();
        let calls = AtomicUsize::new(0);

        for key in ["a", "b"] {
            cache
                .get_or_fetch(key, Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(0u32)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache: DirectoryCache<u32> = DirectoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(3u32)
                })
                .await
                .unwrap();
            cache.invalidate("k").await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
