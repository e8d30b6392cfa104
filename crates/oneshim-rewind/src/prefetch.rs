//! 현재 인덱스 주변 이미지 프리페치.
//!
//! `[current - radius, current + radius]` 범위의 원본 이미지를 fire-and-forget으로
//! 미리 가져온다. 최근 요청한 URL은 LRU로 기억해 스크럽 중 중복 요청을 막는다.
//! 실패는 debug 로그만 남기고 무시한다. tokio 런타임 밖에서는 아무것도
//! 요청하지 않는다 (LRU도 갱신하지 않음).

use lru::LruCache;
use oneshim_core::config::PrefetchConfig;
use oneshim_core::models::capture::Capture;
use oneshim_core::ports::media::{MediaPrefetcher, MediaResolver};
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// 최소 LRU 용량 (설정값이 0일 때)
const MIN_RECENT_CAPACITY: NonZeroUsize = NonZeroUsize::MIN;

/// 중심 인덱스 기준 프리페치 범위 (경계로 클램프, 비어 있으면 `None`)
pub fn prefetch_range(center: usize, len: usize, radius: usize) -> Option<RangeInclusive<usize>> {
    let last = len.checked_sub(1)?;
    let center = center.min(last);
    Some(center.saturating_sub(radius)..=center.saturating_add(radius).min(last))
}

/// 프리페치 윈도우
pub struct ImagePrefetchWindow {
    radius: usize,
    enabled: bool,
    resolver: Arc<dyn MediaResolver>,
    prefetcher: Option<Arc<dyn MediaPrefetcher>>,
    recent: LruCache<String, ()>,
}

impl ImagePrefetchWindow {
    /// 설정으로 생성 (prefetcher가 없으면 아무것도 요청하지 않음)
    pub fn new(
        config: &PrefetchConfig,
        resolver: Arc<dyn MediaResolver>,
        prefetcher: Option<Arc<dyn MediaPrefetcher>>,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.recent_capacity).unwrap_or(MIN_RECENT_CAPACITY);
        Self {
            radius: config.radius,
            enabled: config.enabled,
            resolver,
            prefetcher,
            recent: LruCache::new(capacity),
        }
    }

    /// 인덱스 변경 시 호출: 새로 요청한 URL 수 반환
    pub fn on_index_changed(&mut self, center: usize, captures: &[Capture]) -> usize {
        if !self.enabled {
            return 0;
        }
        let Some(prefetcher) = self.prefetcher.clone() else {
            return 0;
        };
        let Some(range) = prefetch_range(center, captures.len(), self.radius) else {
            return 0;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!("tokio 런타임 없음, 프리페치 생략: 중심 {}", center);
            return 0;
        };

        let mut scheduled = 0;
        for capture in &captures[range] {
            let url = self.resolver.resolve_media_url(&capture.full_image_ref);
            if self.recent.put(url.clone(), ()).is_some() {
                continue;
            }

            let prefetcher = Arc::clone(&prefetcher);
            runtime.spawn(async move {
                if let Err(e) = prefetcher.prefetch(&url).await {
                    debug!("프리페치 실패 (무시): {}: {}", url, e);
                }
            });
            scheduled += 1;
        }

        if scheduled > 0 {
            debug!("프리페치 예약: 중심 {}, {}건", center, scheduled);
        }
        scheduled
    }

    /// 기억된 URL 수
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oneshim_core::error::CoreError;
    use oneshim_core::ports::media::PrefixMediaResolver;
    use parking_lot::Mutex;

    struct MockPrefetcher {
        requested: Mutex<Vec<String>>,
        should_fail: bool,
    }

    #[async_trait]
    impl MediaPrefetcher for MockPrefetcher {
        async fn prefetch(&self, url: &str) -> Result<(), CoreError> {
            self.requested.lock().push(url.to_string());
            if self.should_fail {
                Err(CoreError::Network("mock 실패".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn captures(n: i64) -> Vec<Capture> {
        (0..n)
            .map(|i| Capture {
                id: i,
                timestamp: i * 5,
                app_name: None,
                thumbnail_ref: format!("{i}/thumb"),
                full_image_ref: format!("{i}/image"),
            })
            .collect()
    }

    fn window(prefetcher: Arc<MockPrefetcher>) -> ImagePrefetchWindow {
        ImagePrefetchWindow::new(
            &PrefetchConfig::default(),
            Arc::new(PrefixMediaResolver::new("/api/frames/")),
            Some(prefetcher),
        )
    }

    #[test]
    fn range_clamps_to_bounds() {
        assert_eq!(prefetch_range(0, 20, 5), Some(0..=5));
        assert_eq!(prefetch_range(10, 20, 5), Some(5..=15));
        assert_eq!(prefetch_range(19, 20, 5), Some(14..=19));
        assert_eq!(prefetch_range(2, 3, 5), Some(0..=2));
        assert_eq!(prefetch_range(0, 0, 5), None);
    }

    #[tokio::test]
    async fn schedules_neighbors_once() {
        let mock = Arc::new(MockPrefetcher {
            requested: Mutex::new(Vec::new()),
            should_fail: false,
        });
        let caps = captures(30);
        let mut window = window(Arc::clone(&mock));

        assert_eq!(window.on_index_changed(10, &caps), 11);
        // 한 칸 이동하면 새로 들어온 1건만 요청
        assert_eq!(window.on_index_changed(11, &caps), 1);
        assert_eq!(window.recent_len(), 12);

        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let requested = mock.requested.lock().clone();
        assert_eq!(requested.len(), 12);
        assert!(requested.contains(&"/api/frames/16/image".to_string()));
    }

    #[tokio::test]
    async fn failures_are_ignored() {
        let mock = Arc::new(MockPrefetcher {
            requested: Mutex::new(Vec::new()),
            should_fail: true,
        });
        let caps = captures(3);
        let mut window = window(mock);
        assert_eq!(window.on_index_changed(1, &caps), 3);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    #[test]
    fn disabled_or_missing_prefetcher_is_noop() {
        let caps = captures(5);
        let mut no_prefetcher = ImagePrefetchWindow::new(
            &PrefetchConfig::default(),
            Arc::new(PrefixMediaResolver::new("")),
            None,
        );
        assert_eq!(no_prefetcher.on_index_changed(2, &caps), 0);

        let config = PrefetchConfig {
            enabled: false,
            ..PrefetchConfig::default()
        };
        let mock = Arc::new(MockPrefetcher {
            requested: Mutex::new(Vec::new()),
            should_fail: false,
        });
        let mut disabled = ImagePrefetchWindow::new(
            &config,
            Arc::new(PrefixMediaResolver::new("")),
            Some(mock),
        );
        assert_eq!(disabled.on_index_changed(2, &caps), 0);
    }

    #[test]
    fn without_runtime_nothing_is_scheduled() {
        let mock = Arc::new(MockPrefetcher {
            requested: Mutex::new(Vec::new()),
            should_fail: false,
        });
        let caps = captures(10);
        let mut window = window(Arc::clone(&mock));

        assert_eq!(window.on_index_changed(4, &caps), 0);
        assert_eq!(window.recent_len(), 0);
        assert!(mock.requested.lock().is_empty());
    }
}
