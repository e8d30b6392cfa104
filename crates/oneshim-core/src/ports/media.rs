//! 미디어 참조 해석 / 프리페치 포트.

use async_trait::async_trait;

use crate::error::CoreError;

/// 이미지 참조 → 표시용 URL 변환 (동기, 순수 함수)
pub trait MediaResolver: Send + Sync {
    /// 참조 키를 URL로 변환
    fn resolve_media_url(&self, media_ref: &str) -> String;
}

/// 이미지 사전 로드
///
/// 실패해도 정확성에는 영향이 없다 (성능 최적화 용도).
#[async_trait]
pub trait MediaPrefetcher: Send + Sync {
    /// URL의 이미지를 미리 가져와 캐시에 적재
    async fn prefetch(&self, url: &str) -> Result<(), CoreError>;
}

/// 참조 키 앞에 고정 prefix를 붙이는 기본 해석기
#[derive(Debug, Clone)]
pub struct PrefixMediaResolver {
    prefix: String,
}

impl PrefixMediaResolver {
    /// 새 해석기 생성 (예: `"/api/frames/"`)
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl MediaResolver for PrefixMediaResolver {
    fn resolve_media_url(&self, media_ref: &str) -> String {
        format!("{}{}", self.prefix, media_ref)
    }
}
