//! 캡처 조회 포트.
//!
//! 구현: 호스트 (로컬 DB 또는 웹 API)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::capture::{ActiveBlock, Capture};

/// 시간 범위의 캡처 메타데이터 공급자
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// 시간 범위의 캡처 목록 조회
    ///
    /// 반환 순서는 보장되지 않는다. 엔진이 로드 시 정렬한다.
    async fn fetch_captures(
        &self,
        range_start: i64,
        range_end: i64,
    ) -> Result<Vec<Capture>, CoreError>;

    /// 시간 범위의 활동 블록 조회 (표시 전용)
    async fn fetch_active_blocks(
        &self,
        range_start: i64,
        range_end: i64,
    ) -> Result<Vec<ActiveBlock>, CoreError>;
}
