//! 범위 단위 변경 포트 (일괄 삭제, 컬렉션 저장).

use async_trait::async_trait;

use crate::error::CoreError;

/// 선택 범위에 대한 영속 변경 작업
#[async_trait]
pub trait RangeStore: Send + Sync {
    /// `[start_time, end_time_exclusive)` 범위의 캡처 삭제, 삭제 개수 반환
    async fn delete_captures_in_range(
        &self,
        start_time: i64,
        end_time_exclusive: i64,
    ) -> Result<u64, CoreError>;

    /// 범위를 이름 붙은 컬렉션으로 저장, 컬렉션 ID 반환
    async fn save_range_as_collection(
        &self,
        name: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<String, CoreError>;
}
