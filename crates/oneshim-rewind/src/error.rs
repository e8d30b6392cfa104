//! 리와인드 엔진 에러.

use oneshim_core::error::CoreError;
use thiserror::Error;

/// 리와인드 엔진 에러
///
/// 협력자(포트) 실패는 `Core`로 감싸 호스트에 그대로 전달한다.
#[derive(Debug, Error)]
pub enum RewindError {
    /// 캡처가 하나도 없는 상태에서 위치 연산 시도
    #[error("빈 데이터셋")]
    EmptyDataset,

    /// 확정된 범위 선택이 없음
    #[error("선택된 범위 없음")]
    NoSelection,

    /// 이미 진행 중인 삭제/저장 작업이 있음
    #[error("진행 중인 변경 작업 있음")]
    MutationInFlight,

    /// 지원하지 않는 재생 배속
    #[error("지원하지 않는 재생 배속: {0}")]
    UnsupportedSpeed(u32),

    /// 입력 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 외부 협력자 실패
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_is_transparent() {
        let err: RewindError = CoreError::Network("연결 끊김".to_string()).into();
        assert!(err.to_string().contains("연결 끊김"));
        assert!(matches!(err, RewindError::Core(CoreError::Network(_))));
    }
}
