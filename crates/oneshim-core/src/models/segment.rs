//! 활동 세그먼트 모델.

use serde::{Deserialize, Serialize};

/// 같은 앱이 연속으로 캡처된 구간
///
/// 한 캡처 집합에 대해 세그먼트들은 인덱스 범위 `[0, n-1]`을 빈틈없이 분할한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySegment {
    /// 앱 이름 (없으면 "Unknown")
    pub app_name: String,
    /// 첫 캡처 시각 (Unix 초)
    pub start_time: i64,
    /// 마지막 캡처 시각 (Unix 초)
    pub end_time: i64,
    /// 첫 캡처 인덱스 (포함)
    pub start_index: usize,
    /// 마지막 캡처 인덱스 (포함)
    pub end_index: usize,
}

impl ActivitySegment {
    /// 세그먼트에 포함된 캡처 수 (1 이상)
    pub fn capture_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// 인덱스 포함 여부
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..=self.end_index).contains(&index)
    }

    /// 세그먼트 지속 시간 (초)
    pub fn duration_secs(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }
}
