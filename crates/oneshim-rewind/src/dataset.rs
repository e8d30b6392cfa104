//! 정렬·중복 제거된 캡처 집합.
//!
//! 호스트가 넘긴 순서와 무관하게 타임스탬프 엄격 오름차순 + ID 유일성을 보장한다.

use oneshim_core::models::capture::Capture;
use std::collections::HashSet;
use std::ops::Deref;
use tracing::debug;

/// 로드된 세션 동안 불변인 캡처 배열
#[derive(Debug, Clone, Default)]
pub struct CaptureSet {
    captures: Vec<Capture>,
}

impl CaptureSet {
    /// 임의 순서의 캡처 목록을 정규화
    ///
    /// `(timestamp, id)` 순으로 정렬한 뒤 중복 ID와 같은 타임스탬프의
    /// 뒤쪽 캡처를 버린다 (같은 시각이면 가장 작은 ID가 남는다).
    pub fn normalize(mut captures: Vec<Capture>) -> Self {
        let received = captures.len();
        captures.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        let mut seen_ids = HashSet::with_capacity(captures.len());
        let mut last_timestamp: Option<i64> = None;
        captures.retain(|c| {
            if last_timestamp == Some(c.timestamp) || !seen_ids.insert(c.id) {
                return false;
            }
            last_timestamp = Some(c.timestamp);
            true
        });

        if captures.len() != received {
            debug!(
                "캡처 정규화: {}개 중 {}개 제외",
                received,
                received - captures.len()
            );
        }
        Self { captures }
    }

    /// 마지막 인덱스 (비어 있으면 None)
    pub fn last_index(&self) -> Option<usize> {
        self.captures.len().checked_sub(1)
    }

    /// 인덱스를 `[0, n-1]`로 클램프 (비어 있으면 0)
    pub fn clamp_index(&self, index: isize) -> usize {
        match self.last_index() {
            Some(last) => index.clamp(0, last as isize) as usize,
            None => 0,
        }
    }

    /// 캡처 슬라이스
    pub fn as_slice(&self) -> &[Capture] {
        &self.captures
    }
}

impl Deref for CaptureSet {
    type Target = [Capture];

    fn deref(&self) -> &Self::Target {
        &self.captures
    }
}
