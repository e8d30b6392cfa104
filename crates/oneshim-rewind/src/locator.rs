//! 타임스탬프 → 가장 가까운 캡처 인덱스 (이진 탐색).

use oneshim_core::models::capture::Capture;

use crate::error::RewindError;

/// 키 오름차순 시퀀스에서 `target`에 가장 가까운 항목의 인덱스
///
/// `target` 이상인 첫 항목과 그 직전 항목 중 더 가까운 쪽을 고르며,
/// 거리가 같으면 앞쪽 인덱스가 이긴다. 비어 있으면 `None`.
pub fn nearest_index_by_key<T, F>(items: &[T], target: i64, key: F) -> Option<usize>
where
    F: Fn(&T) -> i64,
{
    if items.is_empty() {
        return None;
    }

    let lo = items.partition_point(|item| key(item) < target);
    if lo == 0 {
        return Some(0);
    }
    if lo == items.len() {
        return Some(items.len() - 1);
    }

    let before = key(&items[lo - 1]).abs_diff(target);
    let after = key(&items[lo]).abs_diff(target);
    Some(if before <= after { lo - 1 } else { lo })
}

/// 캡처 배열용 최근접 탐색기
#[derive(Debug, Clone, Copy)]
pub struct NearestSampleLocator<'a> {
    captures: &'a [Capture],
}

impl<'a> NearestSampleLocator<'a> {
    /// 오름차순 정렬된 캡처 배열로 생성
    pub fn new(captures: &'a [Capture]) -> Self {
        Self { captures }
    }

    /// 타임스탬프에 가장 가까운 캡처 인덱스
    pub fn locate(&self, timestamp: i64) -> Result<usize, RewindError> {
        nearest_index_by_key(self.captures, timestamp, |c| c.timestamp)
            .ok_or(RewindError::EmptyDataset)
    }
}
