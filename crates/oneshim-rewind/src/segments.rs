//! 캡처 배열 → 같은 앱 연속 구간(세그먼트) 분할.
//!
//! 앱 이름이 바뀌거나 직전 캡처와의 간격이 임계값 이상이면 새 세그먼트를 시작한다.
//! 같은 알고리즘을 재생 세그먼트(60초)와 활동 구간 블록(30초)에 서로 다른
//! 임계값으로 사용한다.

use oneshim_core::config::SegmentConfig;
use oneshim_core::models::capture::Capture;
use oneshim_core::models::segment::ActivitySegment;

/// 세그먼트 분할기
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentBuilder {
    gap_threshold_secs: i64,
}

impl SegmentBuilder {
    /// 임의 임계값(초)으로 생성
    pub fn new(gap_threshold_secs: i64) -> Self {
        Self { gap_threshold_secs }
    }

    /// 재생 세그먼트용 분할기
    pub fn playback(config: &SegmentConfig) -> Self {
        Self::new(config.playback_gap_secs)
    }

    /// 활동 구간 블록용 분할기
    pub fn activity_span(config: &SegmentConfig) -> Self {
        Self::new(config.span_gap_secs)
    }

    /// 분할 임계값 (초)
    pub fn gap_threshold_secs(&self) -> i64 {
        self.gap_threshold_secs
    }

    /// 오름차순 캡처 배열을 세그먼트로 분할 (O(n))
    ///
    /// 결과 세그먼트들은 `[0, n-1]`을 순서대로 빈틈없이 덮는다.
    pub fn build(&self, captures: &[Capture]) -> Vec<ActivitySegment> {
        let mut segments: Vec<ActivitySegment> = Vec::new();

        for (index, capture) in captures.iter().enumerate() {
            let app = capture.app_label();

            // 마지막 세그먼트와 같은 앱이고 간격이 임계값 미만이면 연장
            if let Some(last) = segments.last_mut() {
                let gap = capture.timestamp.saturating_sub(last.end_time);
                if last.app_name == app && gap < self.gap_threshold_secs {
                    last.end_time = capture.timestamp;
                    last.end_index = index;
                    continue;
                }
            }

            segments.push(ActivitySegment {
                app_name: app.to_string(),
                start_time: capture.timestamp,
                end_time: capture.timestamp,
                start_index: index,
                end_index: index,
            });
        }

        segments
    }
}
