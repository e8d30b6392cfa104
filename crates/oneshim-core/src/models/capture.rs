//! 캡처(스크린샷) 모델.
//!
//! 주기적으로 저장된 화면 스냅샷 메타데이터와, 외부에서 계산된
//! 활동 블록(표시 전용 집계)을 정의.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 앱 이름이 없는 캡처를 묶을 때 쓰는 라벨
pub const UNKNOWN_APP: &str = "Unknown";

/// 단일 캡처 (타임스탬프 + 앱 태그가 붙은 스냅샷)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// 캡처 ID (로드된 집합 내에서 유일)
    pub id: i64,
    /// 캡처 시각 (Unix 초)
    pub timestamp: i64,
    /// 활성 앱 이름
    pub app_name: Option<String>,
    /// 썸네일 참조 (URL 해석 전 키)
    pub thumbnail_ref: String,
    /// 원본 이미지 참조
    pub full_image_ref: String,
}

impl Capture {
    /// 그룹핑용 앱 라벨: 이름이 없으면 `"Unknown"`
    pub fn app_label(&self) -> &str {
        self.app_name.as_deref().unwrap_or(UNKNOWN_APP)
    }

    /// 캡처 시각을 UTC DateTime으로 변환
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// 미리보기 라벨용 시각 문자열 (HH:MM:SS, UTC)
    pub fn time_label(&self) -> String {
        self.captured_at()
            .map(|dt| dt.format("%H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// 활동 블록: 외부 협력자가 계산한 표시 전용 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBlock {
    /// 시작 시각 (Unix 초)
    pub start: i64,
    /// 종료 시각 (Unix 초)
    pub end: i64,
    /// 지속 시간 (초)
    pub duration_secs: i64,
}
