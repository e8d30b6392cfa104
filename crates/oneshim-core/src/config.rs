//! 리와인드(타임라인 스크러버) 설정 구조체.
//!
//! 세그먼트 분할 임계값, 재생 주기, 키 홀드 가속 단계, 프리페치 윈도우 등
//! 런타임 설정을 정의한다. [`ConfigManager`](crate::config_manager::ConfigManager)를
//! 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::CoreError;

/// 재생 배속 (1, 2, 5, 10)
///
/// 설정 파일과 이벤트에는 배율 숫자로 직렬화된다. 목록 밖의 값은
/// 역직렬화 단계에서 거부된다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum SpeedMultiplier {
    /// 1배속
    #[default]
    X1,
    /// 2배속
    X2,
    /// 5배속
    X5,
    /// 10배속
    X10,
}

impl SpeedMultiplier {
    /// 지원 배속 전체
    pub const ALL: [SpeedMultiplier; 4] = [
        SpeedMultiplier::X1,
        SpeedMultiplier::X2,
        SpeedMultiplier::X5,
        SpeedMultiplier::X10,
    ];

    /// 배율 값
    pub fn factor(self) -> u32 {
        match self {
            SpeedMultiplier::X1 => 1,
            SpeedMultiplier::X2 => 2,
            SpeedMultiplier::X5 => 5,
            SpeedMultiplier::X10 => 10,
        }
    }

    /// 기준 주기를 배율로 나눈 틱 주기
    pub fn period(self, base: Duration) -> Duration {
        base / self.factor()
    }
}

impl TryFrom<u32> for SpeedMultiplier {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.factor() == value)
            .ok_or_else(|| {
                let supported: Vec<u32> = Self::ALL.iter().map(|s| s.factor()).collect();
                invalid(
                    "playback.default_speed",
                    &format!("{value}: 지원 배속 {supported:?} 중 하나여야 함"),
                )
            })
    }
}

impl From<SpeedMultiplier> for u32 {
    fn from(speed: SpeedMultiplier) -> Self {
        speed.factor()
    }
}

impl fmt::Display for SpeedMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.factor())
    }
}

/// 최상위 리와인드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewindConfig {
    /// 세그먼트 분할 설정
    #[serde(default)]
    pub segments: SegmentConfig,
    /// 재생 설정
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// 키 홀드 반복 설정
    #[serde(default)]
    pub hold_repeat: HoldRepeatConfig,
    /// 이미지 프리페치 설정
    #[serde(default)]
    pub prefetch: PrefetchConfig,
    /// 이벤트 스트림 설정
    #[serde(default)]
    pub events: EventConfig,
}

// ============================================================
// 세그먼트 설정
// ============================================================

/// 세그먼트 분할 설정
///
/// 두 임계값은 서로 다른 화면에서 쓰이므로 하나로 합치지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// 재생 세그먼트 분할 간격 (초, 이 값 이상 벌어지면 분할)
    #[serde(default = "default_playback_gap_secs")]
    pub playback_gap_secs: i64,
    /// 활동 구간(active span) 블록 분할 간격 (초)
    #[serde(default = "default_span_gap_secs")]
    pub span_gap_secs: i64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            playback_gap_secs: default_playback_gap_secs(),
            span_gap_secs: default_span_gap_secs(),
        }
    }
}

// ============================================================
// 재생 설정
// ============================================================

/// 재생 설정: 1배속 기준 주기와 기본 배속
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// 1배속 기준 틱 주기 (밀리초)
    #[serde(default = "default_base_period_ms")]
    pub base_period_ms: u64,
    /// 기본 배속
    #[serde(default)]
    pub default_speed: SpeedMultiplier,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_period_ms: default_base_period_ms(),
            default_speed: SpeedMultiplier::default(),
        }
    }
}

// ============================================================
// 키 홀드 반복 설정
// ============================================================

/// 방향키 홀드 시 가속 반복 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldRepeatConfig {
    /// 첫 반복까지 대기 (밀리초)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// 느린 단계 간격 (밀리초)
    #[serde(default = "default_slow_interval_ms")]
    pub slow_interval_ms: u64,
    /// 중간 단계 간격 (밀리초)
    #[serde(default = "default_medium_interval_ms")]
    pub medium_interval_ms: u64,
    /// 빠른 단계 간격 (밀리초)
    #[serde(default = "default_fast_interval_ms")]
    pub fast_interval_ms: u64,
    /// 반복 횟수가 이 값 미만이면 느린 단계
    #[serde(default = "default_slow_until_repeats")]
    pub slow_until_repeats: u32,
    /// 반복 횟수가 이 값 미만이면 중간 단계 (이후 빠른 단계)
    #[serde(default = "default_medium_until_repeats")]
    pub medium_until_repeats: u32,
}

impl Default for HoldRepeatConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            slow_interval_ms: default_slow_interval_ms(),
            medium_interval_ms: default_medium_interval_ms(),
            fast_interval_ms: default_fast_interval_ms(),
            slow_until_repeats: default_slow_until_repeats(),
            medium_until_repeats: default_medium_until_repeats(),
        }
    }
}

// ============================================================
// 프리페치 설정
// ============================================================

/// 인접 이미지 프리페치 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// 프리페치 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 현재 인덱스 기준 앞뒤 반경
    #[serde(default = "default_prefetch_radius")]
    pub radius: usize,
    /// 최근 요청 URL 기억 개수 (LRU)
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: default_prefetch_radius(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

// ============================================================
// 이벤트 스트림 설정
// ============================================================

/// 이벤트 브로드캐스트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// broadcast 채널 용량
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

// ============================================================
// RewindConfig impl
// ============================================================

impl RewindConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            segments: SegmentConfig::default(),
            playback: PlaybackConfig::default(),
            hold_repeat: HoldRepeatConfig::default(),
            prefetch: PrefetchConfig::default(),
            events: EventConfig::default(),
        }
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.segments.playback_gap_secs <= 0 {
            return Err(invalid("segments.playback_gap_secs", "0보다 커야 함"));
        }
        if self.segments.span_gap_secs <= 0 {
            return Err(invalid("segments.span_gap_secs", "0보다 커야 함"));
        }
        if self.playback.base_period_ms == 0 {
            return Err(invalid("playback.base_period_ms", "0보다 커야 함"));
        }

        let hold = &self.hold_repeat;
        if hold.initial_delay_ms == 0
            || hold.slow_interval_ms == 0
            || hold.medium_interval_ms == 0
            || hold.fast_interval_ms == 0
        {
            return Err(invalid("hold_repeat", "반복 간격은 0보다 커야 함"));
        }
        if hold.slow_until_repeats > hold.medium_until_repeats {
            return Err(invalid(
                "hold_repeat.slow_until_repeats",
                "medium_until_repeats 이하여야 함",
            ));
        }

        if self.prefetch.recent_capacity == 0 {
            return Err(invalid("prefetch.recent_capacity", "0보다 커야 함"));
        }
        if self.events.channel_capacity == 0 {
            return Err(invalid("events.channel_capacity", "0보다 커야 함"));
        }
        Ok(())
    }

    /// 1배속 재생 주기를 Duration으로 반환
    pub fn base_period(&self) -> Duration {
        Duration::from_millis(self.playback.base_period_ms)
    }

    /// 첫 홀드 반복 지연을 Duration으로 반환
    pub fn hold_initial_delay(&self) -> Duration {
        Duration::from_millis(self.hold_repeat.initial_delay_ms)
    }
}

impl Default for RewindConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_playback_gap_secs() -> i64 {
    60
}
fn default_span_gap_secs() -> i64 {
    30
}
fn default_base_period_ms() -> u64 {
    1_000
}
fn default_initial_delay_ms() -> u64 {
    300
}
fn default_slow_interval_ms() -> u64 {
    150
}
fn default_medium_interval_ms() -> u64 {
    80
}
fn default_fast_interval_ms() -> u64 {
    40
}
fn default_slow_until_repeats() -> u32 {
    5
}
fn default_medium_until_repeats() -> u32 {
    15
}
fn default_prefetch_radius() -> usize {
    5
}
fn default_recent_capacity() -> usize {
    256
}
fn default_channel_capacity() -> usize {
    256
}
