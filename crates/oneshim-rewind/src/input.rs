//! 호스트가 그대로 전달하는 키보드 입력과, 엔진이 호스트에 요청하는 명령.

use std::str::FromStr;

use crate::error::RewindError;
use crate::selection::TimeInterval;

/// 엔진이 처리하는 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// 한 칸 과거로 (누르고 있으면 가속 반복)
    ArrowLeft,
    /// 한 칸 최신으로 (누르고 있으면 가속 반복)
    ArrowRight,
    /// 첫 캡처로 이동
    Home,
    /// 마지막 캡처로 이동
    End,
    /// 재생/일시정지 토글
    Space,
    /// 선택 범위 삭제 확인 요청
    Delete,
    /// 선택 범위 컬렉션 저장 요청
    Enter,
    /// 선택 해제, 선택이 없으면 범위 모드 종료
    Escape,
}

impl FromStr for NavKey {
    type Err = RewindError;

    /// DOM `KeyboardEvent.key` 이름에서 변환
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "ArrowLeft" => Ok(NavKey::ArrowLeft),
            "ArrowRight" => Ok(NavKey::ArrowRight),
            "Home" => Ok(NavKey::Home),
            "End" => Ok(NavKey::End),
            " " | "Space" | "Spacebar" => Ok(NavKey::Space),
            "Delete" | "Backspace" => Ok(NavKey::Delete),
            "Enter" => Ok(NavKey::Enter),
            "Escape" | "Esc" => Ok(NavKey::Escape),
            other => Err(RewindError::Validation {
                field: "key".to_string(),
                message: format!("처리하지 않는 키: {other:?}"),
            }),
        }
    }
}

/// 호스트가 실행해야 할 명령
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// 삭제 확인 다이얼로그 표시
    ConfirmDelete(TimeInterval),
    /// 컬렉션 이름 입력 요청
    PromptCollectionName(TimeInterval),
}
