use std::fmt;

use chrono::{Duration, NaiveDate};

use crate::routes::gathering::model::{Intent, TimeMode};

// 建立流程的日期选择窗口：今天起 14 天
pub const SELECTABLE_DAYS: i64 = 14;
// 出发地点填齐的最少参与人数
pub const MIN_FILLED_LOCATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Intent,
    Creator,
    Share,
    Results,
}

#[derive(Debug, Clone)]
pub enum Action {
    ChooseIntentAndTime {
        intent: Intent,
        time_mode: TimeMode,
    },
    SubmitCreator {
        location: String,
        available_dates: Vec<NaiveDate>,
    },
    ViewResults,
    Back,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    InvalidTransition { from: Step },
    EmptyField(&'static str),
    NoDateSelected,
    NotEnoughLocations,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::InvalidTransition { from } => {
                write!(f, "invalid action for current step {:?}", from)
            }
            FlowError::EmptyField(field) => write!(f, "請填寫{}！", field),
            FlowError::NoDateSelected => write!(f, "請至少選擇一個日期！"),
            FlowError::NotEnoughLocations => {
                write!(f, "至少需要 {} 位參與者的出發地點！", MIN_FILLED_LOCATIONS)
            }
        }
    }
}

impl std::error::Error for FlowError {}

// 建立聚会的页面流程：intent → creator → share → results。
// 步骤与收集的选择都在内存里，restart 清空重来。
#[derive(Debug, Default)]
pub struct CreateFlow {
    step: Step,
    intent: Option<Intent>,
    time_mode: Option<TimeMode>,
    location: Option<String>,
    available_dates: Vec<NaiveDate>,
}

impl CreateFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn time_mode(&self) -> Option<TimeMode> {
        self.time_mode
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn available_dates(&self) -> &[NaiveDate] {
        &self.available_dates
    }

    // 转移表：当前步骤 × 动作 → 下一步，表外组合一律拒绝
    pub fn apply(&mut self, action: Action) -> Result<Step, FlowError> {
        match (self.step, action) {
            (Step::Intent, Action::ChooseIntentAndTime { intent, time_mode }) => {
                self.intent = Some(intent);
                self.time_mode = Some(time_mode);
                self.step = Step::Creator;
            }
            (
                Step::Creator,
                Action::SubmitCreator {
                    location,
                    available_dates,
                },
            ) => {
                validate_required("出發地點", &location)?;
                if self.time_mode == Some(TimeMode::DateSelection) && available_dates.is_empty() {
                    return Err(FlowError::NoDateSelected);
                }
                self.location = Some(location);
                self.available_dates = available_dates;
                self.step = Step::Share;
            }
            (Step::Creator, Action::Back) => {
                self.step = Step::Intent;
            }
            (Step::Share, Action::ViewResults) => {
                self.step = Step::Results;
            }
            (_, Action::Restart) => {
                *self = Self::new();
            }
            (from, _) => return Err(FlowError::InvalidTransition { from }),
        }
        Ok(self.step)
    }
}

pub fn validate_required(field: &'static str, value: &str) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        Err(FlowError::EmptyField(field))
    } else {
        Ok(())
    }
}

// 结果页的前置条件：至少两位参与者填了出发地点
pub fn check_filled_locations<'a, I>(locations: I) -> Result<(), FlowError>
where
    I: IntoIterator<Item = &'a str>,
{
    let filled = locations
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .count();
    if filled < MIN_FILLED_LOCATIONS {
        Err(FlowError::NotEnoughLocations)
    } else {
        Ok(())
    }
}

// 日期选择窗口：today 起连续 14 天
pub fn selectable_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..SELECTABLE_DAYS)
        .map(|i| today + Duration::days(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn full_instant_flow_reaches_results() {
        let mut flow = CreateFlow::new();

        flow.apply(Action::ChooseIntentAndTime {
            intent: Intent::Hangout,
            time_mode: TimeMode::Instant,
        })
        .unwrap();
        assert_eq!(flow.step(), Step::Creator);

        flow.apply(Action::SubmitCreator {
            location: "台北車站".into(),
            available_dates: vec![],
        })
        .unwrap();
        assert_eq!(flow.step(), Step::Share);

        flow.apply(Action::ViewResults).unwrap();
        assert_eq!(flow.step(), Step::Results);
    }

    #[test]
    fn submit_before_choosing_intent_is_rejected() {
        let mut flow = CreateFlow::new();
        let err = flow
            .apply(Action::SubmitCreator {
                location: "台北車站".into(),
                available_dates: vec![],
            })
            .unwrap_err();
        assert_eq!(err, FlowError::InvalidTransition { from: Step::Intent });
        assert_eq!(flow.step(), Step::Intent);
    }

    #[test]
    fn empty_location_blocks_creator_step() {
        let mut flow = CreateFlow::new();
        flow.apply(Action::ChooseIntentAndTime {
            intent: Intent::Pickup,
            time_mode: TimeMode::Instant,
        })
        .unwrap();

        let err = flow
            .apply(Action::SubmitCreator {
                location: "   ".into(),
                available_dates: vec![],
            })
            .unwrap_err();
        assert_eq!(err, FlowError::EmptyField("出發地點"));
        assert_eq!(flow.step(), Step::Creator);
    }

    #[test]
    fn date_selection_mode_requires_at_least_one_date() {
        let mut flow = CreateFlow::new();
        flow.apply(Action::ChooseIntentAndTime {
            intent: Intent::Trade,
            time_mode: TimeMode::DateSelection,
        })
        .unwrap();

        let err = flow
            .apply(Action::SubmitCreator {
                location: "信義區".into(),
                available_dates: vec![],
            })
            .unwrap_err();
        assert_eq!(err, FlowError::NoDateSelected);

        flow.apply(Action::SubmitCreator {
            location: "信義區".into(),
            available_dates: vec![date("2025-01-10")],
        })
        .unwrap();
        assert_eq!(flow.step(), Step::Share);
    }

    #[test]
    fn back_returns_to_intent_step() {
        let mut flow = CreateFlow::new();
        flow.apply(Action::ChooseIntentAndTime {
            intent: Intent::Meetup,
            time_mode: TimeMode::Instant,
        })
        .unwrap();
        flow.apply(Action::Back).unwrap();
        assert_eq!(flow.step(), Step::Intent);
    }

    #[test]
    fn restart_clears_all_selections_from_any_step() {
        let mut flow = CreateFlow::new();
        flow.apply(Action::ChooseIntentAndTime {
            intent: Intent::Hangout,
            time_mode: TimeMode::DateSelection,
        })
        .unwrap();
        flow.apply(Action::SubmitCreator {
            location: "板橋".into(),
            available_dates: vec![date("2025-01-10")],
        })
        .unwrap();

        flow.apply(Action::Restart).unwrap();
        assert_eq!(flow.step(), Step::Intent);
        assert_eq!(flow.intent(), None);
        assert_eq!(flow.time_mode(), None);
        assert_eq!(flow.location(), None);
        assert!(flow.available_dates().is_empty());
    }

    #[test]
    fn results_gate_needs_two_filled_locations() {
        assert_eq!(
            check_filled_locations(["八里", ""]),
            Err(FlowError::NotEnoughLocations)
        );
        assert_eq!(check_filled_locations(["八里", "信義"]), Ok(()));
    }

    #[test]
    fn selectable_dates_cover_fourteen_days_from_today() {
        let dates = selectable_dates(date("2025-01-10"));
        assert_eq!(dates.len(), 14);
        assert_eq!(dates[0], date("2025-01-10"));
        assert_eq!(dates[13], date("2025-01-23"));
    }
}
