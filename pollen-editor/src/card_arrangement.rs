//! Card arrangement picker shown in the survey styling panel.

use serde::{Deserialize, Serialize};

use crate::survey::SurveyType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardArrangement {
    Casual,
    Straight,
    #[default]
    Simple,
}

impl CardArrangement {
    pub fn all() -> &'static [CardArrangement] {
        &[
            CardArrangement::Casual,
            CardArrangement::Straight,
            CardArrangement::Simple,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardArrangement::Casual => "casual",
            CardArrangement::Straight => "straight",
            CardArrangement::Simple => "simple",
        }
    }

    /// Translation key for the tab label.
    pub fn label_key(&self) -> String {
        format!("environments.surveys.edit.{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangementIcon {
    Casual,
    Straight,
    Simple,
}

impl ArrangementIcon {
    /// Icon for an arrangement name; anything unrecognised gets the simple icon.
    pub fn for_name(name: &str) -> Self {
        match name {
            "casual" => ArrangementIcon::Casual,
            "straight" => ArrangementIcon::Straight,
            _ => ArrangementIcon::Simple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOption {
    pub value: CardArrangement,
    pub label_key: String,
    pub icon: ArrangementIcon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardArrangementTabs {
    pub survey_type: SurveyType,
    pub active: CardArrangement,
    pub disabled: bool,
}

impl CardArrangementTabs {
    pub fn new(survey_type: SurveyType, active: CardArrangement) -> Self {
        Self {
            survey_type,
            active,
            disabled: false,
        }
    }

    pub fn options(&self) -> Vec<TabOption> {
        CardArrangement::all()
            .iter()
            .map(|arrangement| TabOption {
                value: *arrangement,
                label_key: arrangement.label_key(),
                icon: ArrangementIcon::for_name(arrangement.as_str()),
            })
            .collect()
    }

    /// Report a tab selection to `on_change` together with the survey type.
    /// Returns false without calling it when the tabs are disabled.
    pub fn select<F>(&self, arrangement: CardArrangement, on_change: F) -> bool
    where
        F: FnOnce(CardArrangement, SurveyType),
    {
        if self.disabled {
            return false;
        }
        on_change(arrangement, self.survey_type);
        true
    }
}
