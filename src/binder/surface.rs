use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Status,
    ResultSection,
    ResultSummary,
    ResultTable,
    ResultScore,
    Comparison,
    ChartsSection,
    Meals,
    FoodTable,
    HistorySection,
    HistoryBest,
    HistoryTable,
    CostChart,
}

impl Region {
    pub const ALL: [Region; 13] = [
        Region::Status,
        Region::ResultSection,
        Region::ResultSummary,
        Region::ResultTable,
        Region::ResultScore,
        Region::Comparison,
        Region::ChartsSection,
        Region::Meals,
        Region::FoodTable,
        Region::HistorySection,
        Region::HistoryBest,
        Region::HistoryTable,
        Region::CostChart,
    ];

    pub fn as_id(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::ResultSection => "result-section",
            Self::ResultSummary => "result-summary",
            Self::ResultTable => "result-table",
            Self::ResultScore => "result-score",
            Self::Comparison => "comparison",
            Self::ChartsSection => "charts-section",
            Self::Meals => "meals",
            Self::FoodTable => "food-table",
            Self::HistorySection => "history-section",
            Self::HistoryBest => "history-best",
            Self::HistoryTable => "history-table",
            Self::CostChart => "cost-chart",
        }
    }

    pub fn section(&self) -> Region {
        match self {
            Self::ResultSummary
            | Self::ResultTable
            | Self::ResultScore
            | Self::Comparison
            | Self::Meals => Self::ResultSection,
            Self::HistoryBest | Self::HistoryTable | Self::CostChart => Self::HistorySection,
            other => *other,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_id())
    }
}

#[derive(Debug, Error)]
#[error("unknown region id: {0}")]
pub struct RegionParseError(pub String);

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Region::ALL
            .iter()
            .find(|region| region.as_id() == normalized)
            .copied()
            .ok_or_else(|| RegionParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionContent {
    Text { lines: Vec<String> },
    Notice { kind: NoticeKind, message: String },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
}

impl RegionContent {
    pub fn text(line: impl Into<String>) -> Self {
        Self::Text {
            lines: vec![line.into()],
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    id: u64,
    region: Region,
}

impl ChartHandle {
    pub fn new(id: u64, region: Region) -> Self {
        Self { id, region }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

pub trait Surface {
    fn has_region(&self, region: Region) -> bool;
    fn write(&mut self, region: Region, content: RegionContent);
    fn clear(&mut self, region: Region);
    fn set_visible(&mut self, region: Region, visible: bool);
    fn create_chart(&mut self, region: Region, spec: ChartSpec) -> Option<ChartHandle>;
    fn destroy_chart(&mut self, handle: ChartHandle);
}
