use clap::ValueEnum;
use std::fmt::Display;
use strum::EnumIter;

/// Display language of a rendered page.
#[derive(ValueEnum, EnumIter, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    Ja,
    En,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::En => "en",
        }
    }

    pub fn page_title(self) -> &'static str {
        match self {
            Self::Ja => "セール一覧",
            Self::En => "Sales",
        }
    }

    pub fn all_ages(self) -> &'static str {
        match self {
            Self::Ja => "全年齢",
            Self::En => "All ages",
        }
    }

    /// Same in both languages.
    pub fn r18(self) -> &'static str {
        "R-18"
    }

    pub fn ends(self) -> &'static str {
        match self {
            Self::Ja => "終了",
            Self::En => "Ends",
        }
    }

    pub fn ended(self) -> &'static str {
        match self {
            Self::Ja => "終了",
            Self::En => "Ended",
        }
    }

    pub fn hours_left(self, hours: i64) -> String {
        match self {
            Self::Ja => format!("残り約{hours}時間"),
            Self::En => format!("~{hours}h left"),
        }
    }

    pub fn days_left(self, days: i64) -> String {
        match self {
            Self::Ja => format!("残り約{days}日"),
            Self::En => format!("~{days}d left"),
        }
    }

    pub fn off(self) -> &'static str {
        match self {
            Self::Ja => "割引",
            Self::En => "Off",
        }
    }

    pub fn points(self) -> &'static str {
        match self {
            Self::Ja => "還元",
            Self::En => "Points",
        }
    }

    pub fn open_store(self) -> &'static str {
        match self {
            Self::Ja => "ストアで見る →",
            Self::En => "Open store →",
        }
    }

    pub fn no_title(self) -> &'static str {
        "(no title)"
    }

    // The ja variant mixes a full-width opening paren with an ascii closing one.
    pub fn loaded(self, shown: usize, generated_at: &str) -> String {
        match self {
            Self::Ja => format!("読み込み完了：{shown}件（generated_at: {generated_at})"),
            Self::En => format!("Loaded: {shown} items (generated_at: {generated_at})"),
        }
    }

    pub fn empty(self) -> &'static str {
        match self {
            Self::Ja => {
                "表示できる items がありません。data/sales.json かフィルタ設定を確認してください。"
            }
            Self::En => "No items to show. Check data/sales.json or filters.",
        }
    }

    pub fn load_failed(self) -> &'static str {
        match self {
            Self::Ja => "読み込み失敗",
            Self::En => "Load failed",
        }
    }
}

impl Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
