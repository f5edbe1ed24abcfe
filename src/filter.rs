use clap::ValueEnum;
use std::fmt::Display;
use strum::EnumIter;

use crate::feed::SaleItem;

#[derive(ValueEnum, EnumIter, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    All,
    #[value(name = "r18only")]
    R18Only,
    Safe,
}

impl Mode {
    pub fn admits(self, item: &SaleItem) -> bool {
        match self {
            Self::All => true,
            Self::R18Only => item.is_r18(),
            Self::Safe => !item.is_r18(),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::R18Only => write!(f, "r18only"),
            Self::Safe => write!(f, "safe"),
        }
    }
}
