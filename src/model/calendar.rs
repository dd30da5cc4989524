//! Date dimension rows and season tables.

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar day of the date dimension.
///
/// Every attribute is a pure function of `full_date` and the season table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub date_key: i32,
    pub full_date: NaiveDate,
    /// 1 = Monday through 7 = Sunday
    pub day_of_week: u32,
    pub day_name: String,
    pub day_of_month: u32,
    pub day_of_year: u32,
    /// ISO-8601 week number
    pub week_of_year: u32,
    pub month: u32,
    pub month_name: String,
    pub quarter: u32,
    pub year: i32,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub season: String,
    pub fiscal_quarter: u32,
    pub fiscal_year: i32,
}

/// Hemisphere used to label seasons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonTable {
    #[default]
    Northern,
    Southern,
}

impl SeasonTable {
    /// Season label for a month.
    pub fn season(&self, month: Month) -> &'static str {
        use Month::*;

        let northern = match month {
            December | January | February => "Winter",
            March | April | May => "Spring",
            June | July | August => "Summer",
            September | October | November => "Autumn",
        };

        match self {
            Self::Northern => northern,
            Self::Southern => match northern {
                "Winter" => "Summer",
                "Spring" => "Autumn",
                "Summer" => "Winter",
                _ => "Spring",
            },
        }
    }
}

impl std::str::FromStr for SeasonTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "northern" => Ok(Self::Northern),
            "southern" => Ok(Self::Southern),
            other => Err(format!("expected northern or southern, got {other:?}")),
        }
    }
}

impl From<entity::dim_date::Model> for CalendarRow {
    fn from(model: entity::dim_date::Model) -> Self {
        Self {
            date_key: model.date_key,
            full_date: model.full_date,
            day_of_week: model.day_of_week as u32,
            day_name: model.day_name,
            day_of_month: model.day_of_month as u32,
            day_of_year: model.day_of_year as u32,
            week_of_year: model.week_of_year as u32,
            month: model.month as u32,
            month_name: model.month_name,
            quarter: model.quarter as u32,
            year: model.year,
            is_weekend: model.is_weekend,
            is_holiday: model.is_holiday,
            season: model.season,
            fiscal_quarter: model.fiscal_quarter as u32,
            fiscal_year: model.fiscal_year,
        }
    }
}

impl From<&CalendarRow> for entity::dim_date::ActiveModel {
    fn from(row: &CalendarRow) -> Self {
        use sea_orm::ActiveValue::Set;

        Self {
            date_key: Set(row.date_key),
            full_date: Set(row.full_date),
            day_of_week: Set(row.day_of_week as i32),
            day_name: Set(row.day_name.clone()),
            day_of_month: Set(row.day_of_month as i32),
            day_of_year: Set(row.day_of_year as i32),
            week_of_year: Set(row.week_of_year as i32),
            month: Set(row.month as i32),
            month_name: Set(row.month_name.clone()),
            quarter: Set(row.quarter as i32),
            year: Set(row.year),
            is_weekend: Set(row.is_weekend),
            is_holiday: Set(row.is_holiday),
            season: Set(row.season.clone()),
            fiscal_quarter: Set(row.fiscal_quarter as i32),
            fiscal_year: Set(row.fiscal_year),
        }
    }
}
