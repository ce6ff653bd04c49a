use crate::usgs::{Earthquake, LoadStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NO_CONNECTION: &str = "No internet connection.";
pub const NO_QUAKES: &str = "No earthquakes found.";

/// Orderings accepted by the USGS `orderby` query parameter.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum OrderBy {
    Time,
    TimeAsc,
    Magnitude,
    MagnitudeAsc,
}

impl OrderBy {
    /// The wire value sent to the endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Time => "time",
            OrderBy::TimeAsc => "time-asc",
            OrderBy::Magnitude => "magnitude",
            OrderBy::MagnitudeAsc => "magnitude-asc",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            OrderBy::Time => OrderBy::TimeAsc,
            OrderBy::TimeAsc => OrderBy::Magnitude,
            OrderBy::Magnitude => OrderBy::MagnitudeAsc,
            OrderBy::MagnitudeAsc => OrderBy::Time,
        }
    }

    pub fn cycle_back(self) -> Self {
        match self {
            OrderBy::Time => OrderBy::MagnitudeAsc,
            OrderBy::TimeAsc => OrderBy::Time,
            OrderBy::Magnitude => OrderBy::TimeAsc,
            OrderBy::MagnitudeAsc => OrderBy::Magnitude,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Time => write!(f, "Newest first"),
            OrderBy::TimeAsc => write!(f, "Oldest first"),
            OrderBy::Magnitude => write!(f, "Largest first"),
            OrderBy::MagnitudeAsc => write!(f, "Smallest first"),
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(OrderBy::Time),
            "time-asc" => Ok(OrderBy::TimeAsc),
            "magnitude" => Ok(OrderBy::Magnitude),
            "magnitude-asc" => Ok(OrderBy::MagnitudeAsc),
            other => Err(format!(
                "unknown ordering '{other}', expected one of: time, time-asc, magnitude, magnitude-asc"
            )),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Screen {
    Quakes,
    Settings,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SettingsField {
    MinMagnitude,
    OrderBy,
    EntryCount,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            SettingsField::MinMagnitude => SettingsField::OrderBy,
            SettingsField::OrderBy => SettingsField::EntryCount,
            SettingsField::EntryCount => SettingsField::MinMagnitude,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            SettingsField::MinMagnitude => SettingsField::EntryCount,
            SettingsField::OrderBy => SettingsField::MinMagnitude,
            SettingsField::EntryCount => SettingsField::OrderBy,
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsField::MinMagnitude => write!(f, "Minimum magnitude"),
            SettingsField::OrderBy => write!(f, "Order results by"),
            SettingsField::EntryCount => write!(f, "Number of results"),
        }
    }
}

/// What the screen shows for a given load status. Recomputed on every
/// status change, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub message: Option<&'static str>,
    pub refreshing: bool,
    pub quakes: Vec<Earthquake>,
}

impl ViewState {
    pub fn project(status: Option<&LoadStatus>) -> Self {
        match status {
            None => ViewState {
                message: None,
                refreshing: true,
                quakes: Vec::new(),
            },
            Some(LoadStatus::Failed) => ViewState {
                message: Some(NO_CONNECTION),
                refreshing: false,
                quakes: Vec::new(),
            },
            Some(LoadStatus::Fine { reloading, quakes }) => ViewState {
                message: if quakes.is_empty() {
                    Some(NO_QUAKES)
                } else {
                    None
                },
                refreshing: *reloading,
                quakes: quakes.clone(),
            },
        }
    }
}
