//! The supplement record and its derived metrics.
//!
//! Derived values (days remaining, cost per day) are never stored; they are
//! recomputed from the current fields on every call.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single tracked supplement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Supplement {
    /// Files written before ids existed get a fresh one on load
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub current_count: f64,
    pub initial_count: f64,
    pub cost: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub daily_dose: f64,
    #[serde(default = "default_auto_decrement")]
    pub auto_decrement: bool,
}

fn default_auto_decrement() -> bool {
    true
}

impl Supplement {
    /// Create a tracked supplement with a full bottle of `count` units
    pub fn new(name: impl Into<String>, count: f64, daily_dose: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            current_count: count,
            initial_count: count,
            cost: 0.0,
            tags: Vec::new(),
            link: None,
            daily_dose,
            auto_decrement: true,
        }
    }

    fn usage_tracked(&self) -> bool {
        self.auto_decrement && self.daily_dose > 0.0
    }

    /// Days until `current_count` runs out, `None` when usage is not tracked
    pub fn days_remaining(&self) -> Option<f64> {
        self.usage_tracked()
            .then(|| self.current_count / self.daily_dose)
    }

    /// Days a full container lasts
    pub fn days_supply(&self) -> Option<f64> {
        self.usage_tracked()
            .then(|| self.initial_count / self.daily_dose)
    }

    /// Cost of one day's doses, based on the full container
    pub fn cost_per_day(&self) -> Option<f64> {
        self.days_supply()
            .filter(|days| *days > 0.0)
            .map(|days| self.cost / days)
    }

    /// True when days remaining is known and at or below `threshold_days`
    pub fn is_low(&self, threshold_days: f64) -> bool {
        self.days_remaining()
            .map_or(false, |days| days <= threshold_days)
    }

    /// Case-insensitive substring match against the name and every tag
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
    }

    /// Check every constraint a user-entered record must satisfy
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_stored()?;

        if self.auto_decrement && self.daily_dose == 0.0 {
            return Err(ValidationError::ZeroDailyDose);
        }

        Ok(())
    }

    /// Constraints enforced on records read back from disk.
    ///
    /// A zero daily dose is tolerated here; such records simply report no
    /// days remaining.
    pub(crate) fn validate_stored(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        for (field, value) in [
            ("current_count", self.current_count),
            ("initial_count", self.initial_count),
            ("cost", self.cost),
            ("daily_dose", self.daily_dose),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(ValidationError::Negative { field, value });
            }
        }

        Ok(())
    }
}

/// A partial edit of a supplement; `None` leaves the field as is
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupplementUpdate {
    pub name: Option<String>,
    pub current_count: Option<f64>,
    pub initial_count: Option<f64>,
    pub cost: Option<f64>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the link
    pub link: Option<Option<String>>,
    pub daily_dose: Option<f64>,
    pub auto_decrement: Option<bool>,
}

impl SupplementUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the edit changes how the record is consumed
    pub fn touches_usage(&self) -> bool {
        self.daily_dose.is_some() || self.auto_decrement.is_some()
    }

    /// Produce the edited copy of `record`, leaving `record` untouched
    pub fn apply_to(&self, record: &Supplement) -> Supplement {
        let mut updated = record.clone();

        if let Some(ref name) = self.name {
            updated.name = name.clone();
        }
        if let Some(count) = self.current_count {
            updated.current_count = count;
        }
        if let Some(count) = self.initial_count {
            updated.initial_count = count;
        }
        if let Some(cost) = self.cost {
            updated.cost = cost;
        }
        if let Some(ref tags) = self.tags {
            updated.tags = tags.clone();
        }
        if let Some(ref link) = self.link {
            updated.link = link.clone();
        }
        if let Some(dose) = self.daily_dose {
            updated.daily_dose = dose;
        }
        if let Some(auto) = self.auto_decrement {
            updated.auto_decrement = auto;
        }

        updated
    }
}

/// Split comma-separated tag input, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Render days remaining rounded down to whole days, or `N/A`
pub fn format_days(days: Option<f64>) -> String {
    match days {
        Some(days) => format!("{}", days.floor() as i64),
        None => "N/A".to_string(),
    }
}
