//! Cost comparison between purchase options.
//!
//! Options are transient; nothing here is persisted.

use crate::ValidationError;

/// Cost per day values closer than this are treated as a tie
const TIE_EPSILON: f64 = 1e-9;

/// One purchase option to compare
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostOption {
    /// Doses in the container
    pub dose_count: f64,
    pub price: f64,
    pub daily_dose: f64,
}

impl CostOption {
    pub fn new(dose_count: f64, price: f64, daily_dose: f64) -> Self {
        Self {
            dose_count,
            price,
            daily_dose,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("dose_count", self.dose_count),
            ("price", self.price),
            ("daily_dose", self.daily_dose),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
        }

        if self.price < 0.0 {
            return Err(ValidationError::Negative {
                field: "price",
                value: self.price,
            });
        }

        for (field, value) in [
            ("dose_count", self.dose_count),
            ("daily_dose", self.daily_dose),
        ] {
            if value <= 0.0 {
                return Err(ValidationError::NonPositive { field, value });
            }
        }

        Ok(())
    }
}

/// A ranked comparison result
#[derive(Clone, Debug, PartialEq)]
pub struct CostResult {
    /// Position of the option in the input
    pub index: usize,
    pub option: CostOption,
    pub days_supply: f64,
    pub cost_per_day: f64,
    /// 1-based; tied options share a rank
    pub rank: usize,
    /// Set on every option tied for the lowest cost per day
    pub best: bool,
}

/// Rank options by cost per day, cheapest first.
///
/// Tied options keep their input order and share a rank.
pub fn compare(options: &[CostOption]) -> Result<Vec<CostResult>, ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::NoOptions);
    }

    let mut results = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        option.validate()?;

        let days_supply = option.dose_count / option.daily_dose;
        results.push(CostResult {
            index,
            option: *option,
            days_supply,
            cost_per_day: option.price / days_supply,
            rank: 0,
            best: false,
        });
    }

    // Stable sort keeps input order among equal costs
    results.sort_by(|a, b| a.cost_per_day.total_cmp(&b.cost_per_day));

    let cheapest = results[0].cost_per_day;
    let mut previous = cheapest;
    let mut rank = 1;
    for (position, result) in results.iter_mut().enumerate() {
        if (result.cost_per_day - previous).abs() > TIE_EPSILON {
            rank = position + 1;
            previous = result.cost_per_day;
        }
        result.rank = rank;
        result.best = (result.cost_per_day - cheapest).abs() <= TIE_EPSILON;
    }

    Ok(results)
}
