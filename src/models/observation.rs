use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};

/// One dated record as produced by a loader. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub values: BTreeMap<String, Option<f64>>,
}

impl Observation {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, variable: &str, value: Option<f64>) -> Self {
        self.values.insert(variable.to_string(), value);
        self
    }
}

/// Values of a single named variable, aligned with the series dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Daily observations for one station, stored column-wise.
///
/// Dates are strictly increasing. Gaps in the calendar are allowed and are
/// never filled with synthetic records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    dates: Vec<NaiveDate>,
    variables: Vec<VariableSeries>,
}

impl ObservationSeries {
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self> {
        ensure_ordered(&dates)?;
        Ok(Self {
            dates,
            variables: Vec::new(),
        })
    }

    /// Build a series from row records. Variables absent from a record are
    /// treated as missing for that date.
    pub fn from_records(records: Vec<Observation>) -> Result<Self> {
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        let mut series = Self::new(dates)?;

        let mut names: Vec<&String> = records.iter().flat_map(|r| r.values.keys()).collect();
        names.sort();
        names.dedup();

        for name in names {
            let values = records
                .iter()
                .map(|r| r.values.get(name).copied().flatten())
                .collect();
            series.variables.push(VariableSeries {
                name: name.clone(),
                values,
            });
        }

        Ok(series)
    }

    pub fn with_variable(mut self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        self.push_variable(name, values)?;
        Ok(self)
    }

    pub fn push_variable(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.dates.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Variable '{}' has {} values but the series has {} dates",
                name,
                values.len(),
                self.dates.len()
            )));
        }
        if self.variable(name).is_some() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Duplicate variable '{}'",
                name
            )));
        }

        self.variables.push(VariableSeries {
            name: name.to_string(),
            values,
        });
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn variables(&self) -> &[VariableSeries] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&[Option<f64>]> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.values.as_slice())
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Row view of the series.
    pub fn records(&self) -> Vec<Observation> {
        self.dates
            .iter()
            .enumerate()
            .map(|(i, date)| Observation {
                date: *date,
                values: self
                    .variables
                    .iter()
                    .map(|v| (v.name.clone(), v.values[i]))
                    .collect(),
            })
            .collect()
    }
}

fn ensure_ordered(dates: &[NaiveDate]) -> Result<()> {
    for window in dates.windows(2) {
        if window[1] <= window[0] {
            return Err(ProcessingError::InvalidFormat(format!(
                "Dates must be strictly increasing: {} follows {}",
                window[1], window[0]
            )));
        }
    }
    Ok(())
}
