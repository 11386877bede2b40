use std::collections::{BTreeMap, BTreeSet};

use super::model::{is_truthy, Outcome, Record, Sex};
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Filter configuration: a snapshot of the filter widgets
// ---------------------------------------------------------------------------

/// Active filter selections.  Rebuilt from the widgets on every change and
/// passed by value; never edited in place once submitted.
///
/// An empty `allowed_sex` or `allowed_outcome` set means "nothing selected",
/// so no record passes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterConfig {
    pub allowed_sex: BTreeSet<Sex>,
    pub allowed_outcome: BTreeSet<Outcome>,
    /// Condition flag → "only keep records where this flag is true".
    pub require: BTreeMap<String, bool>,
}

impl FilterConfig {
    /// Both sexes, both outcomes, no condition required.
    pub fn allow_all(schema: &Schema) -> Self {
        Self {
            allowed_sex: Sex::ALL.into_iter().collect(),
            allowed_outcome: Outcome::ALL.into_iter().collect(),
            require: schema
                .condition_flags
                .iter()
                .map(|f| (f.clone(), false))
                .collect(),
        }
    }

    pub fn requires(&self, flag: &str) -> bool {
        self.require.get(flag).copied().unwrap_or(false)
    }

    /// Copy with the sex category switched on or off.
    pub fn with_sex(mut self, sex: Sex, allowed: bool) -> Self {
        if allowed {
            self.allowed_sex.insert(sex);
        } else {
            self.allowed_sex.remove(&sex);
        }
        self
    }

    /// Copy with the outcome category switched on or off.
    pub fn with_outcome(mut self, outcome: Outcome, allowed: bool) -> Self {
        if allowed {
            self.allowed_outcome.insert(outcome);
        } else {
            self.allowed_outcome.remove(&outcome);
        }
        self
    }

    /// Copy with a condition flag requirement set.
    pub fn with_required(mut self, flag: &str, required: bool) -> Self {
        self.require.insert(flag.to_string(), required);
        self
    }
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Whether a single record passes every active filter.
///
/// A record passes when:
/// * its normalised sex is in `allowed_sex`
/// * its normalised outcome is in `allowed_outcome`
/// * every required condition flag is truthy (`1`, `"1"`, `true`)
///
/// Missing or unrecognised categorical values fail the predicate.
pub fn record_passes(record: &Record, config: &FilterConfig, schema: &Schema) -> bool {
    let sex_ok = Sex::normalize(record.get(&schema.sex_field))
        .is_some_and(|s| config.allowed_sex.contains(&s));
    if !sex_ok {
        return false;
    }

    let outcome_ok = Outcome::normalize(record.get(&schema.outcome_field))
        .is_some_and(|o| config.allowed_outcome.contains(&o));
    if !outcome_ok {
        return false;
    }

    config
        .require
        .iter()
        .filter(|(_, required)| **required)
        .all(|(flag, _)| is_truthy(record.get(flag)))
}

/// Return indices of records that pass all active filters, in input order.
pub fn filtered_indices(records: &[Record], config: &FilterConfig, schema: &Schema) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| record_passes(rec, config, schema))
        .map(|(i, _)| i)
        .collect()
}

/// Return the records that pass all active filters, in input order.
/// The input is never modified.
pub fn filter<'a>(records: &'a [Record], config: &FilterConfig, schema: &Schema) -> Vec<&'a Record> {
    filtered_indices(records, config, schema)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}
