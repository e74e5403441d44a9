//! Control pool structure for the matching algorithm
//!
//! Controls are stored struct-of-arrays style and ordered by age, so the age
//! window of a case is located with two binary searches instead of a scan of
//! the whole pool.

use crate::models::{Control, Gender, PersonId};

/// Struct-of-arrays view of the control pool, ordered by age
///
/// The age ordering is produced with a stable sort, so controls of equal age
/// keep their original pool order. `pool_order` records that original
/// position and is the tie-break key for selection.
#[derive(Debug)]
pub struct ControlPool<'a> {
    /// Controls in age order
    controls: Vec<&'a Control>,
    /// Ages, parallel to `controls`, for binary search
    ages: Vec<f64>,
    /// Genders, parallel to `controls`
    genders: Vec<Gender>,
    /// Position of each control in the caller's pool
    pool_order: Vec<usize>,
}

impl<'a> ControlPool<'a> {
    /// Build the pool from the caller's controls
    #[must_use]
    pub fn new(controls: &'a [Control]) -> Self {
        let mut idx_vec: Vec<usize> = (0..controls.len()).collect();

        // Stable: equal ages stay in pool order
        idx_vec.sort_by(|&a, &b| controls[a].age.total_cmp(&controls[b].age));

        let mut sorted = Vec::with_capacity(controls.len());
        let mut ages = Vec::with_capacity(controls.len());
        let mut genders = Vec::with_capacity(controls.len());
        for &i in &idx_vec {
            sorted.push(&controls[i]);
            ages.push(controls[i].age);
            genders.push(controls[i].gender);
        }

        Self {
            controls: sorted,
            ages,
            genders,
            pool_order: idx_vec,
        }
    }

    /// Find the half-open index range of controls with `lower <= age <= upper`
    #[must_use]
    pub fn find_age_range(&self, lower: f64, upper: f64) -> (usize, usize) {
        let start_idx = self.ages.partition_point(|&age| age < lower);
        let end_idx = self.ages.partition_point(|&age| age <= upper);
        (start_idx, end_idx.max(start_idx))
    }

    /// Control at a pool index
    #[must_use]
    pub fn control(&self, idx: usize) -> &'a Control {
        self.controls[idx]
    }

    /// Identifier at a pool index
    #[must_use]
    pub fn person_id(&self, idx: usize) -> &'a PersonId {
        &self.controls[idx].person_id
    }

    /// Age at a pool index
    #[must_use]
    pub fn age(&self, idx: usize) -> f64 {
        self.ages[idx]
    }

    /// Gender at a pool index
    #[must_use]
    pub fn gender(&self, idx: usize) -> Gender {
        self.genders[idx]
    }

    /// Original position in the caller's pool
    #[must_use]
    pub fn pool_order(&self, idx: usize) -> usize {
        self.pool_order[idx]
    }

    /// Get the number of controls in the pool
    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Check if the pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
