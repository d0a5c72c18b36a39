//! Department and salary summaries over the current employee collection.
//!
//! Everything here is a pure function of its input slice; callers recompute
//! on every change instead of caching.

use std::collections::HashMap;

use entity::Employee;
use serde::Serialize;

/// Upper bound (exclusive) and label of each salary bucket, in minor units.
const SALARY_BUCKETS: [(Option<i64>, &str); 4] = [
    (Some(500_000), "< 5L"),
    (Some(1_000_000), "5L-10L"),
    (Some(2_000_000), "10L-20L"),
    (None, "> 20L"),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepartmentSlice {
    pub name: String,
    pub count: usize,
    pub percent_of_total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SalaryBucket {
    pub label: &'static str,
    pub count: usize,
    /// Largest count of any bucket, shared by all four.
    pub max_across_buckets: usize,
    pub percent_of_total: f64,
}

impl SalaryBucket {
    /// Bar length relative to the fullest bucket, in `0.0..=1.0`.
    pub fn weight(&self) -> f64 {
        if self.max_across_buckets == 0 {
            0.0
        } else {
            self.count as f64 / self.max_across_buckets as f64
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub total: usize,
    /// Descending by count; ties keep first-seen order.
    pub departments: Vec<DepartmentSlice>,
    pub salary: [SalaryBucket; 4],
}

pub fn aggregate(employees: &[Employee]) -> AnalyticsView {
    AnalyticsView {
        total: employees.len(),
        departments: department_breakdown(employees),
        salary: salary_histogram(employees),
    }
}

/// Groups on the literal department string; blanks form their own group.
pub fn department_breakdown(employees: &[Employee]) -> Vec<DepartmentSlice> {
    let total = employees.len();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, usize)> = Vec::new();
    for employee in employees {
        let department = employee.department.as_str();
        match index.get(department) {
            Some(&slot) => groups[slot].1 += 1,
            None => {
                index.insert(department, groups.len());
                groups.push((department, 1));
            }
        }
    }
    // sort_by is stable.
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
        .into_iter()
        .map(|(name, count)| DepartmentSlice {
            name: name.to_string(),
            count,
            percent_of_total: percent(count, total),
        })
        .collect()
}

/// Index of the bucket holding `salary`; bucket edges belong to the upper bucket.
pub fn bucket_index(salary: i64) -> usize {
    SALARY_BUCKETS
        .iter()
        .position(|(upper, _)| upper.is_none_or(|upper| salary < upper))
        .unwrap_or(SALARY_BUCKETS.len() - 1)
}

pub fn salary_histogram(employees: &[Employee]) -> [SalaryBucket; 4] {
    let mut counts = [0usize; 4];
    for employee in employees {
        counts[bucket_index(employee.salary)] += 1;
    }
    let max_across_buckets = counts.iter().copied().max().unwrap_or(0);
    let total = employees.len();
    std::array::from_fn(|i| SalaryBucket {
        label: SALARY_BUCKETS[i].1,
        count: counts[i],
        max_across_buckets,
        percent_of_total: percent(counts[i], total),
    })
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
