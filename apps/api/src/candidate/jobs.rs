use serde::Deserialize;

use crate::store::models::JobRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSort {
    /// A–Z, ignoring case.
    #[default]
    Title,
    /// Newest first.
    Date,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: JobSort,
}

/// Case-insensitive search over title and description, then the requested order.
pub fn filter_jobs(jobs: Vec<JobRow>, query: &JobQuery) -> Vec<JobRow> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut jobs: Vec<JobRow> = match needle {
        Some(needle) => jobs
            .into_iter()
            .filter(|job| {
                job.title.to_lowercase().contains(&needle)
                    || job.description.to_lowercase().contains(&needle)
            })
            .collect(),
        None => jobs,
    };

    match query.sort {
        JobSort::Title => jobs.sort_by_key(|job| job.title.to_lowercase()),
        JobSort::Date => jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn job(title: &str, description: &str, age_days: i64) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            custom_questions: vec![],
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn titles(jobs: &[JobRow]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    fn sample() -> Vec<JobRow> {
        vec![
            job("frontend Engineer", "React and TypeScript", 3),
            job("Backend Developer", "Rust services", 1),
            job("Data Analyst", "SQL dashboards, some react", 7),
        ]
    }

    #[test]
    fn test_default_sort_is_title_case_insensitive() {
        let jobs = filter_jobs(sample(), &JobQuery::default());
        assert_eq!(
            titles(&jobs),
            vec!["Backend Developer", "Data Analyst", "frontend Engineer"]
        );
    }

    #[test]
    fn test_date_sort_is_newest_first() {
        let query = JobQuery {
            search: None,
            sort: JobSort::Date,
        };
        let jobs = filter_jobs(sample(), &query);
        assert_eq!(
            titles(&jobs),
            vec!["Backend Developer", "frontend Engineer", "Data Analyst"]
        );
    }

    #[test]
    fn test_search_matches_title_or_description() {
        let query = JobQuery {
            search: Some("REACT".to_string()),
            sort: JobSort::Title,
        };
        let jobs = filter_jobs(sample(), &query);
        assert_eq!(titles(&jobs), vec!["Data Analyst", "frontend Engineer"]);
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let query = JobQuery {
            search: Some("   ".to_string()),
            sort: JobSort::Title,
        };
        assert_eq!(filter_jobs(sample(), &query).len(), 3);
    }
}
