use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::jobs::filter::{JobFilter, JobListing};
use crate::models::job::Job;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
    Company,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "title" => Ok(SortOrder::Title),
            "company" => Ok(SortOrder::Company),
            _ => Err(format!(
                "unknown sort order '{s}' (expected newest, oldest, title or company)"
            )),
        }
    }
}

impl SortOrder {
    /// Stable sort; jobs without a posted date go last for both date orders.
    pub fn sort(&self, jobs: &mut [Job]) {
        match self {
            SortOrder::Newest => jobs.sort_by(|a, b| by_date(a, b, true)),
            SortOrder::Oldest => jobs.sort_by(|a, b| by_date(a, b, false)),
            SortOrder::Title => jobs.sort_by_key(|j| j.title.to_lowercase()),
            SortOrder::Company => jobs.sort_by_key(|j| j.company.to_lowercase()),
        }
    }
}

fn by_date(a: &Job, b: &Job, newest_first: bool) -> Ordering {
    match (a.posted_date, b.posted_date) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Outcome of looking up a single job by id.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Job),
    NotFound(String),
}

/// A job list screen: the base collection plus the user's current criteria.
/// Listings are always recomputed from the base, never from a previous listing.
#[derive(Debug, Clone)]
pub struct JobBrowser {
    base: Arc<[Job]>,
    filter: JobFilter,
    sort: SortOrder,
}

impl JobBrowser {
    pub fn new(base: Arc<[Job]>) -> Self {
        Self {
            base,
            filter: JobFilter::default(),
            sort: SortOrder::default(),
        }
    }

    pub fn base(&self) -> &[Job] {
        &self.base
    }

    pub fn filter(&self) -> &JobFilter {
        &self.filter
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn set_filter(&mut self, filter: JobFilter) {
        debug!("Filter changed: {filter:?}");
        self.filter = filter;
    }

    pub fn clear_filters(&mut self) {
        self.filter = JobFilter::default();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn listing(&self) -> JobListing {
        match self.filter.apply(&self.base) {
            JobListing::Results(mut jobs) => {
                self.sort.sort(&mut jobs);
                JobListing::Results(jobs)
            }
            JobListing::NoMatches => JobListing::NoMatches,
        }
    }

    /// Waits `delay` before producing the listing, so results appear after a
    /// short loading indicator instead of flickering on every keystroke.
    pub async fn search_after_delay(&self, delay: Duration) -> JobListing {
        tokio::time::sleep(delay).await;
        self.listing()
    }

    pub fn find(&self, id: &str) -> Lookup<'_> {
        self.base
            .iter()
            .find(|j| j.id == id)
            .map(Lookup::Found)
            .unwrap_or_else(|| Lookup::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobType;
    use chrono::NaiveDate;

    fn job(id: &str, title: &str, company: &str, posted: Option<(i32, u32, u32)>) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            salary: String::new(),
            job_type: JobType::FullTime,
            remote: true,
            skills: vec!["Rust".to_string()],
            description: String::new(),
            responsibilities: vec![],
            requirements: vec![],
            posted_date: posted.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn browser() -> JobBrowser {
        JobBrowser::new(
            vec![
                job("a", "Zeta Engineer", "Acme", Some((2024, 1, 10))),
                job("b", "Alpha Engineer", "Globex", Some((2024, 3, 5))),
                job("c", "Mid Engineer", "Bravo", None),
                job("d", "Beta Designer", "Acme", Some((2023, 12, 1))),
            ]
            .into(),
        )
    }

    fn ids(listing: &JobListing) -> Vec<&str> {
        listing.jobs().iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_newest_first_with_undated_last() {
        assert_eq!(ids(&browser().listing()), vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn test_oldest_first_with_undated_last() {
        let mut b = browser();
        b.set_sort(SortOrder::Oldest);
        assert_eq!(ids(&b.listing()), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_title_and_company_sorting() {
        let mut b = browser();
        b.set_sort(SortOrder::Title);
        assert_eq!(ids(&b.listing()), vec!["b", "d", "c", "a"]);
        b.set_sort(SortOrder::Company);
        assert_eq!(ids(&b.listing()), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_clearing_filters_restores_full_collection() {
        let mut b = browser();
        b.set_filter(JobFilter::search("designer"));
        assert_eq!(ids(&b.listing()), vec!["d"]);

        // Narrowing further starts from the base, not from the previous listing.
        b.set_filter(JobFilter::search("engineer"));
        assert_eq!(b.listing().len(), 3);

        b.clear_filters();
        assert_eq!(b.listing().len(), b.base().len());
    }

    #[test]
    fn test_find_reports_not_found() {
        let b = browser();
        assert!(matches!(b.find("a"), Lookup::Found(j) if j.title == "Zeta Engineer"));
        assert_eq!(b.find("zzz"), Lookup::NotFound("zzz".to_string()));
    }

    #[test]
    fn test_sort_order_parses() {
        assert_eq!("Title".parse::<SortOrder>().unwrap(), SortOrder::Title);
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_waits_for_delay() {
        let b = browser();
        let start = tokio::time::Instant::now();
        let listing = b.search_after_delay(Duration::from_millis(500)).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(listing.len(), 4);
    }
}
