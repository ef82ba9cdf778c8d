// src/stats/mod.rs
//
// Usage summaries rendered by the popup and the options dashboard.

use crate::constants::WEEKLY_TOP_SITES;
use crate::error::AppError;
use crate::models::{DailyUsage, SiteUsage, UsageData};
use crate::store::Store;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStat {
    pub domain: String,
    pub time_spent_secs: u64,
    pub visit_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: String,
    /// Sorted by time spent, most first
    pub sites: Vec<SiteStat>,
    pub total_time_secs: u64,
    pub total_sites: usize,
    pub total_visits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub total_time_secs: u64,
    pub total_sites: usize,
    pub total_visits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// Oldest day first
    pub days: Vec<DaySummary>,
    pub total_time_secs: u64,
    pub top_sites: Vec<SiteStat>,
}

pub fn daily_report(usage: &UsageData, date: &str) -> DailyReport {
    let sites = usage.day(date).map(sorted_sites).unwrap_or_default();
    let summary = summarize(date, &sites);

    DailyReport {
        date: date.to_string(),
        sites,
        total_time_secs: summary.total_time_secs,
        total_sites: summary.total_sites,
        total_visits: summary.total_visits,
    }
}

pub fn weekly_report(usage: &UsageData) -> WeeklyReport {
    let mut combined: BTreeMap<&str, SiteUsage> = BTreeMap::new();
    let mut days = Vec::with_capacity(usage.len());

    for (date, day) in usage.days() {
        let sites = sorted_sites(day);
        days.push(summarize(date, &sites));

        for (domain, site) in day {
            let total = combined.entry(domain.as_str()).or_default();
            total.time_spent_secs = total.time_spent_secs.saturating_add(site.time_spent_secs);
            total.visit_count = total.visit_count.saturating_add(site.visit_count);
        }
    }

    let mut top_sites: Vec<SiteStat> = combined
        .into_iter()
        .map(|(domain, site)| to_stat(domain, &site))
        .collect();
    sort_by_time(&mut top_sites);
    top_sites.truncate(WEEKLY_TOP_SITES);

    WeeklyReport {
        total_time_secs: days.iter().map(|d| d.total_time_secs).sum(),
        days,
        top_sites,
    }
}

/// Load the ledger and build the report for `date`.
pub fn load_daily_report(store: &Store, date: &str) -> Result<DailyReport, AppError> {
    Ok(daily_report(&UsageData::load(store)?, date))
}

pub fn load_weekly_report(store: &Store) -> Result<WeeklyReport, AppError> {
    Ok(weekly_report(&UsageData::load(store)?))
}

// Helper functions

fn to_stat(domain: &str, site: &SiteUsage) -> SiteStat {
    SiteStat {
        domain: domain.to_string(),
        time_spent_secs: site.time_spent_secs,
        visit_count: site.visit_count,
    }
}

fn sorted_sites(day: &DailyUsage) -> Vec<SiteStat> {
    let mut sites: Vec<SiteStat> = day.iter().map(|(domain, site)| to_stat(domain, site)).collect();
    sort_by_time(&mut sites);
    sites
}

fn sort_by_time(sites: &mut [SiteStat]) {
    sites.sort_by(|a, b| {
        b.time_spent_secs
            .cmp(&a.time_spent_secs)
            .then_with(|| a.domain.cmp(&b.domain))
    });
}

fn summarize(date: &str, sites: &[SiteStat]) -> DaySummary {
    DaySummary {
        date: date.to_string(),
        total_time_secs: sites.iter().map(|s| s.time_spent_secs).sum(),
        total_sites: sites.len(),
        total_visits: sites.iter().map(|s| s.visit_count).sum(),
    }
}
