// ── Security metrics ──
//
// Aggregate counts behind the dashboard cards and charts. Either mapped
// from the backend's statistics endpoint or derived locally from a set of
// records when the backend is unavailable.

use std::collections::HashSet;

use serde::Serialize;

use super::record::{LoginFormType, ResultRecord};

/// Count of login forms per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoginFormDistribution {
    pub basic: u64,
    pub captcha: u64,
    pub otp: u64,
    pub other: u64,
}

impl LoginFormDistribution {
    pub fn get(&self, kind: LoginFormType) -> u64 {
        match kind {
            LoginFormType::Basic => self.basic,
            LoginFormType::Captcha => self.captcha,
            LoginFormType::Otp => self.otp,
            LoginFormType::Other => self.other,
        }
    }

    fn add(&mut self, kind: LoginFormType, n: u64) {
        let slot = match kind {
            LoginFormType::Basic => &mut self.basic,
            LoginFormType::Captcha => &mut self.captcha,
            LoginFormType::Otp => &mut self.otp,
            LoginFormType::Other => &mut self.other,
        };
        *slot += n;
    }

    /// `(type, count)` in chart order.
    pub fn entries(&self) -> [(LoginFormType, u64); 4] {
        [
            (LoginFormType::Basic, self.basic),
            (LoginFormType::Captcha, self.captcha),
            (LoginFormType::Otp, self.otp),
            (LoginFormType::Other, self.other),
        ]
    }

    pub fn total(&self) -> u64 {
        self.basic + self.captcha + self.otp + self.other
    }
}

/// Headline security counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityMetrics {
    pub total: u64,
    pub resolved: u64,
    pub unresolved: u64,
    pub accessible: u64,
    pub inaccessible: u64,
    pub login_forms: u64,
    pub parked: u64,
    pub previously_breached: u64,
    pub unique_domains: u64,
    pub login_form_distribution: LoginFormDistribution,
}

impl SecurityMetrics {
    /// Derive every count from a record set.
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let count = |pred: fn(&ResultRecord) -> bool| -> u64 {
            records.iter().filter(|r| pred(r)).map(|_| 1).sum()
        };

        let total: u64 = records.iter().map(|_| 1).sum();
        let resolved = count(|r| r.is_resolved);
        let accessible = count(|r| r.is_accessible);

        let unique_domains = records
            .iter()
            .map(|r| r.domain.to_ascii_lowercase())
            .collect::<HashSet<_>>()
            .len();

        let mut login_form_distribution = LoginFormDistribution::default();
        for record in records.iter().filter(|r| r.has_login_form) {
            if record.login_form_type.is_some() {
                let kind = record.login_form_kind().unwrap_or(LoginFormType::Other);
                login_form_distribution.add(kind, 1);
            }
        }

        Self {
            total,
            resolved,
            unresolved: total.saturating_sub(resolved),
            accessible,
            inaccessible: total.saturating_sub(accessible),
            login_forms: count(|r| r.has_login_form),
            parked: count(|r| r.is_parked),
            previously_breached: count(|r| r.is_breached),
            unique_domains: u64::try_from(unique_domains).unwrap_or(u64::MAX),
            login_form_distribution,
        }
    }
}

impl From<breachwatch_api::StatisticsResponse> for SecurityMetrics {
    fn from(stats: breachwatch_api::StatisticsResponse) -> Self {
        let mut login_form_distribution = LoginFormDistribution::default();
        for (name, n) in &stats.login_form_types {
            let kind = name.parse().unwrap_or(LoginFormType::Other);
            login_form_distribution.add(kind, *n);
        }

        Self {
            total: stats.total_records,
            resolved: stats.resolved_cases,
            unresolved: stats.total_records.saturating_sub(stats.resolved_cases),
            accessible: stats.accessible_domains,
            inaccessible: stats.total_records.saturating_sub(stats.accessible_domains),
            login_forms: stats.login_forms,
            parked: stats.is_parked.unwrap_or_default(),
            previously_breached: stats.previously_breached.unwrap_or_default(),
            unique_domains: stats.unique_domains,
            login_form_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn record(domain: &str, resolved: bool, login: Option<&str>) -> ResultRecord {
        ResultRecord {
            domain: domain.into(),
            is_resolved: resolved,
            has_login_form: login.is_some(),
            login_form_type: login.map(Into::into),
            ..ResultRecord::default()
        }
    }

    #[test]
    fn derives_counts_from_records() {
        let records = vec![
            record("a.example", true, Some("basic")),
            record("A.example", false, Some("captcha")),
            record("b.example", false, Some("weird")),
            record("c.example", false, None),
        ];
        let m = SecurityMetrics::from_records(&records);

        assert_eq!(m.total, 4);
        assert_eq!(m.resolved, 1);
        assert_eq!(m.unresolved, 3);
        assert_eq!(m.inaccessible, 4);
        assert_eq!(m.unique_domains, 3);
        assert_eq!(m.login_forms, 3);
        assert_eq!(
            m.login_form_distribution,
            LoginFormDistribution {
                basic: 1,
                captcha: 1,
                otp: 0,
                other: 1
            }
        );
    }

    #[test]
    fn maps_statistics_with_saturation() {
        let stats = breachwatch_api::StatisticsResponse {
            total_records: 5,
            accessible_domains: 9,
            resolved_cases: 2,
            login_form_types: HashMap::from([("otp".to_owned(), 4), ("sso".to_owned(), 1)]),
            ..Default::default()
        };
        let m = SecurityMetrics::from(stats);

        assert_eq!(m.unresolved, 3);
        assert_eq!(m.inaccessible, 0);
        assert_eq!(m.login_form_distribution.otp, 4);
        assert_eq!(m.login_form_distribution.other, 1);
        assert_eq!(m.parked, 0);
    }
}
