//! 候选人筛选

use crate::social::discovery::models::{DiscoveryFilters, SwipeCandidate};
use chrono::{DateTime, Duration, Utc};

/// 候选人是否满足筛选条件
pub fn matches_filters(
    candidate: &SwipeCandidate,
    filters: &DiscoveryFilters,
    now: DateTime<Utc>,
) -> bool {
    if let Some(range) = filters.age_range {
        // 设置了年龄区间时，未知年龄的候选人不显示
        match candidate.age {
            Some(age) if age >= range.min && age <= range.max => {}
            _ => return false,
        }
    }

    if let Some(keyword) = filters.location.as_deref().map(str::trim) {
        if !keyword.is_empty() {
            let keyword = keyword.to_lowercase();
            let hit = candidate
                .location
                .as_deref()
                .is_some_and(|loc| loc.to_lowercase().contains(&keyword));
            if !hit {
                return false;
            }
        }
    }

    if !filters.body_types.is_empty() {
        let hit = candidate
            .body_type
            .as_ref()
            .is_some_and(|b| filters.body_types.contains(b));
        if !hit {
            return false;
        }
    }

    if filters.online_only && !candidate.is_online {
        return false;
    }
    if filters.verified_only && !candidate.is_verified {
        return false;
    }

    if let Some(days) = filters.new_members_days {
        let is_new = match candidate.created_at {
            Some(created) => created >= now - Duration::days(i64::from(days)),
            None => candidate.is_new,
        };
        if !is_new {
            return false;
        }
    }

    true
}

pub fn apply_filters(
    candidates: &[SwipeCandidate],
    filters: &DiscoveryFilters,
    now: DateTime<Utc>,
) -> Vec<SwipeCandidate> {
    candidates
        .iter()
        .filter(|c| matches_filters(c, filters, now))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::discovery::models::AgeRange;

    fn candidate(id: &str, age: Option<u32>) -> SwipeCandidate {
        SwipeCandidate {
            id: id.to_string(),
            age,
            ..Default::default()
        }
    }

    #[test]
    fn age_range_is_inclusive_and_excludes_unknown_ages() {
        let filters = DiscoveryFilters {
            age_range: Some(AgeRange { min: 18, max: 25 }),
            ..Default::default()
        };
        let now = Utc::now();

        assert!(!matches_filters(&candidate("a", Some(30)), &filters, now));
        assert!(matches_filters(&candidate("b", Some(20)), &filters, now));
        assert!(matches_filters(&candidate("c", Some(25)), &filters, now));
        assert!(!matches_filters(&candidate("d", None), &filters, now));
    }

    #[test]
    fn location_is_case_insensitive_substring() {
        let filters = DiscoveryFilters {
            location: Some("miami".to_string()),
            ..Default::default()
        };
        let mut c = candidate("a", None);
        c.location = Some("Miami Beach, FL".to_string());
        assert!(matches_filters(&c, &filters, Utc::now()));

        c.location = Some("Austin, TX".to_string());
        assert!(!matches_filters(&c, &filters, Utc::now()));
    }

    #[test]
    fn body_type_online_and_verified_flags() {
        let filters = DiscoveryFilters {
            body_types: ["athletic".to_string()].into_iter().collect(),
            online_only: true,
            verified_only: true,
            ..Default::default()
        };
        let mut c = candidate("a", None);
        c.body_type = Some("athletic".to_string());
        c.is_online = true;
        c.is_verified = true;
        assert!(matches_filters(&c, &filters, Utc::now()));

        c.is_online = false;
        assert!(!matches_filters(&c, &filters, Utc::now()));
    }

    #[test]
    fn new_member_window_uses_join_date_then_flag() {
        let now = Utc::now();
        let filters = DiscoveryFilters {
            new_members_days: Some(7),
            ..Default::default()
        };

        let mut recent = candidate("a", None);
        recent.created_at = Some(now - Duration::days(2));
        let mut old = candidate("b", None);
        old.created_at = Some(now - Duration::days(30));
        let mut flagged = candidate("c", None);
        flagged.is_new = true;

        let kept = apply_filters(&[recent, old, flagged], &filters, now);
        let ids: Vec<_> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
